//! aleo-sandbox: drive Aleo programs from the command line
//!
//! Every command runs through the same session the test harness uses, so
//! a call behaves identically here and in a suite.
//!
//! ## Example Usage
//!
//! ```bash
//! # Local sandbox (state kept in ~/.aleo-sandbox/state.json)
//! aleo-sandbox --mode evaluate deploy token.aleo
//! aleo-sandbox --mode evaluate run token.aleo mint_public aleo1... 10u64
//! aleo-sandbox --mode evaluate mapping token.aleo account aleo1...
//!
//! # Against a devnet node
//! aleo-sandbox --network testnet deploy token_v1.aleo
//! aleo-sandbox decode record1... --account 1
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod sandbox_cli;

use sandbox_cli::{
    accounts::AccountsCmd, decode::DecodeCmd, deploy::DeployCmd, mapping::MappingCmd,
    run::RunCmd, status::StatusCmd, CliContext, GlobalArgs,
};

#[derive(Parser)]
#[command(
    name = "aleo-sandbox",
    author,
    version,
    about = "Aleo contract harness: local sandbox or snarkOS node",
    long_about = "Deploy and call Aleo programs, read mappings and decode records, either in \
                  the in-process sandbox (evaluate) or against a snarkOS node (execute)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    globals: GlobalArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// List the session's accounts
    Accounts(AccountsCmd),

    /// Show the session, or one program's deployment
    Status(StatusCmd),

    /// Deploy a program
    Deploy(DeployCmd),

    /// Execute a function and wait for it to finalize
    Run(RunCmd),

    /// Read one mapping entry
    Mapping(MappingCmd),

    /// Decode a record for one of the session's accounts
    Decode(DecodeCmd),
}

#[tokio::main]
async fn main() {
    let Cli { command, globals } = Cli::parse();
    aleo_sandbox::logging::init_tracing_with(if globals.verbose { "debug" } else { "warn" });

    if let Err(err) = dispatch(command, &globals).await {
        eprintln!("{}", sandbox_cli::output::format_error(&err, globals.json));
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands, globals: &GlobalArgs) -> Result<()> {
    let ctx = CliContext::open(globals).await?;
    match command {
        Commands::Accounts(cmd) => cmd.execute(&ctx, globals.json),
        Commands::Status(cmd) => cmd.execute(&ctx, globals.json).await,
        Commands::Deploy(cmd) => cmd.execute(&ctx, globals.json).await,
        Commands::Run(cmd) => cmd.execute(&ctx, globals.json).await,
        Commands::Mapping(cmd) => cmd.execute(&ctx, globals.json).await,
        Commands::Decode(cmd) => cmd.execute(&ctx, globals.json).await,
    }
}

//! Deploy command - deploy a program and wait for it

use aleo_sandbox::ProgramId;
use anyhow::{anyhow, Result};
use clap::Parser;
use serde_json::json;

use super::output::{print_json, print_rejected};
use super::CliContext;

#[derive(Parser, Debug)]
pub struct DeployCmd {
    /// Program to deploy (e.g. token_v1.aleo)
    pub program: ProgramId,

    /// Deploying account index
    #[arg(long, default_value = "0")]
    pub account: usize,

    /// Succeed without deploying when the program is already deployed
    #[arg(long)]
    pub if_missing: bool,
}

impl DeployCmd {
    pub async fn execute(&self, ctx: &CliContext, json_output: bool) -> Result<()> {
        let client = ctx.session.client(&self.program).with_signer(self.account)?;
        if self.if_missing && client.is_deployed().await? {
            if json_output {
                print_json(&json!({ "program": self.program, "deployed": true, "skipped": true }));
            } else {
                println!("{} is already deployed", self.program);
            }
            return Ok(());
        }

        let handle = client.deploy().await?;
        match handle.wait().await {
            Ok(_) => {
                if json_output {
                    print_json(&json!({
                        "program": self.program,
                        "transaction": handle.id(),
                        "status": "accepted",
                    }));
                } else {
                    println!("\x1b[32m✓ Deployed\x1b[0m {} ({})", self.program, handle.id());
                }
                Ok(())
            }
            Err(err) => {
                print_rejected(&err, json_output);
                Err(anyhow!(err))
            }
        }
    }
}

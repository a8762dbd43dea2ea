//! Global flags and session construction shared by every subcommand.

use aleo_sandbox::backend::{Backend, NetworkBackend, SandboxBackend};
use aleo_sandbox::session::{Account, Session};
use aleo_sandbox::{AleoConfig, ExecutionMode};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Overrides the default sandbox home (`~/.aleo-sandbox`).
pub const SANDBOX_HOME_ENV: &str = "ALEO_SANDBOX_HOME";

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Config file (default: nearest aleo-config.yaml, else built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Network name from the config (default: its default_network)
    #[arg(long, global = true)]
    pub network: Option<String>,

    /// Execution mode: evaluate or execute (default: from the config)
    #[arg(long, global = true)]
    pub mode: Option<ExecutionMode>,

    /// Sandbox state file for evaluate mode
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

pub fn sandbox_home() -> PathBuf {
    std::env::var(SANDBOX_HOME_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".aleo-sandbox")
        })
}

pub struct CliContext {
    pub session: Session,
    /// Set in evaluate mode.
    pub sandbox: Option<Arc<SandboxBackend>>,
    /// Set in execute mode.
    pub node: Option<Arc<NetworkBackend>>,
}

impl CliContext {
    pub async fn open(globals: &GlobalArgs) -> Result<Self> {
        let mut config = match &globals.config {
            Some(path) => AleoConfig::load(path)?,
            None => AleoConfig::discover()?,
        };
        config.apply_env_overrides()?;
        let network = globals
            .network
            .clone()
            .unwrap_or_else(|| config.default_network.clone());
        let mode = globals.mode.unwrap_or(config.mode);

        match mode {
            ExecutionMode::Evaluate => {
                let path = globals
                    .state_file
                    .clone()
                    .unwrap_or_else(|| sandbox_home().join("state.json"));
                let sandbox = Arc::new(SandboxBackend::with_state_file(&path)?);
                let backend: Arc<dyn Backend> = sandbox.clone();
                let session = Session::with_backend(config, &network, backend)
                    .await
                    .context("Failed to start sandbox session")?;
                Ok(Self {
                    session,
                    sandbox: Some(sandbox),
                    node: None,
                })
            }
            ExecutionMode::Execute => {
                let node = Arc::new(NetworkBackend::new(
                    &network,
                    config.network(&network)?,
                    config.programs_dir.clone(),
                ));
                let backend: Arc<dyn Backend> = node.clone();
                let session = Session::with_backend(config, &network, backend)
                    .await
                    .with_context(|| format!("Failed to start session on {}", network))?;
                Ok(Self {
                    session,
                    sandbox: None,
                    node: Some(node),
                })
            }
        }
    }

    pub fn account(&self, index: usize) -> Result<&Account> {
        self.session.signer(index)
    }
}

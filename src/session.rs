//! One harness session per process.
//!
//! The session fixes the network and execution mode, builds the backend once
//! and resolves account addresses. Contract clients are handed out from it
//! and all share its backend and record codec.

use crate::backend::{Backend, NetworkBackend, SandboxBackend};
use crate::client::ProgramClient;
use crate::config::{AleoConfig, NetworkConfig};
use crate::records::RecordCodec;
use aleo_sandbox_core::accounts::devnet_accounts;
use aleo_sandbox_types::{Address, ExecutionMode, PrivateKey, ProgramId};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;

/// A signing account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub private_key: PrivateKey,
    pub address: Address,
}

#[derive(Clone)]
pub struct Session {
    config: AleoConfig,
    network: String,
    backend: Arc<dyn Backend>,
    codec: RecordCodec,
    accounts: Arc<[Account]>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("network", &self.network)
            .field("mode", &self.mode())
            .field("backend", &self.backend.describe())
            .field("accounts", &self.accounts.len())
            .finish()
    }
}

impl Session {
    /// Build a session for `network` (default: the configured default) in
    /// `mode` (default: the configured mode).
    pub async fn new(
        config: AleoConfig,
        network: Option<&str>,
        mode: Option<ExecutionMode>,
    ) -> Result<Self> {
        let network = network.unwrap_or(&config.default_network).to_string();
        let network_config = config.network(&network)?;
        let backend: Arc<dyn Backend> = match mode.unwrap_or(config.mode) {
            ExecutionMode::Evaluate => Arc::new(SandboxBackend::new()),
            ExecutionMode::Execute => Arc::new(NetworkBackend::new(
                &network,
                network_config,
                config.programs_dir.clone(),
            )),
        };
        Self::with_backend(config, &network, backend).await
    }

    /// Build a session around an existing backend. The mode is the backend's.
    pub async fn with_backend(
        config: AleoConfig,
        network: &str,
        backend: Arc<dyn Backend>,
    ) -> Result<Self> {
        let mode = backend.mode();
        let mut keys = config.accounts_for(network)?;
        if keys.is_empty() && mode.is_local() {
            keys = devnet_accounts().into_iter().map(|(key, _)| key).collect();
        }
        if keys.is_empty() {
            tracing::warn!(network, "no accounts configured; calls will fail");
        }

        let mut accounts = Vec::with_capacity(keys.len());
        for private_key in keys {
            let address = backend
                .derive_address(&private_key)
                .await
                .with_context(|| format!("Failed to derive address for {}", private_key.fingerprint()))?;
            accounts.push(Account {
                private_key,
                address,
            });
        }

        let codec = match mode {
            ExecutionMode::Evaluate => RecordCodec::Parse,
            ExecutionMode::Execute => RecordCodec::Decrypt(Arc::clone(&backend)),
        };
        tracing::info!(
            network,
            mode = %mode,
            backend = %backend.describe(),
            accounts = accounts.len(),
            "session ready"
        );

        Ok(Self {
            config,
            network: network.to_string(),
            backend,
            codec,
            accounts: accounts.into(),
        })
    }

    /// Discovered config with `ALEO_NETWORK` / `ALEO_MODE` applied.
    pub async fn from_env() -> Result<Self> {
        let mut config = AleoConfig::discover()?;
        config.apply_env_overrides()?;
        Self::new(config, None, None).await
    }

    /// A fresh in-memory sandbox signed by the devnet accounts.
    pub async fn evaluate() -> Result<Self> {
        Self::new(AleoConfig::local(), None, Some(ExecutionMode::Evaluate)).await
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn signer(&self, index: usize) -> Result<&Account> {
        self.accounts.get(index).ok_or_else(|| {
            anyhow!(
                "No account at index {} ({} configured for {})",
                index,
                self.accounts.len(),
                self.network
            )
        })
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn codec(&self) -> &RecordCodec {
        &self.codec
    }

    pub fn mode(&self) -> ExecutionMode {
        self.backend.mode()
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn config(&self) -> &AleoConfig {
        &self.config
    }

    pub fn network_config(&self) -> Result<&NetworkConfig> {
        self.config.network(&self.network)
    }

    /// Client for `program`, signing with the first account.
    pub fn client(&self, program: &ProgramId) -> ProgramClient {
        ProgramClient::new(
            program.clone(),
            Arc::clone(&self.backend),
            self.codec.clone(),
            Arc::clone(&self.accounts),
        )
    }
}

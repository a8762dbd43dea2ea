//! Execute-mode backend: `snarkos developer` for proving and broadcasting,
//! the node's REST API for confirmation and mapping reads.
//!
//! Both transports block, so every call runs on the blocking pool.

use super::{Backend, PendingTransaction, TransactionOutcome};
use crate::config::NetworkConfig;
use aleo_sandbox_types::{
    Address, ExecutionMode, Plaintext, PrivateKey, ProgramId, RawRecord, RecordPlaintext,
    RetryConfig, TransactionStatus, Value,
};
use aleo_transport::network::infer_network_from_url;
use aleo_transport::rest::parse_confirmed_transaction;
use aleo_transport::{AccountKeys, Broadcast, NodeClient, SnarkosCli};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub struct NetworkBackend {
    node: NodeClient,
    cli: SnarkosCli,
    broadcast: Broadcast,
    programs_dir: PathBuf,
    retry: RetryConfig,
    confirmation_timeout: Duration,
    /// Keys derived by `snarkos account import`, keyed by private key.
    keys: Mutex<HashMap<String, AccountKeys>>,
}

impl std::fmt::Debug for NetworkBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkBackend")
            .field("node", &self.node)
            .field("snarkos", &self.cli.binary())
            .field("programs_dir", &self.programs_dir)
            .finish()
    }
}

impl NetworkBackend {
    pub fn new(
        network: &str,
        config: &NetworkConfig,
        programs_dir: impl Into<PathBuf>,
    ) -> Self {
        if let Some(inferred) = infer_network_from_url(&config.endpoint) {
            if inferred != network {
                tracing::warn!(
                    network,
                    endpoint = %config.endpoint,
                    "endpoint looks like a {} node",
                    inferred
                );
            }
        }
        Self {
            node: NodeClient::new(&config.endpoint, network),
            cli: SnarkosCli::from_env(),
            broadcast: Broadcast {
                endpoint: config.endpoint.clone(),
                network: network.to_string(),
                priority_fee_microcredits: config.priority_fee_microcredits(),
            },
            programs_dir: programs_dir.into(),
            retry: RetryConfig::default(),
            confirmation_timeout: config.confirmation_timeout,
            keys: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_cli(mut self, cli: SnarkosCli) -> Self {
        self.cli = cli;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn node(&self) -> &NodeClient {
        &self.node
    }

    pub async fn latest_height(&self) -> Result<u32> {
        let node = self.node.clone();
        blocking(move || node.latest_height()).await
    }

    /// Build output directory of `program` (`<programs_dir>/<name>/build`).
    pub fn build_dir(&self, program: &ProgramId) -> PathBuf {
        self.programs_dir.join(program.name()).join("build")
    }

    async fn account_keys(&self, private_key: &PrivateKey) -> Result<AccountKeys> {
        if let Some(keys) = self.keys.lock().get(private_key.as_str()) {
            return Ok(keys.clone());
        }
        let cli = self.cli.clone();
        let key = private_key.clone();
        let keys = blocking(move || cli.account_import(&key))
            .await
            .with_context(|| format!("Failed to import account {}", private_key.fingerprint()))?;
        self.keys
            .lock()
            .insert(private_key.as_str().to_string(), keys.clone());
        Ok(keys)
    }
}

/// Run blocking transport work off the async executor.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow!("Blocking task failed: {}", e))?
}

#[async_trait]
impl Backend for NetworkBackend {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Execute
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.node.endpoint(), self.node.network())
    }

    async fn derive_address(&self, private_key: &PrivateKey) -> Result<Address> {
        Ok(self.account_keys(private_key).await?.address)
    }

    async fn is_deployed(&self, program: &ProgramId) -> Result<bool> {
        let node = self.node.clone();
        let program = program.clone();
        blocking(move || node.is_deployed(&program)).await
    }

    async fn deploy(&self, program: &ProgramId, signer: &PrivateKey) -> Result<PendingTransaction> {
        let path = self.build_dir(program);
        if !path.join("main.aleo").exists() {
            bail!(
                "{} has no build output at {} (run `leo build` first)",
                program,
                path.display()
            );
        }
        tracing::info!(program = %program, path = %path.display(), "deploying");

        let cli = self.cli.clone();
        let broadcast = self.broadcast.clone();
        let (id_program, key) = (program.clone(), signer.clone());
        let id = blocking(move || cli.deploy(&id_program, &path, &key, &broadcast))
            .await
            .with_context(|| format!("Failed to deploy {}", program))?;
        Ok(PendingTransaction {
            id,
            program: program.clone(),
            function: None,
        })
    }

    async fn execute(
        &self,
        program: &ProgramId,
        function: &str,
        inputs: &[Value],
        signer: &PrivateKey,
    ) -> Result<PendingTransaction> {
        let args: Vec<String> = inputs.iter().map(|v| v.to_string()).collect();
        let cli = self.cli.clone();
        let broadcast = self.broadcast.clone();
        let (call_program, call_function, key) =
            (program.clone(), function.to_string(), signer.clone());
        let id = blocking(move || {
            cli.execute(&call_program, &call_function, &args, &key, &broadcast)
        })
        .await
        .with_context(|| format!("Failed to execute {}/{}", program, function))?;
        tracing::debug!(program = %program, function, tx = %id, "broadcast");
        Ok(PendingTransaction {
            id,
            program: program.clone(),
            function: Some(function.to_string()),
        })
    }

    async fn confirm(&self, pending: &PendingTransaction) -> Result<TransactionOutcome> {
        let started = Instant::now();
        let mut attempt = 0usize;
        loop {
            let node = self.node.clone();
            let id = pending.id.clone();
            match blocking(move || node.confirmed_transaction(&id)).await {
                Ok(Some(document)) => {
                    let confirmed = parse_confirmed_transaction(
                        &document,
                        Some(&pending.program),
                        pending.function.as_deref(),
                    )?;
                    let rejection = (confirmed.status == TransactionStatus::Rejected)
                        .then(|| format!("{} was rejected by the network", pending.id));
                    return Ok(TransactionOutcome {
                        id: confirmed.id.unwrap_or_else(|| pending.id.clone()),
                        status: confirmed.status,
                        outputs: confirmed.outputs,
                        rejection,
                    });
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::debug!(tx = %pending.id, error = %err, "confirmation poll failed");
                }
            }

            if started.elapsed() >= self.confirmation_timeout {
                bail!(
                    "Transaction {} was not confirmed within {}s",
                    pending.id,
                    self.confirmation_timeout.as_secs()
                );
            }
            let wait = self.retry.backoff_for(attempt);
            attempt += 1;
            tokio::time::sleep(wait).await;
        }
    }

    async fn mapping_value(
        &self,
        program: &ProgramId,
        mapping: &str,
        key: &Plaintext,
    ) -> Result<Option<Plaintext>> {
        let node = self.node.clone();
        let (program, mapping, key) = (program.clone(), mapping.to_string(), key.clone());
        blocking(move || node.mapping_value(&program, &mapping, &key)).await
    }

    async fn decrypt_record(&self, record: &RawRecord, owner: &PrivateKey) -> Result<RecordPlaintext> {
        if !record.is_ciphertext() {
            return record.as_str().parse();
        }
        let keys = self.account_keys(owner).await?;
        let cli = self.cli.clone();
        let record = record.clone();
        blocking(move || cli.decrypt(&record, &keys.view_key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleo_sandbox_core::accounts::devnet_accounts;
    use aleo_sandbox_types::TransactionId;

    fn config(endpoint: &str) -> NetworkConfig {
        NetworkConfig {
            endpoint: endpoint.to_string(),
            accounts: Vec::new(),
            priority_fee: 0.5,
            confirmation_timeout: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_build_dir_layout() {
        let backend = NetworkBackend::new("testnet", &config("http://localhost:3030"), "/work/programs");
        let program: ProgramId = "handler_v1.aleo".parse().unwrap();
        assert_eq!(
            backend.build_dir(&program),
            PathBuf::from("/work/programs/handler_v1/build")
        );
        assert_eq!(backend.broadcast.priority_fee_microcredits, 500_000);
    }

    #[tokio::test]
    async fn test_deploy_without_build_output_fails_before_snarkos() {
        let dir = tempfile::tempdir().unwrap();
        let backend = NetworkBackend::new("testnet", &config("http://localhost:3030"), dir.path())
            .with_cli(SnarkosCli::new("/nonexistent/snarkos"));
        let program: ProgramId = "token.aleo".parse().unwrap();
        let (key, _) = devnet_accounts().remove(0);
        let err = backend.deploy(&program, &key).await.unwrap_err();
        assert!(err.to_string().contains("leo build"));
    }

    #[tokio::test]
    async fn test_confirm_times_out_against_unreachable_node() {
        let backend = NetworkBackend::new("testnet", &config("http://127.0.0.1:9"), "programs")
            .with_retry(RetryConfig::new(1, 10, 10));
        let pending = PendingTransaction {
            id: TransactionId::from_digest(b"pending"),
            program: "token.aleo".parse().unwrap(),
            function: Some("mint_public".to_string()),
        };
        let err = backend.confirm(&pending).await.unwrap_err();
        assert!(err.to_string().contains("not confirmed"));
    }
}

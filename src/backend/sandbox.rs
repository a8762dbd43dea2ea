//! Evaluate-mode backend over the local simulation environment.

use super::{Backend, PendingTransaction, TransactionOutcome};
use aleo_sandbox_core::accounts::derive_address;
use aleo_sandbox_core::simulation::{SimulationEnvironment, StateSummary, TransactionRecord};
use aleo_sandbox_types::{
    Address, ExecutionMode, Plaintext, PrivateKey, ProgramId, RawRecord, RecordPlaintext, Value,
};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Runs everything in-process. Transactions settle immediately; `confirm`
/// just looks the result up.
pub struct SandboxBackend {
    env: Mutex<SimulationEnvironment>,
    state_file: Option<PathBuf>,
}

impl Default for SandboxBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxBackend {
    /// A fresh, in-memory sandbox.
    pub fn new() -> Self {
        Self::from_environment(SimulationEnvironment::new())
    }

    pub fn from_environment(env: SimulationEnvironment) -> Self {
        Self {
            env: Mutex::new(env),
            state_file: None,
        }
    }

    /// A sandbox restored from `path` (if it exists) and saved back to it after
    /// every state change.
    pub fn with_state_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let env = SimulationEnvironment::from_state_file(&path)
            .with_context(|| format!("Failed to load sandbox state from {}", path.display()))?;
        tracing::debug!(path = %path.display(), "sandbox state file");
        Ok(Self {
            env: Mutex::new(env),
            state_file: Some(path),
        })
    }

    pub fn state_file(&self) -> Option<&Path> {
        self.state_file.as_deref()
    }

    pub fn summary(&self) -> StateSummary {
        self.env.lock().summary()
    }

    /// Settled transactions, oldest first.
    pub fn history(&self) -> Vec<TransactionRecord> {
        self.env.lock().history().to_vec()
    }

    /// Run `f` against the environment under the lock.
    pub fn with_environment<T>(&self, f: impl FnOnce(&mut SimulationEnvironment) -> T) -> T {
        f(&mut self.env.lock())
    }

    /// Apply `change` and save the result. If saving fails the environment
    /// is rolled back, so a failed call leaves no trace and can be retried.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut SimulationEnvironment) -> Result<T>,
    ) -> Result<T> {
        let mut env = self.env.lock();
        let Some(path) = &self.state_file else {
            return change(&mut env);
        };
        let snapshot = env.export_state();
        let value = change(&mut env)?;
        if let Err(err) = env.save_state(path) {
            env.import_state(snapshot)
                .context("Failed to roll back sandbox state after a failed save")?;
            return Err(err.context(format!("Failed to save sandbox state to {}", path.display())));
        }
        Ok(value)
    }

    fn pending(record: &TransactionRecord) -> PendingTransaction {
        PendingTransaction {
            id: record.id.clone(),
            program: record.program.clone(),
            function: record.function.clone(),
        }
    }
}

#[async_trait]
impl Backend for SandboxBackend {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Evaluate
    }

    fn describe(&self) -> String {
        match &self.state_file {
            Some(path) => format!("sandbox ({})", path.display()),
            None => "sandbox (in-memory)".to_string(),
        }
    }

    async fn derive_address(&self, private_key: &PrivateKey) -> Result<Address> {
        Ok(derive_address(private_key))
    }

    async fn is_deployed(&self, program: &ProgramId) -> Result<bool> {
        Ok(self.env.lock().is_deployed(program))
    }

    async fn deploy(&self, program: &ProgramId, signer: &PrivateKey) -> Result<PendingTransaction> {
        let deployer = derive_address(signer);
        let record = self.commit(|env| {
            env.deploy(&deployer, program)
                .with_context(|| format!("Failed to deploy {}", program))
        })?;
        Ok(Self::pending(&record))
    }

    async fn execute(
        &self,
        program: &ProgramId,
        function: &str,
        inputs: &[Value],
        signer: &PrivateKey,
    ) -> Result<PendingTransaction> {
        let signer = derive_address(signer);
        let record = self.commit(|env| {
            env.execute(&signer, program, function, inputs)
                .with_context(|| format!("Failed to execute {}/{}", program, function))
        })?;
        Ok(Self::pending(&record))
    }

    async fn confirm(&self, pending: &PendingTransaction) -> Result<TransactionOutcome> {
        let env = self.env.lock();
        let record = env
            .transaction(&pending.id)
            .ok_or_else(|| anyhow!("Unknown transaction {}", pending.id))?;
        Ok(TransactionOutcome {
            id: record.id.clone(),
            status: record.status,
            outputs: record.outputs.clone(),
            rejection: record.rejection.clone(),
        })
    }

    async fn mapping_value(
        &self,
        program: &ProgramId,
        mapping: &str,
        key: &Plaintext,
    ) -> Result<Option<Plaintext>> {
        Ok(self.env.lock().mapping_value(program, mapping, key)?)
    }

    async fn decrypt_record(&self, record: &RawRecord, owner: &PrivateKey) -> Result<RecordPlaintext> {
        if record.is_ciphertext() {
            bail!("The sandbox only issues plaintext records; cannot decrypt a ciphertext");
        }
        let plaintext: RecordPlaintext = record.as_str().parse()?;
        let address = derive_address(owner);
        if plaintext.owner() != &address {
            bail!(
                "Record is owned by {}, not by the given key ({})",
                plaintext.owner(),
                address
            );
        }
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleo_sandbox_core::accounts::devnet_accounts;
    use aleo_sandbox_types::TransactionStatus;

    fn key(index: usize) -> PrivateKey {
        devnet_accounts()[index].0.clone()
    }

    #[tokio::test]
    async fn test_rejection_settles_instead_of_failing() {
        let backend = SandboxBackend::new();
        let token: ProgramId = "token_v1.aleo".parse().unwrap();
        let pending = backend.deploy(&token, &key(0)).await.unwrap();
        assert_eq!(backend.confirm(&pending).await.unwrap().status, TransactionStatus::Accepted);

        let admin = backend.derive_address(&key(0)).await.unwrap();
        let inputs = vec![Plaintext::address(&admin).into(), Plaintext::u64(1).into()];
        let pending = backend
            .execute(&token, "mint_public", &inputs, &key(0))
            .await
            .unwrap();
        let outcome = backend.confirm(&pending).await.unwrap();
        assert_eq!(outcome.status, TransactionStatus::Rejected);
        assert!(outcome.rejection.is_some());
    }

    #[tokio::test]
    async fn test_unknown_function_fails_at_call_time() {
        let backend = SandboxBackend::new();
        let token: ProgramId = "token.aleo".parse().unwrap();
        backend.deploy(&token, &key(0)).await.unwrap();
        let err = backend.execute(&token, "burn", &[], &key(0)).await.unwrap_err();
        assert!(format!("{:#}", err).contains("does not exist"));
    }

    #[tokio::test]
    async fn test_decrypt_checks_owner() {
        let backend = SandboxBackend::new();
        let token: ProgramId = "token.aleo".parse().unwrap();
        backend.deploy(&token, &key(0)).await.unwrap();
        let owner = backend.derive_address(&key(1)).await.unwrap();
        let inputs = vec![Plaintext::address(&owner).into(), Plaintext::u64(3).into()];
        let pending = backend.execute(&token, "mint_private", &inputs, &key(0)).await.unwrap();
        let outcome = backend.confirm(&pending).await.unwrap();
        let raw = outcome.outputs[0].as_record().unwrap();

        assert_eq!(backend.decrypt_record(raw, &key(1)).await.unwrap().get_u64("amount").unwrap(), 3);
        assert!(backend.decrypt_record(raw, &key(0)).await.is_err());
    }

    #[tokio::test]
    async fn test_state_file_persists_between_backends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let token: ProgramId = "token.aleo".parse().unwrap();

        let first = SandboxBackend::with_state_file(&path).unwrap();
        first.deploy(&token, &key(0)).await.unwrap();
        drop(first);

        let second = SandboxBackend::with_state_file(&path).unwrap();
        assert!(second.is_deployed(&token).await.unwrap());
        assert_eq!(second.history().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().join("state.json");
        let token: ProgramId = "token.aleo".parse().unwrap();

        let backend = SandboxBackend::with_state_file(&path).unwrap();
        let err = backend.deploy(&token, &key(0)).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to save sandbox state"));
        assert!(!backend.is_deployed(&token).await.unwrap());
        assert!(backend.history().is_empty());

        // A retry fails for the same reason, not because of a half-applied deploy.
        let retry = backend.deploy(&token, &key(0)).await.unwrap_err();
        assert!(!format!("{:#}", retry).contains("already deployed"));
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_execution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let token: ProgramId = "token.aleo".parse().unwrap();

        let backend = SandboxBackend::with_state_file(&path).unwrap();
        backend.deploy(&token, &key(0)).await.unwrap();

        // Replace the state file with a directory so the next save fails.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let admin = backend.derive_address(&key(0)).await.unwrap();
        let inputs = vec![Plaintext::address(&admin).into(), Plaintext::u64(10).into()];
        assert!(backend.execute(&token, "mint_public", &inputs, &key(0)).await.is_err());
        let balance = backend
            .mapping_value(&token, "account", &Plaintext::address(&admin))
            .await
            .unwrap();
        assert_eq!(balance, None);
        assert_eq!(backend.history().len(), 1);
    }
}

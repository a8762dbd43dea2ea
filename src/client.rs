//! Untyped program client. The typed bindings wrap one of these.

use crate::backend::Backend;
use crate::records::RecordCodec;
use crate::session::Account;
use crate::transaction::TransactionHandle;
use aleo_sandbox_types::{
    ExecutionMode, Plaintext, PrivateKey, ProgramId, RawRecord, RecordPlaintext, Value,
};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;

/// Calls into one program on behalf of one of the session's accounts.
#[derive(Clone)]
pub struct ProgramClient {
    program: ProgramId,
    backend: Arc<dyn Backend>,
    codec: RecordCodec,
    accounts: Arc<[Account]>,
    signer: usize,
}

impl std::fmt::Debug for ProgramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramClient")
            .field("program", &self.program)
            .field("mode", &self.backend.mode())
            .field("signer", &self.signer)
            .finish()
    }
}

impl ProgramClient {
    pub(crate) fn new(
        program: ProgramId,
        backend: Arc<dyn Backend>,
        codec: RecordCodec,
        accounts: Arc<[Account]>,
    ) -> Self {
        Self {
            program,
            backend,
            codec,
            accounts,
            signer: 0,
        }
    }

    pub fn program(&self) -> &ProgramId {
        &self.program
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn mode(&self) -> ExecutionMode {
        self.backend.mode()
    }

    pub fn codec(&self) -> &RecordCodec {
        &self.codec
    }

    /// All session accounts, in configured order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// The same client signing with account `index`.
    pub fn with_signer(&self, index: usize) -> Result<Self> {
        if index >= self.accounts.len() {
            return Err(anyhow!(
                "No account at index {} ({} available)",
                index,
                self.accounts.len()
            ));
        }
        Ok(Self {
            signer: index,
            ..self.clone()
        })
    }

    pub fn signer(&self) -> Result<&Account> {
        self.accounts
            .get(self.signer)
            .ok_or_else(|| anyhow!("No account configured to sign for {}", self.program))
    }

    pub fn private_key(&self) -> Result<&PrivateKey> {
        Ok(&self.signer()?.private_key)
    }

    pub async fn is_deployed(&self) -> Result<bool> {
        self.backend
            .is_deployed(&self.program)
            .await
            .with_context(|| format!("Failed to check deployment of {}", self.program))
    }

    pub async fn deploy(&self) -> Result<TransactionHandle> {
        let signer = self.signer()?;
        tracing::info!(program = %self.program, deployer = %signer.address, "deploy");
        let pending = self.backend.deploy(&self.program, &signer.private_key).await?;
        Ok(TransactionHandle::new(pending, Arc::clone(&self.backend)))
    }

    /// Submit `function(inputs)`. Errors here mean no transaction was
    /// created; contract-level failures show up in `wait()`.
    pub async fn call(&self, function: &str, inputs: &[Value]) -> Result<TransactionHandle> {
        let signer = self.signer()?;
        tracing::info!(
            program = %self.program,
            function,
            signer = %signer.address,
            inputs = inputs.len(),
            "call"
        );
        let pending = self
            .backend
            .execute(&self.program, function, inputs, &signer.private_key)
            .await?;
        Ok(TransactionHandle::new(pending, Arc::clone(&self.backend)))
    }

    /// `mapping[key]`, or `None` when the key is absent.
    pub async fn mapping(&self, mapping: &str, key: &Plaintext) -> Result<Option<Plaintext>> {
        self.backend
            .mapping_value(&self.program, mapping, key)
            .await
            .with_context(|| format!("Failed to read {}/{}[{}]", self.program, mapping, key))
    }

    pub async fn mapping_or(&self, mapping: &str, key: &Plaintext, default: Plaintext) -> Result<Plaintext> {
        Ok(self.mapping(mapping, key).await?.unwrap_or(default))
    }

    pub async fn mapping_u64_or(&self, mapping: &str, key: &Plaintext, default: u64) -> Result<u64> {
        match self.mapping(mapping, key).await? {
            None => Ok(default),
            Some(value) => value.as_u64().ok_or_else(|| {
                anyhow!("{}/{}[{}] is not a u64: {}", self.program, mapping, key, value)
            }),
        }
    }

    /// Decode a record owned by the current signer.
    pub async fn decode(&self, raw: &RawRecord) -> Result<RecordPlaintext> {
        self.decode_as(raw, self.private_key()?).await
    }

    pub async fn decode_as(&self, raw: &RawRecord, owner: &PrivateKey) -> Result<RecordPlaintext> {
        self.codec.decode(raw, owner).await
    }
}

#[cfg(test)]
mod tests {
    use crate::session::Session;
    use aleo_sandbox_types::{Plaintext, Value};

    #[tokio::test]
    async fn test_call_before_deploy_fails_at_call_time() {
        let session = Session::evaluate().await.unwrap();
        let token = session.client(&"token.aleo".parse().unwrap());
        assert!(!token.is_deployed().await.unwrap());

        let receiver = session.signer(0).unwrap().address.clone();
        let inputs: Vec<Value> = vec![Plaintext::address(&receiver).into(), Plaintext::u64(1).into()];
        let err = token.call("mint_public", &inputs).await.unwrap_err();
        assert!(format!("{:#}", err).contains("not deployed"));
    }

    #[tokio::test]
    async fn test_with_signer_switches_account() {
        let session = Session::evaluate().await.unwrap();
        let token = session.client(&"token.aleo".parse().unwrap());
        token.deploy().await.unwrap().wait().await.unwrap();

        let second = token.with_signer(1).unwrap();
        assert_eq!(second.signer().unwrap().address, session.accounts()[1].address);
        assert!(token.with_signer(9).is_err());

        // transfer_public debits the signer, so account 1 cannot pay yet.
        let receiver = Plaintext::address(&session.accounts()[0].address);
        let handle = second
            .call("transfer_public", &[receiver.into(), Plaintext::u64(5).into()])
            .await
            .unwrap();
        assert!(handle.wait().await.unwrap_err().is_rejected());
    }

    #[tokio::test]
    async fn test_mapping_default_when_absent() {
        let session = Session::evaluate().await.unwrap();
        let token = session.client(&"token.aleo".parse().unwrap());
        token.deploy().await.unwrap().wait().await.unwrap();
        let key = Plaintext::address(&session.accounts()[2].address);
        assert_eq!(token.mapping_u64_or("account", &key, 42).await.unwrap(), 42);
        assert!(token.mapping("balances", &key).await.is_err());
    }

    #[tokio::test]
    async fn test_mapping_or_returns_stored_value() {
        let session = Session::evaluate().await.unwrap();
        let token = session.client(&"token.aleo".parse().unwrap());
        token.deploy().await.unwrap().wait().await.unwrap();
        let key = Plaintext::address(&session.accounts()[2].address);
        let zero = Plaintext::u64(0);

        assert_eq!(token.mapping_or("account", &key, zero.clone()).await.unwrap(), zero);

        token
            .call("mint_public", &[key.clone().into(), Plaintext::u64(7).into()])
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(
            token.mapping_or("account", &key, zero).await.unwrap(),
            Plaintext::u64(7)
        );
    }
}

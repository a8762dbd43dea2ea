//! Execution backends.
//!
//! A [`Backend`] is everything a contract client needs from "the chain":
//! submit deployments and executions, wait for them to settle, read
//! mappings, and turn records back into plaintext. There are two:
//!
//! - [`SandboxBackend`]: the in-process simulation environment (evaluate mode)
//! - [`NetworkBackend`]: a snarkOS node plus the `snarkos` binary (execute mode)
//!
//! A session builds exactly one backend and every client shares it.

pub mod network;
pub mod sandbox;

pub use network::NetworkBackend;
pub use sandbox::SandboxBackend;

use aleo_sandbox_types::{
    Address, ExecutionMode, Output, Plaintext, PrivateKey, ProgramId, RawRecord, RecordPlaintext,
    TransactionId, TransactionStatus, Value,
};
use anyhow::Result;
use async_trait::async_trait;

/// A submitted transaction that has not been confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub id: TransactionId,
    pub program: ProgramId,
    /// `None` for deployments.
    pub function: Option<String>,
}

/// A settled transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub id: TransactionId,
    pub status: TransactionStatus,
    pub outputs: Vec<Output>,
    pub rejection: Option<String>,
}

#[async_trait]
pub trait Backend: Send + Sync {
    fn mode(&self) -> ExecutionMode;

    /// Short label for logs and status output.
    fn describe(&self) -> String;

    async fn derive_address(&self, private_key: &PrivateKey) -> Result<Address>;

    async fn is_deployed(&self, program: &ProgramId) -> Result<bool>;

    async fn deploy(&self, program: &ProgramId, signer: &PrivateKey) -> Result<PendingTransaction>;

    async fn execute(
        &self,
        program: &ProgramId,
        function: &str,
        inputs: &[Value],
        signer: &PrivateKey,
    ) -> Result<PendingTransaction>;

    /// Wait until `pending` is accepted or rejected.
    async fn confirm(&self, pending: &PendingTransaction) -> Result<TransactionOutcome>;

    async fn mapping_value(
        &self,
        program: &ProgramId,
        mapping: &str,
        key: &Plaintext,
    ) -> Result<Option<Plaintext>>;

    /// Decrypt (or, for plaintext records, check) a record owned by `owner`.
    async fn decrypt_record(&self, record: &RawRecord, owner: &PrivateKey)
        -> Result<RecordPlaintext>;
}

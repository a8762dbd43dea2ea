//! Handles to submitted transactions.

use crate::backend::{Backend, PendingTransaction, TransactionOutcome};
use aleo_sandbox_types::{Output, ProgramId, RawRecord, TransactionId, TransactionStatus};
use std::sync::Arc;

/// Why `wait()` did not produce outputs.
#[derive(Debug)]
pub enum TransactionError {
    /// The transaction was finalized as rejected.
    Rejected {
        id: TransactionId,
        program: ProgramId,
        function: Option<String>,
        reason: Option<String>,
    },
    /// Confirmation could not be obtained (timeout, node unreachable, ...).
    Confirmation {
        id: TransactionId,
        source: anyhow::Error,
    },
}

impl TransactionError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, TransactionError::Rejected { .. })
    }
}

impl std::fmt::Display for TransactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionError::Rejected {
                id,
                program,
                function,
                reason,
            } => {
                match function {
                    Some(function) => write!(f, "{}/{} was rejected ({})", program, function, id)?,
                    None => write!(f, "Deployment of {} was rejected ({})", program, id)?,
                }
                if let Some(reason) = reason {
                    write!(f, ": {}", reason)?;
                }
                Ok(())
            }
            TransactionError::Confirmation { id, source } => {
                write!(f, "Could not confirm {}: {:#}", id, source)
            }
        }
    }
}

impl std::error::Error for TransactionError {}

/// A submitted transaction. `wait()` blocks until it is finalized.
#[derive(Clone)]
pub struct TransactionHandle {
    pending: PendingTransaction,
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for TransactionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionHandle")
            .field("id", &self.pending.id)
            .field("program", &self.pending.program)
            .field("function", &self.pending.function)
            .finish()
    }
}

impl TransactionHandle {
    pub(crate) fn new(pending: PendingTransaction, backend: Arc<dyn Backend>) -> Self {
        Self { pending, backend }
    }

    pub fn id(&self) -> &TransactionId {
        &self.pending.id
    }

    pub fn program(&self) -> &ProgramId {
        &self.pending.program
    }

    pub fn function(&self) -> Option<&str> {
        self.pending.function.as_deref()
    }

    /// Wait for finalization and return the outputs of the called function.
    pub async fn wait(&self) -> Result<Vec<Output>, TransactionError> {
        Ok(self.outcome().await?.outputs)
    }

    /// Like `wait()`, keeping only record outputs.
    pub async fn records(&self) -> Result<Vec<RawRecord>, TransactionError> {
        Ok(records(&self.wait().await?))
    }

    async fn outcome(&self) -> Result<TransactionOutcome, TransactionError> {
        let outcome = self
            .backend
            .confirm(&self.pending)
            .await
            .map_err(|source| TransactionError::Confirmation {
                id: self.pending.id.clone(),
                source,
            })?;
        if outcome.status == TransactionStatus::Rejected {
            tracing::debug!(tx = %outcome.id, program = %self.pending.program, "rejected");
            return Err(TransactionError::Rejected {
                id: outcome.id,
                program: self.pending.program.clone(),
                function: self.pending.function.clone(),
                reason: outcome.rejection,
            });
        }
        tracing::debug!(tx = %outcome.id, outputs = outcome.outputs.len(), "accepted");
        Ok(outcome)
    }
}

/// The record outputs among `outputs`, in order.
pub fn records(outputs: &[Output]) -> Vec<RawRecord> {
    outputs
        .iter()
        .filter_map(|o| o.as_record().cloned())
        .collect()
}

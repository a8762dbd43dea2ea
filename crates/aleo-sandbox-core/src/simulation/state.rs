//! Persistent state types for simulation serialization.
//!
//! The CLI keeps one state file per sandbox so that a deploy in one
//! invocation is visible to a call in the next.

use super::types::{LedgerState, TransactionRecord};

/// Persistent sandbox state that can be saved to/loaded from a file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PersistentState {
    /// Version of the state format (for forward compatibility).
    pub version: u32,
    /// Deployments, mappings and records.
    pub ledger: LedgerState,
    /// Settled transactions, oldest first.
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub metadata: Option<StateMetadata>,
}

impl PersistentState {
    /// Current state format version.
    pub const CURRENT_VERSION: u32 = 1;
}

/// Metadata for state files.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct StateMetadata {
    /// Human-readable description of this state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When this state was created (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// When this state was last written (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

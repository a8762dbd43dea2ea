//! Core types for the simulation environment.

use aleo_sandbox_types::{
    Address, Output, Plaintext, ProgramId, RawRecord, TransactionId, TransactionStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Record version stamped on newly issued records.
pub const RECORD_VERSION: u8 = 1;

// ============================================================================
// Ledger
// ============================================================================

/// Deployment of one program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub deployer: Address,
    pub transaction_id: TransactionId,
    pub height: u32,
}

/// A record issued by some program, live or spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub program: ProgramId,
    /// Record type name within the program (e.g. `token`).
    pub name: String,
    pub owner: Address,
    /// Canonical plaintext, compared byte-for-byte on consumption.
    pub raw: RawRecord,
    /// Hex commitment, for display.
    pub commitment: String,
    pub spent: bool,
}

/// Everything a transaction can change. Transactions run against a clone
/// and the clone replaces the original only when they succeed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    /// Deployments keyed by program id.
    pub deployments: BTreeMap<String, Deployment>,
    /// program id -> mapping name -> canonical key -> value.
    pub mappings: BTreeMap<String, BTreeMap<String, BTreeMap<String, Plaintext>>>,
    /// Records keyed by nonce.
    pub records: BTreeMap<String, StoredRecord>,
    pub height: u32,
    /// Monotonic counter feeding record nonces.
    pub counter: u64,
}

impl LedgerState {
    pub fn mapping_get(&self, program: &ProgramId, mapping: &str, key: &Plaintext) -> Option<&Plaintext> {
        self.mappings
            .get(program.as_str())
            .and_then(|m| m.get(mapping))
            .and_then(|entries| entries.get(&key.to_string()))
    }

    pub fn mapping_set(&mut self, program: &ProgramId, mapping: &str, key: &Plaintext, value: Plaintext) {
        self.mappings
            .entry(program.to_string())
            .or_default()
            .entry(mapping.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn next_counter(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }
}

// ============================================================================
// Transactions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deploy,
    Execute,
}

/// A settled transaction, accepted or rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub program: ProgramId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    pub signer: Address,
    pub status: TransactionStatus,
    pub outputs: Vec<Output>,
    /// Why the transaction was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    pub height: u32,
    /// RFC 3339 timestamp of settlement.
    pub timestamp: String,
}

impl TransactionRecord {
    pub fn is_accepted(&self) -> bool {
        self.status == TransactionStatus::Accepted
    }
}

/// Counts for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSummary {
    pub deployed_programs: Vec<String>,
    pub live_records: usize,
    pub spent_records: usize,
    pub mapping_entries: usize,
    pub transactions: usize,
    pub rejected_transactions: usize,
    pub height: u32,
}

impl std::fmt::Display for StateSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "height:        {}", self.height)?;
        writeln!(f, "programs:      {}", self.deployed_programs.join(", "))?;
        writeln!(
            f,
            "records:       {} live, {} spent",
            self.live_records, self.spent_records
        )?;
        writeln!(f, "mapping keys:  {}", self.mapping_entries)?;
        write!(
            f,
            "transactions:  {} ({} rejected)",
            self.transactions, self.rejected_transactions
        )
    }
}

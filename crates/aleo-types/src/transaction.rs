//! Transaction identifiers and outputs.

use crate::record::RawRecord;
use crate::value::Plaintext;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of transaction ids.
pub const TRANSACTION_ID_PREFIX: &str = "at1";
/// Total length of an encoded transaction id.
pub const TRANSACTION_ID_LENGTH: usize = 61;

/// A transaction id (`at1…`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionId(String);

impl TransactionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Synthetic id whose data part is `digest` folded onto the bech32 alphabet.
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(format!(
            "{}{}",
            TRANSACTION_ID_PREFIX,
            crate::address::bech32_fold(digest, TRANSACTION_ID_LENGTH - TRANSACTION_ID_PREFIX.len())
        ))
    }

    /// True if `s` looks like a transaction id.
    pub fn is_valid(s: &str) -> bool {
        s.len() == TRANSACTION_ID_LENGTH
            && s.starts_with(TRANSACTION_ID_PREFIX)
            && s[TRANSACTION_ID_PREFIX.len()..]
                .chars()
                .all(|c| crate::address::BECH32_CHARSET.contains(c))
    }
}

impl FromStr for TransactionId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(anyhow!("Invalid transaction id '{}'", s))
        }
    }
}

impl TryFrom<String> for TransactionId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TransactionId> for String {
    fn from(value: TransactionId) -> Self {
        value.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.0)
    }
}

/// Final status of a confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Accepted,
    Rejected,
}

/// One output of an executed function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Output {
    /// A record owned by some account, plaintext or ciphertext.
    Record(RawRecord),
    /// A public or constant value.
    Value(Plaintext),
    /// A private non-record value, still encrypted.
    Ciphertext(String),
    /// A finalize future; only meaningful to the node.
    Future(String),
    /// A record of another program, referenced by commitment.
    ExternalRecord(String),
}

impl Output {
    pub fn as_record(&self) -> Option<&RawRecord> {
        match self {
            Output::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Plaintext> {
        match self {
            Output::Value(v) => Some(v),
            _ => None,
        }
    }
}

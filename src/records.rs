//! Mode-aware record decoding.

use crate::backend::Backend;
use aleo_sandbox_types::{PrivateKey, RawRecord, RecordPlaintext};
use anyhow::{Context, Result};
use std::sync::Arc;

/// How records returned by a transaction are turned into plaintext.
///
/// Chosen once per session: evaluate mode returns plaintext records that
/// only need parsing, execute mode returns ciphertexts that have to be
/// decrypted with the owner's key.
#[derive(Clone)]
pub enum RecordCodec {
    Parse,
    Decrypt(Arc<dyn Backend>),
}

impl std::fmt::Debug for RecordCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordCodec::Parse => f.write_str("RecordCodec::Parse"),
            RecordCodec::Decrypt(backend) => write!(f, "RecordCodec::Decrypt({})", backend.describe()),
        }
    }
}

impl RecordCodec {
    /// Parse a plaintext record. Works in either mode.
    pub fn parse(raw: &RawRecord) -> Result<RecordPlaintext> {
        raw.as_str()
            .parse()
            .with_context(|| format!("Failed to parse record {}", abbreviate(raw.as_str())))
    }

    /// Decode `raw`, owned by the account behind `private_key`.
    pub async fn decode(&self, raw: &RawRecord, private_key: &PrivateKey) -> Result<RecordPlaintext> {
        match self {
            RecordCodec::Parse => Self::parse(raw),
            RecordCodec::Decrypt(backend) => backend
                .decrypt_record(raw, private_key)
                .await
                .with_context(|| format!("Failed to decrypt record {}", abbreviate(raw.as_str()))),
        }
    }
}

fn abbreviate(raw: &str) -> String {
    const MAX: usize = 48;
    match raw.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}…", &raw[..end]),
        None => raw.to_string(),
    }
}

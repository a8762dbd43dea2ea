//! Shared types for the aleo-sandbox workspace.
//!
//! This crate provides the value model used by every other crate in the
//! workspace, so that the transport, the local sandbox and the client layer
//! agree on how addresses, program values and records are spelled.
//!
//! ## Modules
//!
//! - [`address`]: addresses, private/view keys and program ids
//! - [`value`]: Aleo plaintext literals, structs and arrays
//! - [`record`]: record plaintexts and raw (possibly encrypted) records
//! - [`transaction`]: transaction ids and outputs
//! - [`mode`]: execution mode selection
//! - [`env_utils`]: environment variable helpers

pub mod address;
pub mod env_utils;
pub mod mode;
pub mod record;
pub mod transaction;
pub mod value;

// Re-export commonly used types at crate root
pub use address::{Address, PrivateKey, ProgramId, ViewKey};
pub use mode::ExecutionMode;
pub use record::{Entry, RawRecord, RecordPlaintext, Value};
pub use transaction::{Output, TransactionId, TransactionStatus};
pub use value::{Literal, Plaintext, Visibility};

use std::time::Duration;

/// Configuration for retry behavior on network operations.
#[derive(Debug, Copy, Clone)]
pub struct RetryConfig {
    /// Number of retry attempts.
    pub retries: usize,
    /// Initial backoff duration between retries.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
}

impl RetryConfig {
    /// Create a new RetryConfig with the specified parameters.
    pub fn new(retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    /// Backoff to wait before the given (zero-based) attempt.
    ///
    /// Doubles from `initial_backoff` and saturates at `max_backoff`.
    pub fn backoff_for(&self, attempt: usize) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(16) as u32).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 8,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_millis(5000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_saturates() {
        let retry = RetryConfig::new(5, 100, 1000);
        assert_eq!(retry.backoff_for(0), Duration::from_millis(100));
        assert_eq!(retry.backoff_for(1), Duration::from_millis(200));
        assert_eq!(retry.backoff_for(3), Duration::from_millis(800));
        assert_eq!(retry.backoff_for(4), Duration::from_millis(1000));
        assert_eq!(retry.backoff_for(60), Duration::from_millis(1000));
    }
}

//! Network-dependent test utilities.
//!
//! Tests that need a running snarkOS devnet and the `snarkos` binary are
//! `#[ignore]`d and additionally gated by `RUN_NETWORK_TESTS`.

use std::env;

/// Environment variable to enable network tests.
pub const RUN_NETWORK_TESTS_VAR: &str = "RUN_NETWORK_TESTS";

/// Check if network tests should be run.
///
/// Enabled when `RUN_NETWORK_TESTS` is set to any non-empty value.
pub fn should_run_network_tests() -> bool {
    env::var(RUN_NETWORK_TESTS_VAR)
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}

/// Macro to skip a test if network tests are not enabled.
#[macro_export]
macro_rules! skip_if_no_network {
    () => {
        if !$crate::common::network::should_run_network_tests() {
            eprintln!(
                "Skipping {}: {} not set",
                module_path!(),
                $crate::common::network::RUN_NETWORK_TESTS_VAR
            );
            return;
        }
    };
}

#![allow(unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `assertions`: error and rejection assertions with readable messages
//! - `network`: gating for tests that need a snarkOS node
//! - `setup`: sessions with the bundled programs deployed

pub mod assertions;
pub mod network;
pub mod setup;

pub use assertions::{assert_error_contains, assert_ok, assert_rejected};
pub use network::should_run_network_tests;
pub use setup::{evaluate_session, Contracts};

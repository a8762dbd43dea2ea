//! Aleo Transport Layer
//!
//! Network transport for talking to a snarkOS node.
//!
//! This crate provides:
//! - [`rest`]: REST client for program, mapping and transaction queries
//! - [`snarkos`]: wrapper around the `snarkos` binary, which builds, proves
//!   and broadcasts deployments and executions
//! - [`network`]: endpoint and network-id helpers
//!
//! # Example
//!
//! ```ignore
//! use aleo_transport::rest::NodeClient;
//!
//! let client = NodeClient::local_devnet();
//! let deployed = client.is_deployed(&"token.aleo".parse()?)?;
//! ```

pub mod network;
pub mod rest;
pub mod snarkos;

// Re-export main types for convenience
pub use rest::{ConfirmedTransaction, NodeClient};
pub use snarkos::{AccountKeys, Broadcast, SnarkosCli};

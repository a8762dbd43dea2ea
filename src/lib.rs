//! Aleo Contract Test Harness
//!
//! Drives Aleo programs through typed contract clients and asserts on the
//! resulting on-chain state:
//!
//! - **Evaluate mode**: an in-process sandbox ([`aleo_sandbox_core`]) with
//!   native implementations of the bundled programs. No node, no proofs.
//! - **Execute mode**: the `snarkos` binary for proving and broadcasting, the
//!   node's REST API for confirmation and mapping reads.
//!
//! The mode only changes how calls are carried out and how records are
//! decoded; the same suite runs unchanged against either.
//!
//! See [`session::Session`] to get started and [`runner::Suite`] for writing
//! ordered test suites.

#![allow(clippy::type_complexity)]

pub mod backend;
pub mod bindings;
pub mod client;
pub mod config;
pub mod logging;
pub mod records;
pub mod runner;
pub mod session;
pub mod transaction;

pub use backend::{Backend, NetworkBackend, SandboxBackend};
pub use bindings::{HandlerV1Contract, Token, TokenContract, TokenV1Contract};
pub use client::ProgramClient;
pub use config::AleoConfig;
pub use records::RecordCodec;
pub use runner::{ensure_deployed, SetupFailure, Suite, SuiteReport};
pub use session::{Account, Session};
pub use transaction::{TransactionError, TransactionHandle};

pub use aleo_sandbox_types::{
    Address, ExecutionMode, Output, Plaintext, PrivateKey, ProgramId, RawRecord, RecordPlaintext,
    TransactionId, Value,
};

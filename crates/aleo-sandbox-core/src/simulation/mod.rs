//! # Simulation Environment
//!
//! In-process stand-in for an Aleo node, used by evaluate mode.
//!
//! ## Module Organization
//!
//! - [`types`]: ledger, stored records and settled transactions
//! - [`errors`]: structured error types (SimulationError)
//! - [`state`]: persistent state for save/load (PersistentState)
//! - [`environment`]: the SimulationEnvironment itself
//!
//! ## Example Usage
//!
//! ```no_run
//! use aleo_sandbox_core::simulation::SimulationEnvironment;
//! use std::path::Path;
//!
//! let env = SimulationEnvironment::from_state_file(Path::new("state.json")).unwrap();
//! println!("{}", env.summary());
//! ```

pub mod environment;
pub mod errors;
pub mod state;
pub mod types;

pub use environment::SimulationEnvironment;
pub use errors::SimulationError;
pub use state::{PersistentState, StateMetadata};
pub use types::{
    Deployment, LedgerState, StateSummary, StoredRecord, TransactionKind, TransactionRecord,
    RECORD_VERSION,
};

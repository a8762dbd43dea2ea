//! Local execution engine for Aleo programs.
//!
//! Programs are implemented natively against [`programs::NativeProgram`] and
//! executed by [`simulation::SimulationEnvironment`], which keeps deployments,
//! mappings and the record set in memory and applies each transaction
//! atomically.
//!
//! ```no_run
//! use aleo_sandbox_core::accounts;
//! use aleo_sandbox_core::simulation::SimulationEnvironment;
//! use aleo_sandbox_types::{Plaintext, Value};
//!
//! let mut env = SimulationEnvironment::new();
//! let admin = accounts::devnet_accounts()[0].1.clone();
//! let token = "token.aleo".parse().unwrap();
//! env.deploy(&admin, &token).unwrap();
//! env.execute(
//!     &admin,
//!     &token,
//!     "mint_public",
//!     &[Value::from(Plaintext::address(&admin)), Value::from(Plaintext::u64(10))],
//! )
//! .unwrap();
//! ```

pub mod accounts;
pub mod programs;
pub mod simulation;

pub use programs::{NativeProgram, ProgramRegistry};
pub use simulation::{SimulationEnvironment, SimulationError};

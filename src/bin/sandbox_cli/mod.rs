//! CLI subcommand implementations for aleo-sandbox

pub mod accounts;
pub mod context;
pub mod decode;
pub mod deploy;
pub mod mapping;
pub mod output;
pub mod run;
pub mod status;

pub use context::{CliContext, GlobalArgs};

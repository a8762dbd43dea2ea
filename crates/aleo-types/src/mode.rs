//! Execution mode selection.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where contract calls run.
///
/// The mode is chosen once per session and decides both the backend and the
/// record decoding path; expected numeric outcomes do not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Local evaluation in the in-process sandbox. No proofs; records are
    /// returned as plaintext and decoded by parsing.
    #[serde(alias = "leo_run", alias = "leorun")]
    Evaluate,
    /// Full execution against a network. Records are returned encrypted and
    /// decoded with the owner's key.
    #[default]
    #[serde(alias = "snark_execute", alias = "snarkexecute")]
    Execute,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Evaluate => "evaluate",
            ExecutionMode::Execute => "execute",
        }
    }

    /// True when calls never leave the process.
    pub fn is_local(&self) -> bool {
        matches!(self, ExecutionMode::Evaluate)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "evaluate" | "leo_run" | "leorun" => Ok(ExecutionMode::Evaluate),
            "execute" | "snark_execute" | "snarkexecute" => Ok(ExecutionMode::Execute),
            other => Err(anyhow!(
                "Unknown execution mode '{}' (expected 'evaluate' or 'execute')",
                other
            )),
        }
    }
}

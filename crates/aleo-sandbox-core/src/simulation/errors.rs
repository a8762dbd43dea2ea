//! Simulation error types.
//!
//! Everything except [`SimulationError::ContractAbort`] is raised before a
//! transaction exists, the way a prover refuses to build one. Aborts happen
//! while the transaction runs and turn into a rejected transaction.

use aleo_sandbox_types::{Address, ProgramId};

/// Structured errors from the simulation environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// The program has no native implementation in the registry.
    UnknownProgram { program: ProgramId },

    /// The program exists but has not been deployed in this environment.
    NotDeployed { program: ProgramId },

    /// A second deployment of the same program.
    AlreadyDeployed {
        program: ProgramId,
        /// Who deployed it first.
        deployer: Address,
    },

    /// A deployment whose import is not deployed yet.
    MissingImport {
        program: ProgramId,
        import: ProgramId,
    },

    /// No function with this name.
    UnknownFunction {
        program: ProgramId,
        function: String,
    },

    /// No mapping with this name.
    UnknownMapping {
        program: ProgramId,
        mapping: String,
    },

    /// Wrong number or type of inputs.
    InvalidInput {
        program: ProgramId,
        function: String,
        message: String,
    },

    /// The input record was never issued, or has been altered since.
    UnknownRecord { nonce: String },

    /// The input record was already consumed.
    RecordAlreadySpent { nonce: String },

    /// The input record belongs to someone other than the signer.
    RecordNotOwned { nonce: String, owner: Address },

    /// A contract assertion failed during execution.
    ContractAbort {
        program: ProgramId,
        function: String,
        message: String,
    },
}

impl SimulationError {
    /// True for errors that reject a transaction rather than prevent it.
    pub fn is_abort(&self) -> bool {
        matches!(self, SimulationError::ContractAbort { .. })
    }
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::UnknownProgram { program } => {
                write!(f, "Program '{}' is not known to the sandbox", program)
            }
            SimulationError::NotDeployed { program } => {
                write!(f, "Program '{}' is not deployed", program)
            }
            SimulationError::AlreadyDeployed { program, deployer } => {
                write!(
                    f,
                    "Program '{}' is already deployed (by {})",
                    program, deployer
                )
            }
            SimulationError::MissingImport { program, import } => {
                write!(
                    f,
                    "Cannot deploy '{}': imported program '{}' is not deployed",
                    program, import
                )
            }
            SimulationError::UnknownFunction { program, function } => {
                write!(f, "Function '{}/{}' does not exist", program, function)
            }
            SimulationError::UnknownMapping { program, mapping } => {
                write!(f, "Mapping '{}/{}' does not exist", program, mapping)
            }
            SimulationError::InvalidInput {
                program,
                function,
                message,
            } => write!(f, "Invalid input to {}/{}: {}", program, function, message),
            SimulationError::UnknownRecord { nonce } => {
                write!(f, "Record with nonce {} does not exist or was modified", nonce)
            }
            SimulationError::RecordAlreadySpent { nonce } => {
                write!(f, "Record with nonce {} is already spent", nonce)
            }
            SimulationError::RecordNotOwned { nonce, owner } => {
                write!(
                    f,
                    "Record with nonce {} is owned by {}, not the signer",
                    nonce, owner
                )
            }
            SimulationError::ContractAbort {
                program,
                function,
                message,
            } => write!(f, "{}/{} aborted: {}", program, function, message),
        }
    }
}

impl std::error::Error for SimulationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_display_names_function() {
        let err = SimulationError::ContractAbort {
            program: "handler_v1.aleo".parse().unwrap(),
            function: "buy_token".into(),
            message: "amount exceeds mint limit".into(),
        };
        assert!(err.is_abort());
        assert_eq!(
            err.to_string(),
            "handler_v1.aleo/buy_token aborted: amount exceeds mint limit"
        );
    }
}

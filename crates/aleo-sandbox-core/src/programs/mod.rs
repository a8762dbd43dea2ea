//! Native program implementations.
//!
//! A [`NativeProgram`] plays the part of compiled Aleo instructions: it
//! receives the function inputs through a [`CallContext`], which carries the
//! signer and caller, gives access to the program's own mappings, consumes
//! and issues records, and performs cross-program calls.
//!
//! All state access goes to a staged copy of the ledger owned by the
//! environment; nothing a program does is visible until the whole
//! transaction succeeds.

pub mod handler_v1;
pub mod token;
pub mod token_v1;

use std::collections::BTreeMap;
use std::sync::Arc;

use aleo_sandbox_types::{Address, Entry, Plaintext, ProgramId, RawRecord, RecordPlaintext, Value};

use crate::accounts::{digest, program_address};
use crate::simulation::types::{LedgerState, StoredRecord, RECORD_VERSION};
use crate::simulation::SimulationError;

/// Maximum depth of nested cross-program calls.
pub const MAX_CALL_DEPTH: usize = 31;

/// The immediate caller of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// The transaction signer, calling directly.
    Account(Address),
    /// Another program, calling through an import.
    Program(ProgramId),
}

impl Caller {
    /// The caller as an address; programs act as their derived address.
    pub fn address(&self) -> Address {
        match self {
            Caller::Account(address) => address.clone(),
            Caller::Program(program) => program_address(program),
        }
    }

    pub fn is_program(&self, program: &ProgramId) -> bool {
        matches!(self, Caller::Program(p) if p == program)
    }
}

/// A program the sandbox can execute.
pub trait NativeProgram: Send + Sync {
    fn id(&self) -> ProgramId;

    /// Programs that must be deployed first and that this program may call.
    fn imports(&self) -> Vec<ProgramId> {
        Vec::new()
    }

    fn mappings(&self) -> &'static [&'static str];

    fn functions(&self) -> &'static [&'static str];

    /// Run `function`. Mapping writes through the context form the finalize
    /// part of the call.
    fn call(
        &self,
        ctx: &mut CallContext<'_>,
        function: &str,
        inputs: &[Value],
    ) -> Result<Vec<Value>, SimulationError>;
}

/// Native programs by id.
#[derive(Clone, Default)]
pub struct ProgramRegistry {
    programs: BTreeMap<String, Arc<dyn NativeProgram>>,
}

impl std::fmt::Debug for ProgramRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.programs.keys()).finish()
    }
}

impl ProgramRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `token.aleo`, `token_v1.aleo` and `handler_v1.aleo`.
    pub fn with_fixtures() -> Self {
        let mut registry = Self::new();
        registry.register(token::TokenProgram::token());
        registry.register(token_v1::token_v1());
        registry.register(handler_v1::HandlerV1);
        registry
    }

    pub fn register(&mut self, program: impl NativeProgram + 'static) {
        self.programs
            .insert(program.id().to_string(), Arc::new(program));
    }

    pub fn get(&self, program: &ProgramId) -> Option<Arc<dyn NativeProgram>> {
        self.programs.get(program.as_str()).cloned()
    }

    pub fn ids(&self) -> Vec<ProgramId> {
        self.programs.values().map(|p| p.id()).collect()
    }
}

/// Execution context of one function call.
pub struct CallContext<'a> {
    registry: &'a ProgramRegistry,
    ledger: &'a mut LedgerState,
    program: ProgramId,
    function: String,
    mappings: &'static [&'static str],
    imports: Vec<ProgramId>,
    signer: Address,
    caller: Caller,
    depth: usize,
    finalized: bool,
}

impl<'a> CallContext<'a> {
    /// Context for a call made directly by `signer`.
    pub(crate) fn root(
        registry: &'a ProgramRegistry,
        ledger: &'a mut LedgerState,
        program: &dyn NativeProgram,
        function: &str,
        signer: &Address,
    ) -> Self {
        Self {
            registry,
            ledger,
            program: program.id(),
            function: function.to_string(),
            mappings: program.mappings(),
            imports: program.imports(),
            signer: signer.clone(),
            caller: Caller::Account(signer.clone()),
            depth: 0,
            finalized: false,
        }
    }

    pub fn program(&self) -> &ProgramId {
        &self.program
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// The account that signed the transaction.
    pub fn signer(&self) -> &Address {
        &self.signer
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// Account that deployed the running program.
    pub fn deployer(&self) -> Option<&Address> {
        self.ledger
            .deployments
            .get(self.program.as_str())
            .map(|d| &d.deployer)
    }

    /// True once any mapping has been written in this call or a nested one.
    pub fn has_finalize(&self) -> bool {
        self.finalized
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    pub fn abort(&self, message: impl Into<String>) -> SimulationError {
        SimulationError::ContractAbort {
            program: self.program.clone(),
            function: self.function.clone(),
            message: message.into(),
        }
    }

    pub fn ensure(&self, condition: bool, message: &str) -> Result<(), SimulationError> {
        if condition {
            Ok(())
        } else {
            Err(self.abort(message))
        }
    }

    pub fn invalid(&self, message: impl Into<String>) -> SimulationError {
        SimulationError::InvalidInput {
            program: self.program.clone(),
            function: self.function.clone(),
            message: message.into(),
        }
    }

    pub fn checked_add(&self, a: u64, b: u64) -> Result<u64, SimulationError> {
        a.checked_add(b)
            .ok_or_else(|| self.abort(format!("u64 overflow: {} + {}", a, b)))
    }

    pub fn checked_sub(&self, a: u64, b: u64) -> Result<u64, SimulationError> {
        a.checked_sub(b)
            .ok_or_else(|| self.abort(format!("u64 underflow: {} - {}", a, b)))
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    pub fn expect_inputs(&self, inputs: &[Value], count: usize) -> Result<(), SimulationError> {
        if inputs.len() == count {
            Ok(())
        } else {
            Err(self.invalid(format!(
                "expected {} inputs, got {}",
                count,
                inputs.len()
            )))
        }
    }

    fn plaintext_input<'v>(
        &self,
        inputs: &'v [Value],
        index: usize,
    ) -> Result<&'v Plaintext, SimulationError> {
        inputs
            .get(index)
            .and_then(Value::as_plaintext)
            .ok_or_else(|| self.invalid(format!("input {} must be a plain value", index)))
    }

    pub fn input_u64(&self, inputs: &[Value], index: usize) -> Result<u64, SimulationError> {
        let value = self.plaintext_input(inputs, index)?;
        value
            .as_u64()
            .ok_or_else(|| self.invalid(format!("input {} must be a u64, got {}", index, value)))
    }

    pub fn input_u8(&self, inputs: &[Value], index: usize) -> Result<u8, SimulationError> {
        let value = self.plaintext_input(inputs, index)?;
        value
            .as_u8()
            .ok_or_else(|| self.invalid(format!("input {} must be a u8, got {}", index, value)))
    }

    pub fn input_address(&self, inputs: &[Value], index: usize) -> Result<Address, SimulationError> {
        let value = self.plaintext_input(inputs, index)?;
        value.as_address().cloned().ok_or_else(|| {
            self.invalid(format!("input {} must be an address, got {}", index, value))
        })
    }

    pub fn input_record<'v>(
        &self,
        inputs: &'v [Value],
        index: usize,
    ) -> Result<&'v RecordPlaintext, SimulationError> {
        inputs
            .get(index)
            .and_then(Value::as_record)
            .ok_or_else(|| self.invalid(format!("input {} must be a record", index)))
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    /// Spend `record`. It must have been issued by this program, be
    /// unchanged, unspent, and owned by the signer.
    pub fn consume(&mut self, record: &RecordPlaintext) -> Result<(), SimulationError> {
        let nonce = record.nonce().to_string();
        let raw = RawRecord::from(record);
        let stored = self
            .ledger
            .records
            .get(&nonce)
            .filter(|stored| stored.raw == raw)
            .ok_or_else(|| SimulationError::UnknownRecord {
                nonce: nonce.clone(),
            })?;

        if stored.program != self.program {
            return Err(self.invalid(format!(
                "record belongs to {}, not {}",
                stored.program, self.program
            )));
        }
        if stored.spent {
            return Err(SimulationError::RecordAlreadySpent { nonce });
        }
        if stored.owner != self.signer {
            return Err(SimulationError::RecordNotOwned {
                nonce,
                owner: stored.owner.clone(),
            });
        }

        if let Some(stored) = self.ledger.records.get_mut(&nonce) {
            stored.spent = true;
        }
        Ok(())
    }

    /// Issue a new record of type `name` to `owner`.
    pub fn issue(
        &mut self,
        name: &str,
        owner: &Address,
        data: Vec<(String, Entry)>,
    ) -> RecordPlaintext {
        let counter = self.ledger.next_counter();
        let seed = digest(&[
            b"nonce",
            self.program.as_str().as_bytes(),
            &counter.to_le_bytes(),
        ]);
        let nonce = group_digits(&seed);
        let record =
            RecordPlaintext::new(owner.clone(), data, nonce.clone()).with_version(RECORD_VERSION);
        let raw = RawRecord::from(&record);
        let commitment = hex::encode(digest(&[b"commitment", raw.as_str().as_bytes()]));

        tracing::trace!(program = %self.program, record = name, owner = %owner, "issued record");
        self.ledger.records.insert(
            nonce,
            StoredRecord {
                program: self.program.clone(),
                name: name.to_string(),
                owner: owner.clone(),
                raw,
                commitment,
                spent: false,
            },
        );
        record
    }

    // ------------------------------------------------------------------
    // Mappings
    // ------------------------------------------------------------------

    fn check_mapping(&self, mapping: &str) -> Result<(), SimulationError> {
        if self.mappings.contains(&mapping) {
            Ok(())
        } else {
            Err(SimulationError::UnknownMapping {
                program: self.program.clone(),
                mapping: mapping.to_string(),
            })
        }
    }

    pub fn get(&self, mapping: &str, key: &Plaintext) -> Result<Option<Plaintext>, SimulationError> {
        self.check_mapping(mapping)?;
        Ok(self
            .ledger
            .mapping_get(&self.program, mapping, key)
            .cloned())
    }

    pub fn contains(&self, mapping: &str, key: &Plaintext) -> Result<bool, SimulationError> {
        Ok(self.get(mapping, key)?.is_some())
    }

    /// `get.or_use` for u64-valued mappings.
    pub fn get_u64_or(
        &self,
        mapping: &str,
        key: &Plaintext,
        default: u64,
    ) -> Result<u64, SimulationError> {
        match self.get(mapping, key)? {
            None => Ok(default),
            Some(value) => value.as_u64().ok_or_else(|| {
                self.abort(format!("{}[{}] holds {}, not a u64", mapping, key, value))
            }),
        }
    }

    pub fn set(&mut self, mapping: &str, key: &Plaintext, value: Plaintext) -> Result<(), SimulationError> {
        self.check_mapping(mapping)?;
        self.finalized = true;
        self.ledger.mapping_set(&self.program, mapping, key, value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cross-program calls
    // ------------------------------------------------------------------

    /// Call `program/function` as this program. The callee must be imported
    /// and deployed.
    pub fn call(
        &mut self,
        program: &ProgramId,
        function: &str,
        inputs: &[Value],
    ) -> Result<Vec<Value>, SimulationError> {
        if !self.imports.contains(program) {
            return Err(self.invalid(format!("{} does not import {}", self.program, program)));
        }
        if self.depth + 1 > MAX_CALL_DEPTH {
            return Err(self.abort("call depth exceeded"));
        }
        let callee = self
            .registry
            .get(program)
            .ok_or_else(|| SimulationError::UnknownProgram {
                program: program.clone(),
            })?;
        if !self.ledger.deployments.contains_key(program.as_str()) {
            return Err(SimulationError::NotDeployed {
                program: program.clone(),
            });
        }
        if !callee.functions().contains(&function) {
            return Err(SimulationError::UnknownFunction {
                program: program.clone(),
                function: function.to_string(),
            });
        }

        let mut child = CallContext {
            registry: self.registry,
            ledger: &mut *self.ledger,
            program: program.clone(),
            function: function.to_string(),
            mappings: callee.mappings(),
            imports: callee.imports(),
            signer: self.signer.clone(),
            caller: Caller::Program(self.program.clone()),
            depth: self.depth + 1,
            finalized: false,
        };
        let outputs = callee.call(&mut child, function, inputs)?;
        self.finalized |= child.finalized;
        Ok(outputs)
    }
}

/// Decimal digits standing in for a group element.
fn group_digits(seed: &[u8; 32]) -> String {
    let mut high = [0u8; 16];
    let mut low = [0u8; 8];
    high.copy_from_slice(&seed[..16]);
    low.copy_from_slice(&seed[16..24]);
    format!("{}{}", u128::from_be_bytes(high), u64::from_be_bytes(low))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_fixtures() {
        let registry = ProgramRegistry::with_fixtures();
        let ids: Vec<String> = registry.ids().iter().map(|p| p.to_string()).collect();
        assert_eq!(ids, vec!["handler_v1.aleo", "token.aleo", "token_v1.aleo"]);
    }

    #[test]
    fn test_caller_address_for_programs() {
        let program: ProgramId = "handler_v1.aleo".parse().unwrap();
        let caller = Caller::Program(program.clone());
        assert_eq!(caller.address(), program_address(&program));
        assert!(caller.is_program(&program));
    }

    #[test]
    fn test_group_digits_are_numeric() {
        let digits = group_digits(&[7u8; 32]);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}

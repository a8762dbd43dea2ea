//! The simulation environment.
//!
//! Owns the ledger (deployments, mappings, records) and the transaction
//! history. Each deployment or execution settles as one transaction:
//!
//! - errors a prover would hit (unknown program or function, bad inputs,
//!   bad records) are returned as `Err` and leave no trace;
//! - contract aborts settle as a *rejected* transaction and leave the ledger
//!   untouched, apart from the block height;
//! - everything else is accepted and its staged ledger replaces the current one.

use aleo_sandbox_types::{
    Address, Output, Plaintext, ProgramId, RawRecord, TransactionId, TransactionStatus, Value,
};
use anyhow::{anyhow, Result};
use std::path::Path;

use super::errors::SimulationError;
use super::state::{PersistentState, StateMetadata};
use super::types::{
    Deployment, LedgerState, StateSummary, StoredRecord, TransactionKind, TransactionRecord,
};
use crate::accounts::digest;
use crate::programs::{CallContext, NativeProgram, ProgramRegistry};

pub struct SimulationEnvironment {
    registry: ProgramRegistry,
    ledger: LedgerState,
    transactions: Vec<TransactionRecord>,
    created_at: String,
}

impl Default for SimulationEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimulationEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEnvironment")
            .field("registry", &self.registry)
            .field("height", &self.ledger.height)
            .field("transactions", &self.transactions.len())
            .finish()
    }
}

impl SimulationEnvironment {
    /// Environment with the bundled fixture programs.
    pub fn new() -> Self {
        Self::with_registry(ProgramRegistry::with_fixtures())
    }

    pub fn with_registry(registry: ProgramRegistry) -> Self {
        Self {
            registry,
            ledger: LedgerState::default(),
            transactions: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Environment restored from `path` when it exists, fresh otherwise.
    pub fn from_state_file(path: &Path) -> Result<Self> {
        let mut env = Self::new();
        if path.exists() {
            env.load_state(path)?;
        }
        Ok(env)
    }

    pub fn registry(&self) -> &ProgramRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &LedgerState {
        &self.ledger
    }

    fn program(&self, program: &ProgramId) -> Result<std::sync::Arc<dyn NativeProgram>, SimulationError> {
        self.registry
            .get(program)
            .ok_or_else(|| SimulationError::UnknownProgram {
                program: program.clone(),
            })
    }

    pub fn is_deployed(&self, program: &ProgramId) -> bool {
        self.ledger.deployments.contains_key(program.as_str())
    }

    pub fn deployment(&self, program: &ProgramId) -> Option<&Deployment> {
        self.ledger.deployments.get(program.as_str())
    }

    fn next_transaction_id(&self, kind: &str, program: &ProgramId, function: &str, signer: &Address) -> TransactionId {
        let index = self.transactions.len() as u64;
        TransactionId::from_digest(&digest(&[
            b"transaction",
            kind.as_bytes(),
            &index.to_le_bytes(),
            program.as_str().as_bytes(),
            function.as_bytes(),
            signer.as_str().as_bytes(),
        ]))
    }

    fn settle(&mut self, record: TransactionRecord) -> TransactionRecord {
        self.transactions.push(record.clone());
        record
    }

    /// Deploy `program` on behalf of `deployer`.
    pub fn deploy(
        &mut self,
        deployer: &Address,
        program: &ProgramId,
    ) -> Result<TransactionRecord, SimulationError> {
        let native = self.program(program)?;
        if let Some(existing) = self.deployment(program) {
            return Err(SimulationError::AlreadyDeployed {
                program: program.clone(),
                deployer: existing.deployer.clone(),
            });
        }
        if let Some(import) = native.imports().into_iter().find(|i| !self.is_deployed(i)) {
            return Err(SimulationError::MissingImport {
                program: program.clone(),
                import,
            });
        }

        let id = self.next_transaction_id("deploy", program, "", deployer);
        self.ledger.height += 1;
        self.ledger.deployments.insert(
            program.to_string(),
            Deployment {
                deployer: deployer.clone(),
                transaction_id: id.clone(),
                height: self.ledger.height,
            },
        );
        tracing::info!(program = %program, deployer = %deployer, tx = %id, "deployed");

        Ok(self.settle(TransactionRecord {
            id,
            kind: TransactionKind::Deploy,
            program: program.clone(),
            function: None,
            signer: deployer.clone(),
            status: TransactionStatus::Accepted,
            outputs: Vec::new(),
            rejection: None,
            height: self.ledger.height,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }))
    }

    /// Execute `program/function` signed by `signer`.
    pub fn execute(
        &mut self,
        signer: &Address,
        program: &ProgramId,
        function: &str,
        inputs: &[Value],
    ) -> Result<TransactionRecord, SimulationError> {
        let native = self.program(program)?;
        if !self.is_deployed(program) {
            return Err(SimulationError::NotDeployed {
                program: program.clone(),
            });
        }
        if !native.functions().contains(&function) {
            return Err(SimulationError::UnknownFunction {
                program: program.clone(),
                function: function.to_string(),
            });
        }

        let mut staged = self.ledger.clone();
        let (result, finalized) = {
            let mut ctx = CallContext::root(&self.registry, &mut staged, native.as_ref(), function, signer);
            let result = native.call(&mut ctx, function, inputs);
            (result, ctx.has_finalize())
        };

        let id = self.next_transaction_id("execute", program, function, signer);
        let (status, outputs, rejection) = match result {
            Ok(values) => {
                let mut outputs: Vec<Output> = values
                    .into_iter()
                    .map(|value| match value {
                        Value::Record(record) => Output::Record(RawRecord::from(&record)),
                        Value::Plaintext(plaintext) => Output::Value(plaintext),
                    })
                    .collect();
                if finalized {
                    outputs.push(Output::Future(format!("{}/{}", program, function)));
                }
                self.ledger = staged;
                (TransactionStatus::Accepted, outputs, None)
            }
            Err(err) if err.is_abort() => {
                tracing::debug!(tx = %id, error = %err, "transaction rejected");
                (TransactionStatus::Rejected, Vec::new(), Some(err.to_string()))
            }
            Err(err) => return Err(err),
        };
        self.ledger.height += 1;
        tracing::debug!(
            program = %program,
            function,
            signer = %signer,
            tx = %id,
            status = ?status,
            "executed"
        );

        Ok(self.settle(TransactionRecord {
            id,
            kind: TransactionKind::Execute,
            program: program.clone(),
            function: Some(function.to_string()),
            signer: signer.clone(),
            status,
            outputs,
            rejection,
            height: self.ledger.height,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }))
    }

    /// Current value of `program/mapping[key]`.
    pub fn mapping_value(
        &self,
        program: &ProgramId,
        mapping: &str,
        key: &Plaintext,
    ) -> Result<Option<Plaintext>, SimulationError> {
        let native = self.program(program)?;
        if !native.mappings().contains(&mapping) {
            return Err(SimulationError::UnknownMapping {
                program: program.clone(),
                mapping: mapping.to_string(),
            });
        }
        if !self.is_deployed(program) {
            return Err(SimulationError::NotDeployed {
                program: program.clone(),
            });
        }
        Ok(self.ledger.mapping_get(program, mapping, key).cloned())
    }

    /// Records owned by `owner`, oldest nonce order; spent ones only if asked.
    pub fn records_owned_by(&self, owner: &Address, include_spent: bool) -> Vec<&StoredRecord> {
        self.ledger
            .records
            .values()
            .filter(|r| &r.owner == owner && (include_spent || !r.spent))
            .collect()
    }

    pub fn transaction(&self, id: &TransactionId) -> Option<&TransactionRecord> {
        self.transactions.iter().find(|t| &t.id == id)
    }

    pub fn history(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub fn summary(&self) -> StateSummary {
        let spent = self.ledger.records.values().filter(|r| r.spent).count();
        StateSummary {
            deployed_programs: self.ledger.deployments.keys().cloned().collect(),
            live_records: self.ledger.records.len() - spent,
            spent_records: spent,
            mapping_entries: self
                .ledger
                .mappings
                .values()
                .flat_map(|m| m.values())
                .map(|entries| entries.len())
                .sum(),
            transactions: self.transactions.len(),
            rejected_transactions: self.transactions.iter().filter(|t| !t.is_accepted()).count(),
            height: self.ledger.height,
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn export_state(&self) -> PersistentState {
        PersistentState {
            version: PersistentState::CURRENT_VERSION,
            ledger: self.ledger.clone(),
            transactions: self.transactions.clone(),
            metadata: Some(StateMetadata {
                description: None,
                created_at: Some(self.created_at.clone()),
                modified_at: Some(chrono::Utc::now().to_rfc3339()),
            }),
        }
    }

    /// Replace the ledger and history with `state`.
    pub fn import_state(&mut self, state: PersistentState) -> Result<()> {
        if state.version > PersistentState::CURRENT_VERSION {
            return Err(anyhow!(
                "State file version {} is newer than supported version {}",
                state.version,
                PersistentState::CURRENT_VERSION
            ));
        }
        if let Some(unknown) = state
            .ledger
            .deployments
            .keys()
            .find(|p| {
                p.parse::<ProgramId>()
                    .map_or(true, |id| self.registry.get(&id).is_none())
            })
        {
            return Err(anyhow!("State file deploys unknown program '{}'", unknown));
        }

        self.ledger = state.ledger;
        self.transactions = state.transactions;
        if let Some(created_at) = state.metadata.and_then(|m| m.created_at) {
            self.created_at = created_at;
        }
        Ok(())
    }

    /// Save the current state to a file.
    pub fn save_state(&self, path: &Path) -> Result<()> {
        let state = self.export_state();
        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| anyhow!("Failed to serialize state: {}", e))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow!("Failed to create {}: {}", parent.display(), e))?;
        }
        std::fs::write(path, json).map_err(|e| anyhow!("Failed to write state file: {}", e))?;
        Ok(())
    }

    /// Load state from a file, replacing the current state.
    pub fn load_state(&mut self, path: &Path) -> Result<()> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read state file: {}", e))?;
        let state: PersistentState = serde_json::from_str(&json)
            .map_err(|e| anyhow!("Failed to parse state file: {}", e))?;
        self.import_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::devnet_accounts;
    use aleo_sandbox_types::RecordPlaintext;

    fn admin() -> Address {
        devnet_accounts()[0].1.clone()
    }

    fn token() -> ProgramId {
        ProgramId::from_static("token.aleo")
    }

    fn mint_private(env: &mut SimulationEnvironment, to: &Address, amount: u64) -> RecordPlaintext {
        let result = env
            .execute(
                to,
                &token(),
                "mint_private",
                &[Plaintext::address(to).into(), Plaintext::u64(amount).into()],
            )
            .unwrap();
        result.outputs[0].as_record().unwrap().as_str().parse().unwrap()
    }

    #[test]
    fn test_deploy_once() {
        let mut env = SimulationEnvironment::new();
        env.deploy(&admin(), &token()).unwrap();
        let err = env.deploy(&admin(), &token()).unwrap_err();
        assert!(matches!(err, SimulationError::AlreadyDeployed { .. }));
        assert_eq!(env.deployment(&token()).unwrap().deployer, admin());
    }

    #[test]
    fn test_deploy_requires_imports() {
        let mut env = SimulationEnvironment::new();
        let err = env
            .deploy(&admin(), &ProgramId::from_static("handler_v1.aleo"))
            .unwrap_err();
        assert!(matches!(err, SimulationError::MissingImport { .. }));
        assert!(env.history().is_empty());
    }

    #[test]
    fn test_call_errors_surface_immediately() {
        let mut env = SimulationEnvironment::new();
        let err = env.execute(&admin(), &token(), "mint_public", &[]).unwrap_err();
        assert!(matches!(err, SimulationError::NotDeployed { .. }));

        env.deploy(&admin(), &token()).unwrap();
        let err = env.execute(&admin(), &token(), "burn", &[]).unwrap_err();
        assert!(matches!(err, SimulationError::UnknownFunction { .. }));

        let err = env.execute(&admin(), &token(), "mint_public", &[]).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInput { .. }));

        let unknown = ProgramId::from_static("nft.aleo");
        assert!(matches!(
            env.deploy(&admin(), &unknown).unwrap_err(),
            SimulationError::UnknownProgram { .. }
        ));
    }

    #[test]
    fn test_spent_record_cannot_be_respent() {
        let mut env = SimulationEnvironment::new();
        env.deploy(&admin(), &token()).unwrap();
        let owner = admin();
        let record = mint_private(&mut env, &owner, 100);
        let inputs = vec![
            Value::Record(record),
            Plaintext::address(&owner).into(),
            Plaintext::u64(40).into(),
        ];
        env.execute(&owner, &token(), "transfer_private", &inputs).unwrap();
        let err = env
            .execute(&owner, &token(), "transfer_private", &inputs)
            .unwrap_err();
        assert!(matches!(err, SimulationError::RecordAlreadySpent { .. }));
    }

    #[test]
    fn test_record_checks() {
        let mut env = SimulationEnvironment::new();
        env.deploy(&admin(), &token()).unwrap();
        let owner = admin();
        let thief = devnet_accounts()[1].1.clone();
        let record = mint_private(&mut env, &owner, 100);

        let transfer = |record: RecordPlaintext| {
            vec![
                Value::Record(record),
                Plaintext::address(&thief).into(),
                Plaintext::u64(1).into(),
            ]
        };

        let err = env
            .execute(&thief, &token(), "transfer_private", &transfer(record.clone()))
            .unwrap_err();
        assert!(matches!(err, SimulationError::RecordNotOwned { .. }));

        let forged: RecordPlaintext = record
            .to_string()
            .replace("100u64", "900u64")
            .parse()
            .unwrap();
        let err = env
            .execute(&owner, &token(), "transfer_private", &transfer(forged))
            .unwrap_err();
        assert!(matches!(err, SimulationError::UnknownRecord { .. }));
    }

    #[test]
    fn test_rejected_execution_keeps_state() {
        let mut env = SimulationEnvironment::new();
        env.deploy(&admin(), &token()).unwrap();
        let owner = admin();
        let record = mint_private(&mut env, &owner, 10);
        let before = env.ledger().clone();

        let inputs = vec![
            Value::Record(record),
            Plaintext::address(&owner).into(),
            Plaintext::u64(11).into(),
        ];
        let result = env.execute(&owner, &token(), "transfer_private", &inputs).unwrap();
        assert_eq!(result.status, TransactionStatus::Rejected);
        assert!(result.outputs.is_empty());
        assert_eq!(env.ledger().records, before.records);
        assert_eq!(env.ledger().height, before.height + 1);
        assert_eq!(env.summary().rejected_transactions, 1);
    }

    #[test]
    fn test_finalize_emits_future_output() {
        let mut env = SimulationEnvironment::new();
        env.deploy(&admin(), &token()).unwrap();
        let owner = admin();
        let result = env
            .execute(
                &owner,
                &token(),
                "mint_public",
                &[Plaintext::address(&owner).into(), Plaintext::u64(1).into()],
            )
            .unwrap();
        assert_eq!(
            result.outputs,
            vec![Output::Future("token.aleo/mint_public".to_string())]
        );
        assert_eq!(env.transaction(&result.id).unwrap().height, 2);
    }

    #[test]
    fn test_save_and_load_preserve_balances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let owner = admin();

        let mut env = SimulationEnvironment::new();
        env.deploy(&owner, &token()).unwrap();
        env.execute(
            &owner,
            &token(),
            "mint_public",
            &[Plaintext::address(&owner).into(), Plaintext::u64(77).into()],
        )
        .unwrap();
        mint_private(&mut env, &owner, 5);
        env.save_state(&path).unwrap();

        let restored = SimulationEnvironment::from_state_file(&path).unwrap();
        assert!(restored.is_deployed(&token()));
        let balance = restored
            .mapping_value(&token(), "account", &Plaintext::address(&owner))
            .unwrap();
        assert_eq!(balance.and_then(|b| b.as_u64()), Some(77));
        assert_eq!(restored.records_owned_by(&owner, false).len(), 1);
        assert_eq!(restored.history().len(), 3);
    }

    #[test]
    fn test_newer_state_version_rejected() {
        let mut env = SimulationEnvironment::new();
        let mut state = env.export_state();
        state.version = PersistentState::CURRENT_VERSION + 1;
        assert!(env.import_state(state).is_err());
    }
}

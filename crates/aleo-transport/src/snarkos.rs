//! Wrapper around the `snarkos` binary.
//!
//! Proving and broadcasting are delegated to `snarkos developer`, so this
//! module only assembles arguments and scrapes the values it needs (ids,
//! keys, records) out of the command's stdout.

use aleo_sandbox_types::{
    Address, PrivateKey, ProgramId, RawRecord, RecordPlaintext, TransactionId, ViewKey,
};
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::network::network_id;

/// Environment variable overriding the binary location.
pub const SNARKOS_BIN_ENV: &str = "ALEO_SNARKOS_BIN";

/// Keys derived from a private key by `snarkos account import`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountKeys {
    pub view_key: ViewKey,
    pub address: Address,
}

/// Where and how a transaction is broadcast.
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub endpoint: String,
    pub network: String,
    pub priority_fee_microcredits: u64,
}

impl Broadcast {
    fn args(&self) -> Result<Vec<String>> {
        let endpoint = self.endpoint.trim_end_matches('/');
        let id = network_id(&self.network)
            .ok_or_else(|| anyhow!("Unknown network '{}'", self.network))?;
        Ok(vec![
            "--query".to_string(),
            endpoint.to_string(),
            "--broadcast".to_string(),
            format!("{}/{}/transaction/broadcast", endpoint, self.network),
            "--priority-fee".to_string(),
            self.priority_fee_microcredits.to_string(),
            "--network".to_string(),
            id.to_string(),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct SnarkosCli {
    binary: PathBuf,
}

impl Default for SnarkosCli {
    fn default() -> Self {
        Self::from_env()
    }
}

impl SnarkosCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// `$ALEO_SNARKOS_BIN`, or `snarkos` on the `PATH`.
    pub fn from_env() -> Self {
        let binary = std::env::var(SNARKOS_BIN_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "snarkos".to_string());
        Self::new(binary)
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run the binary and return its stdout. Non-zero exit is an error
    /// carrying both streams.
    fn run(&self, args: &[String]) -> Result<String> {
        tracing::debug!(
            binary = %self.binary.display(),
            command = %redact_args(args).join(" "),
            "running snarkos"
        );
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .with_context(|| {
                format!(
                    "Failed to run '{}'. Is snarkos installed?",
                    self.binary.display()
                )
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "snarkos {} failed ({}):\n{}\n{}",
                args.iter().take(2).cloned().collect::<Vec<_>>().join(" "),
                output.status,
                stdout.trim(),
                stderr.trim()
            ));
        }
        Ok(stdout)
    }

    pub fn account_import(&self, private_key: &PrivateKey) -> Result<AccountKeys> {
        let stdout = self.run(&[
            "account".to_string(),
            "import".to_string(),
            private_key.as_str().to_string(),
        ])?;
        parse_account_import(&stdout)
    }

    /// Deploy the program built under `path` (the directory holding `main.aleo`).
    pub fn deploy(
        &self,
        program: &ProgramId,
        path: &Path,
        private_key: &PrivateKey,
        broadcast: &Broadcast,
    ) -> Result<TransactionId> {
        let mut args = vec![
            "developer".to_string(),
            "deploy".to_string(),
            program.to_string(),
            "--private-key".to_string(),
            private_key.as_str().to_string(),
            "--path".to_string(),
            path.display().to_string(),
        ];
        args.extend(broadcast.args()?);
        let stdout = self.run(&args)?;
        extract_transaction_id(&stdout)
            .ok_or_else(|| anyhow!("No transaction id in deploy output:\n{}", stdout.trim()))
    }

    pub fn execute(
        &self,
        program: &ProgramId,
        function: &str,
        inputs: &[String],
        private_key: &PrivateKey,
        broadcast: &Broadcast,
    ) -> Result<TransactionId> {
        let mut args = vec![
            "developer".to_string(),
            "execute".to_string(),
            program.to_string(),
            function.to_string(),
        ];
        args.extend(inputs.iter().cloned());
        args.push("--private-key".to_string());
        args.push(private_key.as_str().to_string());
        args.extend(broadcast.args()?);
        let stdout = self.run(&args)?;
        extract_transaction_id(&stdout).ok_or_else(|| {
            anyhow!(
                "No transaction id in output of {}/{}:\n{}",
                program,
                function,
                stdout.trim()
            )
        })
    }

    pub fn decrypt(&self, ciphertext: &RawRecord, view_key: &ViewKey) -> Result<RecordPlaintext> {
        let stdout = self.run(&[
            "developer".to_string(),
            "decrypt".to_string(),
            "--ciphertext".to_string(),
            ciphertext.as_str().to_string(),
            "--view-key".to_string(),
            view_key.as_str().to_string(),
        ])?;
        extract_record(&stdout)
    }
}

fn redact_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next || arg.starts_with("APrivateKey1") || arg.starts_with("AViewKey1") {
            out.push("<redacted>".to_string());
        } else {
            out.push(arg.clone());
        }
        hide_next = arg == "--private-key" || arg == "--view-key";
    }
    out
}

fn tokens(output: &str) -> impl Iterator<Item = &str> {
    output
        .split(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | ',' | '(' | ')'))
        .filter(|t| !t.is_empty())
}

/// The last transaction id mentioned in `output`.
pub fn extract_transaction_id(output: &str) -> Option<TransactionId> {
    tokens(output)
        .filter(|t| TransactionId::is_valid(t))
        .last()
        .and_then(|t| t.parse().ok())
}

pub fn parse_account_import(output: &str) -> Result<AccountKeys> {
    let view_key = tokens(output)
        .find_map(|t| t.parse::<ViewKey>().ok())
        .ok_or_else(|| anyhow!("No view key in account output"))?;
    let address = tokens(output)
        .find_map(|t| t.parse::<Address>().ok())
        .ok_or_else(|| anyhow!("No address in account output"))?;
    Ok(AccountKeys { view_key, address })
}

/// The first `{ ... }` record in `output`.
pub fn extract_record(output: &str) -> Result<RecordPlaintext> {
    let start = output
        .find('{')
        .ok_or_else(|| anyhow!("No record in decrypt output:\n{}", output.trim()))?;
    let end = output
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| anyhow!("Unterminated record in decrypt output"))?;
    output[start..=end]
        .parse()
        .context("Failed to parse decrypted record")
}

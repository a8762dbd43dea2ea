//! Decode command - parse or decrypt a record

use aleo_sandbox::RawRecord;
use anyhow::Result;
use clap::Parser;
use serde_json::json;

use super::output::print_json;
use super::CliContext;

#[derive(Parser, Debug)]
pub struct DecodeCmd {
    /// Record ciphertext (record1...) or plaintext
    pub record: String,

    /// Index of the owning account
    #[arg(long, default_value = "0")]
    pub account: usize,
}

impl DecodeCmd {
    pub async fn execute(&self, ctx: &CliContext, json_output: bool) -> Result<()> {
        let owner = ctx.account(self.account)?;
        let raw = RawRecord::new(self.record.trim());
        let record = ctx.session.codec().decode(&raw, &owner.private_key).await?;
        if json_output {
            let data: serde_json::Map<_, _> = record
                .data()
                .iter()
                .map(|(name, entry)| (name.clone(), json!(entry.value.to_string())))
                .collect();
            print_json(&json!({
                "owner": record.owner(),
                "data": data,
                "nonce": record.nonce(),
                "version": record.version(),
            }));
        } else {
            println!("{}", record);
        }
        Ok(())
    }
}

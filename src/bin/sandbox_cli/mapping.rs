//! Mapping command - read one mapping entry

use aleo_sandbox::{Plaintext, ProgramId};
use anyhow::Result;
use clap::Parser;
use serde_json::json;

use super::output::print_json;
use super::CliContext;

#[derive(Parser, Debug)]
pub struct MappingCmd {
    pub program: ProgramId,

    pub mapping: String,

    /// Key as an Aleo literal (e.g. aleo1... or 0u8)
    pub key: Plaintext,
}

impl MappingCmd {
    pub async fn execute(&self, ctx: &CliContext, json_output: bool) -> Result<()> {
        let value = ctx
            .session
            .client(&self.program)
            .mapping(&self.mapping, &self.key)
            .await?;
        if json_output {
            print_json(&json!({
                "program": self.program,
                "mapping": self.mapping,
                "key": self.key,
                "value": value,
            }));
        } else {
            match value {
                Some(value) => println!("{}", value),
                None => println!("(none)"),
            }
        }
        Ok(())
    }
}

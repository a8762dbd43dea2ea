//! Run command - execute one function and wait for it to finalize

use aleo_sandbox::{ProgramId, Value};
use anyhow::{anyhow, Context, Result};
use clap::Parser;

use super::output::{print_accepted, print_rejected};
use super::CliContext;

#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Program (e.g. token.aleo)
    pub program: ProgramId,

    /// Function name
    pub function: String,

    /// Inputs as Aleo literals (10u64, aleo1..., true) or plaintext records
    pub inputs: Vec<String>,

    /// Signing account index
    #[arg(long, default_value = "0")]
    pub account: usize,
}

impl RunCmd {
    pub async fn execute(&self, ctx: &CliContext, json_output: bool) -> Result<()> {
        let inputs = self
            .inputs
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                raw.parse::<Value>()
                    .with_context(|| format!("input {} ('{}')", i, raw))
            })
            .collect::<Result<Vec<_>>>()?;

        let client = ctx.session.client(&self.program).with_signer(self.account)?;
        let handle = client.call(&self.function, &inputs).await?;
        match handle.wait().await {
            Ok(outputs) => {
                print_accepted(handle.id(), &outputs, json_output);
                Ok(())
            }
            Err(err) => {
                print_rejected(&err, json_output);
                Err(anyhow!(err))
            }
        }
    }
}

//! Status command - session overview or one program's deployment

use aleo_sandbox::ProgramId;
use anyhow::Result;
use clap::Parser;
use serde_json::json;

use super::output::print_json;
use super::CliContext;

#[derive(Parser, Debug)]
pub struct StatusCmd {
    /// Program to check (e.g. token.aleo)
    pub program: Option<ProgramId>,
}

impl StatusCmd {
    pub async fn execute(&self, ctx: &CliContext, json_output: bool) -> Result<()> {
        let session = &ctx.session;
        let deployed = match &self.program {
            Some(program) => Some(session.client(program).is_deployed().await?),
            None => None,
        };
        let summary = ctx.sandbox.as_ref().map(|s| s.summary());
        let height = match &ctx.node {
            Some(node) => match node.latest_height().await {
                Ok(height) => Some(height),
                Err(err) => {
                    tracing::warn!("{:#}", err);
                    None
                }
            },
            None => None,
        };

        if json_output {
            print_json(&json!({
                "mode": session.mode(),
                "network": session.network(),
                "backend": session.backend().describe(),
                "accounts": session.accounts().len(),
                "program": self.program,
                "deployed": deployed,
                "height": height,
                "sandbox": summary,
            }));
            return Ok(());
        }

        println!("mode:          {}", session.mode());
        println!("network:       {}", session.network());
        println!("backend:       {}", session.backend().describe());
        println!("accounts:      {}", session.accounts().len());
        if let Some(height) = height {
            println!("height:        {}", height);
        }
        if let (Some(program), Some(deployed)) = (&self.program, deployed) {
            let state = if deployed { "deployed" } else { "not deployed" };
            println!("{:<14} {}", format!("{}:", program), state);
        }
        if let Some(summary) = summary {
            println!("\n{}", summary);
        }
        Ok(())
    }
}

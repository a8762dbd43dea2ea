//! Accounts command - list signing accounts

use anyhow::Result;
use clap::Parser;
use serde_json::json;

use super::output::print_json;
use super::CliContext;

#[derive(Parser, Debug)]
pub struct AccountsCmd {
    /// Also print private keys
    #[arg(long)]
    pub show_keys: bool,
}

impl AccountsCmd {
    pub fn execute(&self, ctx: &CliContext, json_output: bool) -> Result<()> {
        let accounts = ctx.session.accounts();
        if json_output {
            let rows: Vec<_> = accounts
                .iter()
                .enumerate()
                .map(|(index, account)| {
                    let mut row = json!({ "index": index, "address": account.address });
                    if self.show_keys {
                        row["private_key"] = json!(account.private_key.as_str());
                    }
                    row
                })
                .collect();
            print_json(&rows);
            return Ok(());
        }

        if accounts.is_empty() {
            println!("No accounts configured for {}", ctx.session.network());
        }
        for (index, account) in accounts.iter().enumerate() {
            if self.show_keys {
                println!("[{}] {}  {}", index, account.address, account.private_key.as_str());
            } else {
                println!("[{}] {}", index, account.address);
            }
        }
        Ok(())
    }
}

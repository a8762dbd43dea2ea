//! Output formatting for aleo-sandbox CLI
//!
//! Human-readable text by default, pretty JSON with `--json`.

use aleo_sandbox::{Output, TransactionError, TransactionId};
use serde::Serialize;
use serde_json::json;

pub fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(err) => eprintln!("failed to serialize output: {}", err),
    }
}

/// Format one transaction output for display
pub fn format_output(output: &Output) -> String {
    match output {
        Output::Record(raw) => format!("record   {}", raw),
        Output::Value(value) => format!("value    {}", value),
        Output::Ciphertext(text) => format!("private  {}", text),
        Output::Future(future) => format!("future   {}", future),
        Output::ExternalRecord(commitment) => format!("external {}", commitment),
    }
}

/// Print a finalized transaction and its outputs
pub fn print_accepted(id: &TransactionId, outputs: &[Output], json_output: bool) {
    if json_output {
        print_json(&json!({
            "transaction": id,
            "status": "accepted",
            "outputs": outputs,
        }));
        return;
    }
    println!("\x1b[32m✓ Transaction accepted\x1b[0m {}", id);
    if !outputs.is_empty() {
        println!("\n\x1b[1mOutputs:\x1b[0m");
        for (i, output) in outputs.iter().enumerate() {
            println!("  [{}] {}", i, format_output(output));
        }
    }
}

pub fn print_rejected(err: &TransactionError, json_output: bool) {
    if json_output {
        let (id, reason) = match err {
            TransactionError::Rejected { id, reason, .. } => (id.to_string(), reason.clone()),
            TransactionError::Confirmation { id, source } => (id.to_string(), Some(format!("{:#}", source))),
        };
        print_json(&json!({
            "transaction": id,
            "status": if err.is_rejected() { "rejected" } else { "unconfirmed" },
            "reason": reason,
        }));
    } else {
        println!("\x1b[31m✗ {}\x1b[0m", err);
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error, json_output: bool) -> String {
    if json_output {
        #[derive(Serialize)]
        struct ErrorJson {
            error: String,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            causes: Vec<String>,
        }

        let err = ErrorJson {
            error: error.to_string(),
            causes: error.chain().skip(1).map(|e| e.to_string()).collect(),
        };
        serde_json::to_string_pretty(&err).unwrap_or_else(|_| "{}".to_string())
    } else {
        let mut out = format!("\x1b[31mError:\x1b[0m {}\n", error);
        let mut causes = error.chain().skip(1).peekable();
        if causes.peek().is_some() {
            out.push_str("Caused by:\n");
            for (idx, cause) in causes.enumerate() {
                out.push_str(&format!("  {}: {}\n", idx + 1, cause));
            }
        }
        out
    }
}

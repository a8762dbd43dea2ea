//! REST client for a snarkOS node.
//!
//! All routes are scoped by network name: `{endpoint}/{network}/...`.
//!
//! ## Routes used
//! - `GET /{network}/block/height/latest`
//! - `GET /{network}/program/{program_id}`
//! - `GET /{network}/program/{program_id}/mapping/{mapping}/{key}`
//! - `GET /{network}/transaction/confirmed/{transaction_id}`
//!
//! ## Usage
//!
//! ```ignore
//! let client = NodeClient::new("http://localhost:3030", "testnet");
//! let balance = client.mapping_value(&program, "account", &Plaintext::address(&owner))?;
//! ```

use aleo_sandbox_types::env_utils::env_var_or;
use aleo_sandbox_types::{
    Output, Plaintext, ProgramId, RawRecord, TransactionId, TransactionStatus,
};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::time::Duration;

use crate::network::LOCAL_DEVNET_ENDPOINT;

/// REST client for a single node and network.
#[derive(Clone)]
pub struct NodeClient {
    endpoint: String,
    network: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("endpoint", &self.endpoint)
            .field("network", &self.network)
            .finish()
    }
}

impl NodeClient {
    /// Default request timeout in seconds (can be overridden by env).
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    fn default_timeouts() -> (Duration, Duration) {
        let timeout_secs = env_var_or("ALEO_NODE_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS);
        let connect_secs =
            env_var_or("ALEO_NODE_CONNECT_TIMEOUT_SECS", Self::DEFAULT_CONNECT_TIMEOUT_SECS);
        (
            Duration::from_secs(timeout_secs),
            Duration::from_secs(connect_secs),
        )
    }

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    /// Client for a local devnet on the default port.
    pub fn local_devnet() -> Self {
        Self::new(LOCAL_DEVNET_ENDPOINT, "testnet")
    }

    pub fn new(endpoint: &str, network: &str) -> Self {
        let (timeout, connect_timeout) = Self::default_timeouts();
        Self::with_timeouts(endpoint, network, timeout, connect_timeout)
    }

    /// Create a client with explicit timeouts.
    pub fn with_timeouts(
        endpoint: &str,
        network: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            network: network.to_string(),
            agent: Self::build_agent(timeout, connect_timeout),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    /// Full URL of a network-scoped route.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            self.network,
            path.trim_start_matches('/')
        )
    }

    /// GET a JSON document. A 404 is `Ok(None)`.
    fn get_json(&self, path: &str) -> Result<Option<Value>> {
        let url = self.url(path);
        tracing::trace!(url = %url, "node request");
        match self.agent.get(&url).call() {
            Ok(response) => {
                let value: Value = response
                    .into_json()
                    .map_err(|e| anyhow!("Failed to parse response from {}: {}", url, e))?;
                Ok(Some(value))
            }
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(anyhow!("Node returned HTTP {} for {}: {}", code, url, body.trim()))
            }
            Err(e) => Err(anyhow!("Node request to {} failed: {}", url, e)),
        }
    }

    /// Height of the latest block.
    pub fn latest_height(&self) -> Result<u32> {
        let value = self
            .get_json("block/height/latest")?
            .ok_or_else(|| anyhow!("Node has no latest block height"))?;
        parse_height(&value)
    }

    /// Source of a deployed program, or `None` if it is not deployed.
    pub fn program(&self, program: &ProgramId) -> Result<Option<String>> {
        let Some(value) = self.get_json(&format!("program/{}", program))? else {
            return Ok(None);
        };
        match value {
            Value::String(source) => Ok(Some(source)),
            other => Ok(Some(other.to_string())),
        }
    }

    pub fn is_deployed(&self, program: &ProgramId) -> Result<bool> {
        Ok(self.program(program)?.is_some())
    }

    /// Current value of a mapping entry, or `None` if the key is absent.
    pub fn mapping_value(
        &self,
        program: &ProgramId,
        mapping: &str,
        key: &Plaintext,
    ) -> Result<Option<Plaintext>> {
        let path = format!("program/{}/mapping/{}/{}", program, mapping, key);
        let Some(value) = self.get_json(&path)? else {
            return Ok(None);
        };
        match value {
            Value::Null => Ok(None),
            Value::String(raw) => raw
                .parse::<Plaintext>()
                .map(Some)
                .with_context(|| format!("mapping {}/{}[{}]", program, mapping, key)),
            other => Err(anyhow!("Unexpected mapping value response: {}", other)),
        }
    }

    /// The confirmed transaction document, or `None` while it is still pending.
    pub fn confirmed_transaction(&self, id: &TransactionId) -> Result<Option<Value>> {
        self.get_json(&format!("transaction/confirmed/{}", id))
    }
}

/// The parts of a confirmed transaction the harness cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTransaction {
    pub id: Option<TransactionId>,
    pub status: TransactionStatus,
    /// Outputs of the selected transition, in declaration order.
    pub outputs: Vec<Output>,
}

/// Extract status and outputs from a `transaction/confirmed` document.
///
/// The transition whose program and function match is selected; without a
/// match (or without a filter) the last transition is used, which is the
/// root call of an execution.
pub fn parse_confirmed_transaction(
    json: &Value,
    program: Option<&ProgramId>,
    function: Option<&str>,
) -> Result<ConfirmedTransaction> {
    let status = match json.get("status").and_then(|s| s.as_str()) {
        Some("accepted") => TransactionStatus::Accepted,
        Some("rejected") => TransactionStatus::Rejected,
        Some(other) => bail!("Unknown transaction status '{}'", other),
        None => bail!("Confirmed transaction has no status"),
    };

    let transaction = json.get("transaction");
    let id = transaction
        .and_then(|t| t.get("id"))
        .and_then(|id| id.as_str())
        .and_then(|id| id.parse::<TransactionId>().ok());

    let transitions = transaction
        .and_then(|t| t.pointer("/execution/transitions"))
        .and_then(|t| t.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let matches = |t: &&Value| {
        let program_ok = program.map_or(true, |p| {
            t.get("program").and_then(|v| v.as_str()) == Some(p.as_str())
        });
        let function_ok =
            function.map_or(true, |f| t.get("function").and_then(|v| v.as_str()) == Some(f));
        program_ok && function_ok
    };
    let selected = transitions
        .iter()
        .filter(matches)
        .last()
        .or_else(|| transitions.last());

    let outputs = match selected.and_then(|t| t.get("outputs")).and_then(|o| o.as_array()) {
        Some(raw) => raw.iter().map(parse_output).collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(ConfirmedTransaction {
        id,
        status,
        outputs,
    })
}

fn parse_height(value: &Value) -> Result<u32> {
    let height = value
        .as_u64()
        .ok_or_else(|| anyhow!("Unexpected block height response: {}", value))?;
    u32::try_from(height).context("block height out of range")
}

fn parse_output(output: &Value) -> Result<Output> {
    let kind = output
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| anyhow!("Transition output has no type: {}", output))?;
    let value = output.get("value").and_then(|v| v.as_str());
    let id = output.get("id").and_then(|v| v.as_str()).unwrap_or_default();

    Ok(match kind {
        "record" => Output::Record(RawRecord::new(
            value.ok_or_else(|| anyhow!("Record output has no value"))?,
        )),
        "public" | "constant" => {
            let raw = value.ok_or_else(|| anyhow!("{} output has no value", kind))?;
            Output::Value(
                raw.parse()
                    .with_context(|| format!("Failed to parse {} output", kind))?,
            )
        }
        "private" => Output::Ciphertext(value.unwrap_or_default().to_string()),
        "future" => Output::Future(value.unwrap_or_default().to_string()),
        "external_record" => Output::ExternalRecord(id.to_string()),
        other => bail!("Unknown transition output type '{}'", other),
    })
}

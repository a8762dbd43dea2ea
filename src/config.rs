//! Harness configuration.
//!
//! Configuration is read once per process from `aleo-config.yaml`:
//!
//! ```yaml
//! accounts: ["${ALEO_PRIVATE_KEY}"]
//! mode: execute
//! default_network: testnet
//! networks:
//!   testnet:
//!     endpoint: http://localhost:3030
//!     accounts: ["${ALEO_DEVNET_PRIVATE_KEY2}", "${ALEO_DEVNET_PRIVATE_KEY3}"]
//!     priority_fee: 0.01
//! ```
//!
//! A `.env` file next to the working directory is loaded first. String values
//! may reference environment variables as `${NAME}`. An account entry whose
//! variable is unset is dropped with a warning; an unset variable anywhere
//! else is an error.

use aleo_sandbox_types::env_utils::{env_non_empty, env_references, expand_with};
use aleo_sandbox_types::{ExecutionMode, PrivateKey};
use aleo_transport::network::{
    credits_to_microcredits, default_endpoint, network_id, LOCAL_DEVNET_ENDPOINT,
};
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name searched for by [`AleoConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "aleo-config.yaml";

/// Overrides the configured network.
pub const NETWORK_ENV: &str = "ALEO_NETWORK";
/// Overrides the configured execution mode.
pub const MODE_ENV: &str = "ALEO_MODE";

const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 180;
const DEFAULT_PROGRAMS_DIR: &str = "programs";

/// The configuration used when no file is found.
pub const DEFAULT_CONFIG_YAML: &str = r#"
accounts:
  - "${ALEO_PRIVATE_KEY}"
mode: execute
default_network: testnet
networks:
  testnet:
    endpoint: "http://localhost:3030"
    accounts:
      - "${ALEO_DEVNET_PRIVATE_KEY2}"
      - "${ALEO_DEVNET_PRIVATE_KEY3}"
    priority_fee: 0.01
  mainnet:
    endpoint: "https://api.explorer.aleo.org/v1"
    accounts:
      - "${ALEO_PRIVATE_KEY_MAINNET}"
    priority_fee: 0.001
"#;

// ============================================================================
// File format
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    accounts: Vec<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default, alias = "defaultNetwork")]
    default_network: Option<String>,
    #[serde(default, alias = "programsDir")]
    programs_dir: Option<String>,
    #[serde(default)]
    networks: BTreeMap<String, RawNetwork>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNetwork {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    accounts: Vec<String>,
    #[serde(default, alias = "priorityFee")]
    priority_fee: f64,
    #[serde(default, alias = "confirmationTimeoutSecs")]
    confirmation_timeout_secs: Option<u64>,
}

// ============================================================================
// Resolved configuration
// ============================================================================

/// One network entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub endpoint: String,
    /// Accounts for this network, in configured order. Empty means "use the
    /// top-level accounts".
    pub accounts: Vec<PrivateKey>,
    /// Priority fee in credits.
    pub priority_fee: f64,
    /// How long `wait()` polls for a confirmation.
    pub confirmation_timeout: Duration,
}

impl NetworkConfig {
    pub fn priority_fee_microcredits(&self) -> u64 {
        credits_to_microcredits(self.priority_fee)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AleoConfig {
    /// Fallback accounts for networks that list none.
    pub accounts: Vec<PrivateKey>,
    pub mode: ExecutionMode,
    pub networks: BTreeMap<String, NetworkConfig>,
    pub default_network: String,
    /// Root of built programs; `<programs_dir>/<name>/build` holds `main.aleo`.
    pub programs_dir: PathBuf,
}

impl AleoConfig {
    /// Load `path`, after loading `.env`.
    pub fn load(path: &Path) -> Result<Self> {
        dotenv::dotenv().ok();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_yaml_str_with(&yaml, env_non_empty)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        if let Some(dir) = path.parent() {
            if config.programs_dir.is_relative() && !dir.as_os_str().is_empty() {
                config.programs_dir = dir.join(&config.programs_dir);
            }
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Nearest `aleo-config.yaml` from the current directory upward, or the
    /// built-in default.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        match find_config_file(&cwd) {
            Some(path) => Self::load(&path),
            None => {
                dotenv::dotenv().ok();
                tracing::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
                Self::builtin()
            }
        }
    }

    /// The built-in configuration, resolved against the process environment.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str_with(DEFAULT_CONFIG_YAML, env_non_empty)
    }

    /// Evaluate mode against a local devnet layout, with no accounts and no
    /// environment lookups.
    pub fn local() -> Self {
        let mut networks = BTreeMap::new();
        networks.insert(
            "testnet".to_string(),
            NetworkConfig {
                endpoint: LOCAL_DEVNET_ENDPOINT.to_string(),
                accounts: Vec::new(),
                priority_fee: 0.0,
                confirmation_timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            },
        );
        Self {
            accounts: Vec::new(),
            mode: ExecutionMode::Evaluate,
            networks,
            default_network: "testnet".to_string(),
            programs_dir: PathBuf::from(DEFAULT_PROGRAMS_DIR),
        }
    }

    /// Parse `yaml`, resolving `${NAME}` through `lookup`.
    pub fn from_yaml_str_with<F>(yaml: &str, mut lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let raw: RawConfig = serde_yaml::from_str(yaml).context("Failed to parse config YAML")?;

        let mode = match raw.mode {
            Some(mode) => expand_with(&mode, &mut lookup)?.parse()?,
            None => ExecutionMode::default(),
        };
        let default_network = match raw.default_network {
            Some(name) => expand_with(&name, &mut lookup)?,
            None => "testnet".to_string(),
        };
        let programs_dir = match raw.programs_dir {
            Some(dir) => PathBuf::from(expand_with(&dir, &mut lookup)?),
            None => PathBuf::from(DEFAULT_PROGRAMS_DIR),
        };
        let accounts = resolve_accounts("accounts", &raw.accounts, &mut lookup)?;

        let mut networks = BTreeMap::new();
        for (name, network) in raw.networks {
            if network_id(&name).is_none() {
                bail!(
                    "Unknown network '{}' (expected mainnet, testnet or canary)",
                    name
                );
            }
            if network.priority_fee < 0.0 || !network.priority_fee.is_finite() {
                bail!("networks.{}.priority_fee must be a non-negative number", name);
            }
            let endpoint = match &network.endpoint {
                Some(endpoint) => expand_with(endpoint, &mut lookup)
                    .with_context(|| format!("networks.{}.endpoint", name))?,
                None => default_endpoint(&name),
            };
            let accounts = resolve_accounts(
                &format!("networks.{}.accounts", name),
                &network.accounts,
                &mut lookup,
            )?;
            networks.insert(
                name,
                NetworkConfig {
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    accounts,
                    priority_fee: network.priority_fee,
                    confirmation_timeout: Duration::from_secs(
                        network
                            .confirmation_timeout_secs
                            .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
                    ),
                },
            );
        }

        let config = Self {
            accounts,
            mode,
            networks,
            default_network,
            programs_dir,
        };
        config.network(&config.default_network)?;
        Ok(config)
    }

    /// Apply `ALEO_NETWORK` and `ALEO_MODE`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_with(env_non_empty)
    }

    /// Like [`AleoConfig::apply_env_overrides`], reading variables through
    /// `lookup`. Nothing changes unless every override is valid.
    pub fn apply_overrides_with<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let network = lookup(NETWORK_ENV);
        if let Some(network) = &network {
            self.network(network)
                .with_context(|| format!("{} is set to '{}'", NETWORK_ENV, network))?;
        }
        let mode = match lookup(MODE_ENV) {
            Some(mode) => Some(
                mode.parse::<ExecutionMode>()
                    .with_context(|| format!("{} is set to '{}'", MODE_ENV, mode))?,
            ),
            None => None,
        };
        if let Some(network) = network {
            self.default_network = network;
        }
        if let Some(mode) = mode {
            self.mode = mode;
        }
        Ok(())
    }

    pub fn network(&self, name: &str) -> Result<&NetworkConfig> {
        self.networks.get(name).ok_or_else(|| {
            anyhow!(
                "Network '{}' is not configured (known: {})",
                name,
                self.networks.keys().cloned().collect::<Vec<_>>().join(", ")
            )
        })
    }

    /// Accounts for `name`, falling back to the top-level list.
    pub fn accounts_for(&self, name: &str) -> Result<Vec<PrivateKey>> {
        let network = self.network(name)?;
        if network.accounts.is_empty() {
            Ok(self.accounts.clone())
        } else {
            Ok(network.accounts.clone())
        }
    }

    /// Directory handed to `snarkos developer deploy --path` for `program`.
    pub fn build_dir(&self, program_name: &str) -> PathBuf {
        self.programs_dir.join(program_name).join("build")
    }
}

fn resolve_accounts<F>(field: &str, entries: &[String], lookup: &mut F) -> Result<Vec<PrivateKey>>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut keys = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let missing: Vec<String> = env_references(entry)
            .into_iter()
            .filter(|name| lookup(name).is_none())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(
                field,
                index,
                variables = %missing.join(", "),
                "skipping account: environment variable not set"
            );
            continue;
        }
        let value = expand_with(entry, &mut *lookup)?;
        let key = value
            .parse::<PrivateKey>()
            .with_context(|| format!("{}[{}]", field, index))?;
        keys.push(key);
    }
    Ok(keys)
}

/// Walk from `start` up to the filesystem root looking for the config file.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY1: &str = "APrivateKey1zkp8CZNn3yeCseEtxuVPbDCwSyhGW6yZKUYKfgXmcpoGPWH";
    const KEY2: &str = "APrivateKey1zkp2RWGDcde3efb89rjhME1VYA8QMxcxep5DShNBR6n8Yjh";
    const KEY3: &str = "APrivateKey1zkp2GUmKbVsuc1NSj28pa1WTQuZaK5f1DQJAT6vPcHyWokG";

    fn vars(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config_mirrors_shipped_layout() {
        let config = AleoConfig::from_yaml_str_with(
            DEFAULT_CONFIG_YAML,
            vars(&[
                ("ALEO_PRIVATE_KEY", KEY1),
                ("ALEO_DEVNET_PRIVATE_KEY2", KEY2),
                ("ALEO_DEVNET_PRIVATE_KEY3", KEY3),
            ]),
        )
        .unwrap();

        assert_eq!(config.mode, ExecutionMode::Execute);
        assert_eq!(config.default_network, "testnet");
        let testnet = config.network("testnet").unwrap();
        assert_eq!(testnet.endpoint, "http://localhost:3030");
        assert_eq!(testnet.priority_fee_microcredits(), 10_000);
        assert_eq!(testnet.accounts.len(), 2);
        assert_eq!(testnet.accounts[0].as_str(), KEY2);

        // Mainnet's variable is unset, so it falls back to the top-level key.
        let mainnet = config.network("mainnet").unwrap();
        assert!(mainnet.accounts.is_empty());
        assert_eq!(mainnet.priority_fee_microcredits(), 1_000);
        assert_eq!(config.accounts_for("mainnet").unwrap()[0].as_str(), KEY1);
    }

    #[test]
    fn test_unset_non_account_variable_is_error() {
        let yaml = r#"
networks:
  testnet:
    endpoint: "${ALEO_TEST_ENDPOINT}"
"#;
        let err = AleoConfig::from_yaml_str_with(yaml, vars(&[])).unwrap_err();
        assert!(format!("{:#}", err).contains("ALEO_TEST_ENDPOINT"));
    }

    #[test]
    fn test_camel_case_keys_and_aliases() {
        let yaml = format!(
            r#"
accounts: ["{}"]
mode: leo_run
defaultNetwork: testnet
networks:
  testnet:
    endpoint: "http://127.0.0.1:3030/"
    priorityFee: 0.5
    confirmationTimeoutSecs: 30
"#,
            KEY1
        );
        let config = AleoConfig::from_yaml_str_with(&yaml, vars(&[])).unwrap();
        assert_eq!(config.mode, ExecutionMode::Evaluate);
        let testnet = config.network("testnet").unwrap();
        assert_eq!(testnet.endpoint, "http://127.0.0.1:3030");
        assert_eq!(testnet.confirmation_timeout, Duration::from_secs(30));
        assert_eq!(config.accounts_for("testnet").unwrap().len(), 1);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AleoConfig::from_yaml_str_with(DEFAULT_CONFIG_YAML, vars(&[])).unwrap();
        config
            .apply_overrides_with(vars(&[("ALEO_NETWORK", "mainnet"), ("ALEO_MODE", "leo_run")]))
            .unwrap();
        assert_eq!(config.default_network, "mainnet");
        assert_eq!(config.mode, ExecutionMode::Evaluate);

        config.apply_overrides_with(vars(&[])).unwrap();
        assert_eq!(config.default_network, "mainnet");

        let err = config
            .apply_overrides_with(vars(&[("ALEO_NETWORK", "canary"), ("ALEO_MODE", "execute")]))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("ALEO_NETWORK"));
        assert_eq!(config.mode, ExecutionMode::Evaluate);

        let err = config
            .apply_overrides_with(vars(&[("ALEO_NETWORK", "testnet"), ("ALEO_MODE", "simulate")]))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("ALEO_MODE"));
        assert_eq!(config.default_network, "mainnet");
    }

    #[test]
    fn test_missing_endpoint_uses_network_default() {
        let yaml = "networks:\n  mainnet: {}\n  testnet:\n    priority_fee: 0.01\n";
        let config = AleoConfig::from_yaml_str_with(yaml, vars(&[])).unwrap();
        assert_eq!(
            config.network("mainnet").unwrap().endpoint,
            "https://api.explorer.aleo.org/v1"
        );
        assert_eq!(
            config.network("testnet").unwrap().endpoint,
            "https://api.explorer.provable.com/v1"
        );
    }

    #[test]
    fn test_invalid_entries_rejected() {
        let bad_key = r#"
accounts: ["not-a-key"]
networks:
  testnet:
    endpoint: "http://localhost:3030"
"#;
        assert!(AleoConfig::from_yaml_str_with(bad_key, vars(&[])).is_err());

        let bad_network = r#"
networks:
  devnet:
    endpoint: "http://localhost:3030"
"#;
        assert!(AleoConfig::from_yaml_str_with(bad_network, vars(&[])).is_err());

        let missing_default = r#"
default_network: mainnet
networks:
  testnet:
    endpoint: "http://localhost:3030"
"#;
        assert!(AleoConfig::from_yaml_str_with(missing_default, vars(&[])).is_err());
    }

    #[test]
    fn test_unknown_network_lookup_lists_known() {
        let config = AleoConfig::from_yaml_str_with(DEFAULT_CONFIG_YAML, vars(&[])).unwrap();
        let err = config.network("canary").unwrap_err();
        assert!(err.to_string().contains("mainnet, testnet"));
    }

    #[test]
    fn test_load_resolves_programs_dir_and_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "mode: evaluate\nnetworks:\n  testnet:\n    endpoint: http://localhost:3030\n",
        )
        .unwrap();

        assert_eq!(find_config_file(&nested), Some(path.clone()));
        let config = AleoConfig::load(&path).unwrap();
        assert_eq!(config.build_dir("token"), dir.path().join("programs/token/build"));
    }
}

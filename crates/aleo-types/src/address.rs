//! Account keys, addresses and program identifiers.
//!
//! Aleo addresses are bech32 strings with the `aleo` human-readable part and
//! a 58 character data part:
//!
//! ```text
//! aleo1rhgdu77hgyqd3xjj8ucu3jj9r2krwz6mnzyd80gncr5fxcwlh5rsvzp9px
//! ```
//!
//! Validation in this module is syntactic only. Checksums and key derivation
//! are the prover toolchain's job; the sandbox derives its own stand-in
//! addresses (see `aleo_sandbox_core::accounts`).

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Address prefix (`aleo` HRP plus the bech32 separator).
pub const ADDRESS_PREFIX: &str = "aleo1";
/// Total length of an encoded address.
pub const ADDRESS_LENGTH: usize = 63;
/// Private key prefix.
pub const PRIVATE_KEY_PREFIX: &str = "APrivateKey1";
/// Total length of an encoded private key.
pub const PRIVATE_KEY_LENGTH: usize = 59;
/// View key prefix.
pub const VIEW_KEY_PREFIX: &str = "AViewKey1";
/// Total length of an encoded view key.
pub const VIEW_KEY_LENGTH: usize = 53;
/// The bech32 data alphabet.
pub const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const BASE58_CHARSET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn is_bech32_data(s: &str) -> bool {
    s.chars().all(|c| BECH32_CHARSET.contains(c))
}

/// Map the low five bits of each byte onto the bech32 alphabet.
pub(crate) fn bech32_fold(digest: &[u8], len: usize) -> String {
    let charset = BECH32_CHARSET.as_bytes();
    if digest.is_empty() {
        return "q".repeat(len);
    }
    digest
        .iter()
        .cycle()
        .take(len)
        .map(|b| charset[(b & 0x1f) as usize] as char)
        .collect()
}

fn is_base58(s: &str) -> bool {
    s.chars().all(|c| BASE58_CHARSET.contains(c))
}

/// Returns true if `s` is a syntactically valid Aleo address.
pub fn is_valid_address(s: &str) -> bool {
    s.len() == ADDRESS_LENGTH
        && s.starts_with(ADDRESS_PREFIX)
        && is_bech32_data(&s[ADDRESS_PREFIX.len()..])
}

/// An Aleo account address (`aleo1…`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build an address from a 58 character bech32 data part.
    pub fn from_data_part(data: &str) -> Result<Self> {
        format!("{}{}", ADDRESS_PREFIX, data).parse()
    }

    /// Synthetic address whose data part is `digest` folded onto the bech32
    /// alphabet. Short digests are repeated; an empty digest gives all `q`.
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(format!(
            "{}{}",
            ADDRESS_PREFIX,
            bech32_fold(digest, ADDRESS_LENGTH - ADDRESS_PREFIX.len())
        ))
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if is_valid_address(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(anyhow!("Invalid Aleo address '{}'", s))
        }
    }
}

impl TryFrom<String> for Address {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

/// An Aleo account private key (`APrivateKey1…`).
///
/// `Debug` output is redacted so keys do not leak into logs or test reports.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short, non-secret identifier for log lines.
    pub fn fingerprint(&self) -> String {
        let tail = &self.0[self.0.len().saturating_sub(4)..];
        format!("{}…{}", PRIVATE_KEY_PREFIX, tail)
    }
}

impl FromStr for PrivateKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let valid = s.len() == PRIVATE_KEY_LENGTH
            && s.starts_with(PRIVATE_KEY_PREFIX)
            && is_base58(&s[PRIVATE_KEY_PREFIX.len()..]);
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(anyhow!(
                "Invalid Aleo private key: expected {} characters starting with '{}'",
                PRIVATE_KEY_LENGTH,
                PRIVATE_KEY_PREFIX
            ))
        }
    }
}

impl TryFrom<String> for PrivateKey {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PrivateKey> for String {
    fn from(value: PrivateKey) -> Self {
        value.0
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({})", self.fingerprint())
    }
}

/// An Aleo account view key (`AViewKey1…`), used to decrypt records.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ViewKey(String);

impl ViewKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ViewKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let valid = s.len() == VIEW_KEY_LENGTH
            && s.starts_with(VIEW_KEY_PREFIX)
            && is_base58(&s[VIEW_KEY_PREFIX.len()..]);
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(anyhow!("Invalid Aleo view key"))
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViewKey(..)")
    }
}

/// A program identifier such as `token.aleo`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProgramId(String);

impl ProgramId {
    /// Program network suffix.
    pub const SUFFIX: &'static str = ".aleo";

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id from a literal known to be well formed, such as a bundled
    /// program's name.
    pub fn from_static(id: &'static str) -> Self {
        debug_assert!(id.parse::<ProgramId>().map(|p| p.0 == id).unwrap_or(false));
        Self(id.to_string())
    }

    /// The program name without the `.aleo` suffix.
    pub fn name(&self) -> &str {
        self.0.strip_suffix(Self::SUFFIX).unwrap_or(&self.0)
    }
}

impl FromStr for ProgramId {
    type Err = anyhow::Error;

    /// Accepts `name.aleo` or a bare `name`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let name = s.strip_suffix(Self::SUFFIX).unwrap_or(s);
        let mut chars = name.chars();
        let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(anyhow!("Invalid program id '{}'", s));
        }
        Ok(Self(format!("{}{}", name, Self::SUFFIX)))
    }
}

impl TryFrom<String> for ProgramId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ProgramId> for String {
    fn from(value: ProgramId) -> Self {
        value.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProgramId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVNET_ADDRESS: &str = "aleo1rhgdu77hgyqd3xjj8ucu3jj9r2krwz6mnzyd80gncr5fxcwlh5rsvzp9px";
    const DEVNET_KEY: &str = "APrivateKey1zkp8CZNn3yeCseEtxuVPbDCwSyhGW6yZKUYKfgXmcpoGPWH";

    #[test]
    fn test_address_validation() {
        let addr: Address = DEVNET_ADDRESS.parse().unwrap();
        assert_eq!(addr.as_str(), DEVNET_ADDRESS);

        assert!("aleo1short".parse::<Address>().is_err());
        // 'b' is not in the bech32 alphabet
        let bad = DEVNET_ADDRESS.replacen('r', "b", 1);
        assert!(bad.parse::<Address>().is_err());
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let key: PrivateKey = DEVNET_KEY.parse().unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains(DEVNET_KEY));
        assert!(debug.contains("GPWH"));
        assert_eq!(key.to_string(), DEVNET_KEY);
    }

    #[test]
    fn test_program_id_normalization() {
        let id: ProgramId = "token".parse().unwrap();
        assert_eq!(id.as_str(), "token.aleo");
        assert_eq!(id.name(), "token");

        let v1: ProgramId = "handler_v1.aleo".parse().unwrap();
        assert_eq!(v1.name(), "handler_v1");

        assert!("Token.aleo".parse::<ProgramId>().is_err());
        assert!("1token".parse::<ProgramId>().is_err());
    }

    #[test]
    fn test_address_serde() {
        let addr: Address = DEVNET_ADDRESS.parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", DEVNET_ADDRESS));
        assert!(serde_json::from_str::<Address>("\"nope\"").is_err());
    }
}

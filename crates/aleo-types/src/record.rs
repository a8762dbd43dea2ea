//! Records: the unit of private state in an Aleo program.
//!
//! A record reaches the client in one of two raw forms:
//!
//! - plaintext, as printed by local evaluation:
//!
//! ```text
//! {
//!   owner: aleo1rhgdu77hgyqd3xjj8ucu3jj9r2krwz6mnzyd80gncr5fxcwlh5rsvzp9px.private,
//!   amount: 1000u64.private,
//!   _nonce: 4447510634654730534613001085815220248957369008098693762748709484937046224383group.public
//! }
//! ```
//!
//! - ciphertext (`record1…`), as returned by a node; only the owner's view
//!   key can turn it into the plaintext form.

use crate::address::Address;
use crate::value::{Cursor, Literal, Plaintext, Visibility};
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of encrypted records.
pub const RECORD_CIPHERTEXT_PREFIX: &str = "record1";

/// A record member value together with its visibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    pub value: Plaintext,
    pub visibility: Visibility,
}

impl Entry {
    pub fn private(value: Plaintext) -> Self {
        Self {
            value,
            visibility: Visibility::Private,
        }
    }

    pub fn public(value: Plaintext) -> Self {
        Self {
            value,
            visibility: Visibility::Public,
        }
    }
}

/// A decrypted record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordPlaintext {
    owner: Address,
    owner_visibility: Visibility,
    data: Vec<(String, Entry)>,
    nonce: String,
    version: Option<u8>,
}

impl RecordPlaintext {
    /// Create a record with a private owner.
    ///
    /// `nonce` is the decimal digits of the record's group-element nonce.
    pub fn new(owner: Address, data: Vec<(String, Entry)>, nonce: impl Into<String>) -> Self {
        Self {
            owner,
            owner_visibility: Visibility::Private,
            data,
            nonce: nonce.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn owner_visibility(&self) -> Visibility {
        self.owner_visibility
    }

    pub fn data(&self) -> &[(String, Entry)] {
        &self.data
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn version(&self) -> Option<u8> {
        self.version
    }

    /// Look up a data member by name.
    pub fn get(&self, name: &str) -> Option<&Plaintext> {
        self.data
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| &entry.value)
    }

    /// Look up a `u64` data member, failing with the member name if absent or mistyped.
    pub fn get_u64(&self, name: &str) -> Result<u64> {
        let value = self
            .get(name)
            .ok_or_else(|| anyhow!("record has no member '{}'", name))?;
        value
            .as_u64()
            .ok_or_else(|| anyhow!("record member '{}' is not a u64: {}", name, value))
    }
}

impl fmt::Display for RecordPlaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        write!(f, "  owner: {}.{}", self.owner, self.owner_visibility)?;
        for (name, entry) in &self.data {
            write!(
                f,
                ",\n  {}: {}",
                name,
                entry.value.to_string_with_visibility(entry.visibility)
            )?;
        }
        write!(f, ",\n  _nonce: {}group.public", self.nonce)?;
        if let Some(version) = self.version {
            write!(f, ",\n  _version: {}u8.public", version)?;
        }
        write!(f, "\n}}")
    }
}

impl FromStr for RecordPlaintext {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut cursor = Cursor::new(s);
        cursor.expect('{')?;

        let mut owner = None;
        let mut nonce = None;
        let mut version = None;
        let mut data = Vec::new();

        if !cursor.eat('}') {
            loop {
                let name = cursor.identifier()?.to_string();
                cursor.expect(':')?;
                let (value, visibility) = cursor.plaintext()?;
                let visibility = visibility.unwrap_or(Visibility::Private);

                match name.as_str() {
                    "owner" => {
                        let address = value
                            .as_address()
                            .ok_or_else(|| anyhow!("record owner is not an address: {}", value))?;
                        owner = Some((address.clone(), visibility));
                    }
                    "_nonce" => match value {
                        Plaintext::Literal(Literal::Group(digits)) => nonce = Some(digits),
                        other => bail!("record nonce is not a group element: {}", other),
                    },
                    "_version" => {
                        version = Some(
                            value
                                .as_u8()
                                .ok_or_else(|| anyhow!("record version is not a u8: {}", value))?,
                        );
                    }
                    _ => {
                        if data.iter().any(|(n, _): &(String, Entry)| *n == name) {
                            bail!("duplicate record member '{}'", name);
                        }
                        data.push((name, Entry { value, visibility }));
                    }
                }

                if cursor.eat(',') {
                    if cursor.eat('}') {
                        break;
                    }
                    continue;
                }
                cursor.expect('}')?;
                break;
            }
        }
        cursor.finish()?;

        let (owner, owner_visibility) = owner.ok_or_else(|| anyhow!("record has no owner"))?;
        let nonce = nonce.ok_or_else(|| anyhow!("record has no _nonce"))?;
        Ok(Self {
            owner,
            owner_visibility,
            data,
            nonce,
            version,
        })
    }
}

/// A record as returned by a transaction, before decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(String);

impl RawRecord {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for encrypted (`record1…`) records.
    pub fn is_ciphertext(&self) -> bool {
        self.0.trim_start().starts_with(RECORD_CIPHERTEXT_PREFIX)
    }
}

impl From<&RecordPlaintext> for RawRecord {
    fn from(value: &RecordPlaintext) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A function input or output value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Plaintext(Plaintext),
    Record(RecordPlaintext),
}

impl Value {
    pub fn as_plaintext(&self) -> Option<&Plaintext> {
        match self {
            Value::Plaintext(p) => Some(p),
            Value::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordPlaintext> {
        match self {
            Value::Record(r) => Some(r),
            Value::Plaintext(_) => None,
        }
    }
}

impl From<Plaintext> for Value {
    fn from(value: Plaintext) -> Self {
        Value::Plaintext(value)
    }
}

impl From<RecordPlaintext> for Value {
    fn from(value: RecordPlaintext) -> Self {
        Value::Record(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Plaintext(p) => write!(f, "{}", p),
            Value::Record(r) => write!(f, "{}", r),
        }
    }
}

impl FromStr for Value {
    type Err = anyhow::Error;

    /// Records are recognised by their `owner` and `_nonce` members; anything
    /// else is parsed as a plain value.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.starts_with('{') && trimmed.contains("_nonce") {
            return Ok(Value::Record(trimmed.parse()?));
        }
        Ok(Value::Plaintext(trimmed.parse()?))
    }
}

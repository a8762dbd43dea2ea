//! Aleo plaintext values.
//!
//! Covers the textual forms produced by the Aleo toolchain and returned by
//! node mapping queries:
//!
//! - Literals: `10u64`, `-3i8`, `true`, `aleo1…`, `5field`, `7group`, `1scalar`
//! - Structs: `{ max_supply: 10000u64, mint_limit: 100u64 }`
//! - Arrays: `[1u8, 2u8, 3u8]`
//!
//! Record members additionally carry a visibility suffix
//! (`100u64.private`); see [`crate::record`].

use crate::address::{is_valid_address, Address};
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visibility of a record member or function input/output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Constant,
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Constant => "constant",
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "constant" => Some(Visibility::Constant),
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single Aleo literal.
///
/// Field, group and scalar elements are kept as their decimal digit strings;
/// nothing in this workspace does arithmetic on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Address(Address),
    Boolean(bool),
    Field(String),
    Group(String),
    Scalar(String),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
}

impl Literal {
    /// The Aleo type name of this literal.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Address(_) => "address",
            Literal::Boolean(_) => "boolean",
            Literal::Field(_) => "field",
            Literal::Group(_) => "group",
            Literal::Scalar(_) => "scalar",
            Literal::I8(_) => "i8",
            Literal::I16(_) => "i16",
            Literal::I32(_) => "i32",
            Literal::I64(_) => "i64",
            Literal::I128(_) => "i128",
            Literal::U8(_) => "u8",
            Literal::U16(_) => "u16",
            Literal::U32(_) => "u32",
            Literal::U64(_) => "u64",
            Literal::U128(_) => "u128",
        }
    }

    fn parse_token(token: &str) -> Result<Self> {
        match token {
            "true" => return Ok(Literal::Boolean(true)),
            "false" => return Ok(Literal::Boolean(false)),
            _ => {}
        }
        if is_valid_address(token) {
            return Ok(Literal::Address(token.parse()?));
        }

        let split = token
            .char_indices()
            .find(|(_, c)| c.is_ascii_alphabetic())
            .map(|(i, _)| i)
            .ok_or_else(|| anyhow!("literal '{}' has no type suffix", token))?;
        let (number, suffix) = token.split_at(split);
        let digits: String = number.chars().filter(|c| *c != '_').collect();
        if digits.is_empty() || digits == "-" {
            bail!("literal '{}' has no digits", token);
        }

        fn int<T: FromStr>(digits: &str, token: &str) -> Result<T> {
            digits
                .parse()
                .map_err(|_| anyhow!("literal '{}' is out of range", token))
        }

        let literal = match suffix {
            "u8" => Literal::U8(int(&digits, token)?),
            "u16" => Literal::U16(int(&digits, token)?),
            "u32" => Literal::U32(int(&digits, token)?),
            "u64" => Literal::U64(int(&digits, token)?),
            "u128" => Literal::U128(int(&digits, token)?),
            "i8" => Literal::I8(int(&digits, token)?),
            "i16" => Literal::I16(int(&digits, token)?),
            "i32" => Literal::I32(int(&digits, token)?),
            "i64" => Literal::I64(int(&digits, token)?),
            "i128" => Literal::I128(int(&digits, token)?),
            "field" | "group" | "scalar" => {
                let unsigned = digits.strip_prefix('-').unwrap_or(&digits);
                if !unsigned.chars().all(|c| c.is_ascii_digit()) {
                    bail!("literal '{}' is not a decimal element", token);
                }
                match suffix {
                    "field" => Literal::Field(digits),
                    "group" => Literal::Group(digits),
                    _ => Literal::Scalar(digits),
                }
            }
            other => bail!("unknown literal type '{}' in '{}'", other, token),
        };
        Ok(literal)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Address(a) => write!(f, "{}", a),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Field(d) => write!(f, "{}field", d),
            Literal::Group(d) => write!(f, "{}group", d),
            Literal::Scalar(d) => write!(f, "{}scalar", d),
            Literal::I8(v) => write!(f, "{}i8", v),
            Literal::I16(v) => write!(f, "{}i16", v),
            Literal::I32(v) => write!(f, "{}i32", v),
            Literal::I64(v) => write!(f, "{}i64", v),
            Literal::I128(v) => write!(f, "{}i128", v),
            Literal::U8(v) => write!(f, "{}u8", v),
            Literal::U16(v) => write!(f, "{}u16", v),
            Literal::U32(v) => write!(f, "{}u32", v),
            Literal::U64(v) => write!(f, "{}u64", v),
            Literal::U128(v) => write!(f, "{}u128", v),
        }
    }
}

/// A plaintext program value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Plaintext {
    Literal(Literal),
    /// Struct members in declaration order.
    Struct(Vec<(String, Plaintext)>),
    Array(Vec<Plaintext>),
}

impl Plaintext {
    pub fn u8(value: u8) -> Self {
        Plaintext::Literal(Literal::U8(value))
    }

    pub fn u64(value: u64) -> Self {
        Plaintext::Literal(Literal::U64(value))
    }

    pub fn boolean(value: bool) -> Self {
        Plaintext::Literal(Literal::Boolean(value))
    }

    pub fn address(value: &Address) -> Self {
        Plaintext::Literal(Literal::Address(value.clone()))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Plaintext::Literal(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Plaintext::Literal(Literal::U64(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Plaintext::Literal(Literal::U8(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Plaintext::Literal(Literal::Boolean(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Plaintext::Literal(Literal::Address(a)) => Some(a),
            _ => None,
        }
    }

    /// Look up a struct member by name.
    pub fn member(&self, name: &str) -> Option<&Plaintext> {
        match self {
            Plaintext::Struct(members) => members.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Render with a visibility suffix on every literal leaf, as records do.
    pub fn to_string_with_visibility(&self, visibility: Visibility) -> String {
        match self {
            Plaintext::Literal(l) => format!("{}.{}", l, visibility),
            Plaintext::Struct(members) => {
                let inner: Vec<String> = members
                    .iter()
                    .map(|(n, v)| format!("{}: {}", n, v.to_string_with_visibility(visibility)))
                    .collect();
                format!("{{ {} }}", inner.join(", "))
            }
            Plaintext::Array(items) => {
                let inner: Vec<String> = items
                    .iter()
                    .map(|v| v.to_string_with_visibility(visibility))
                    .collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }
}

impl From<Literal> for Plaintext {
    fn from(value: Literal) -> Self {
        Plaintext::Literal(value)
    }
}

impl fmt::Display for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plaintext::Literal(l) => write!(f, "{}", l),
            Plaintext::Struct(members) => {
                f.write_str("{ ")?;
                for (i, (name, value)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str(" }")
            }
            Plaintext::Array(items) => {
                f.write_str("[")?;
                for (i, value) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl FromStr for Plaintext {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut cursor = Cursor::new(s);
        let (value, visibility) = cursor.plaintext()?;
        if visibility.is_some() {
            bail!("unexpected visibility suffix in plaintext '{}'", s.trim());
        }
        cursor.finish()?;
        Ok(value)
    }
}

impl Serialize for Plaintext {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Plaintext {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Deepest struct/array nesting Aleo allows in a value.
pub const MAX_DATA_DEPTH: usize = 32;

/// Recursive-descent reader over the Aleo plaintext grammar.
///
/// Shared with the record parser, which enables visibility suffixes.
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0, depth: 0 }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DATA_DEPTH {
            bail!(
                "value at offset {} exceeds maximum nesting depth of {}",
                self.pos,
                MAX_DATA_DEPTH
            );
        }
        Ok(())
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(anyhow!(
                "expected '{}' at offset {} in '{}'",
                c,
                self.pos,
                self.src.trim()
            ))
        }
    }

    pub(crate) fn identifier(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let ident = &rest[..len];
        match ident.chars().next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.pos += len;
                Ok(ident)
            }
            _ => Err(anyhow!("expected identifier at offset {}", self.pos)),
        }
    }

    fn token(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() || matches!(c, ',' | '}' | ']' | '{' | '[' | ':'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if len == 0 {
            bail!("expected value at offset {} in '{}'", self.pos, self.src.trim());
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    /// Parse a value, accepting `.visibility` suffixes on literals.
    ///
    /// Returns the first visibility seen, if any.
    pub(crate) fn plaintext(&mut self) -> Result<(Plaintext, Option<Visibility>)> {
        if self.eat('{') {
            self.enter()?;
            let mut members = Vec::new();
            let mut visibility = None;
            if !self.eat('}') {
                loop {
                    let name = self.identifier()?.to_string();
                    self.expect(':')?;
                    let (value, vis) = self.plaintext()?;
                    visibility = visibility.or(vis);
                    members.push((name, value));
                    if self.eat(',') {
                        // Trailing commas are tolerated.
                        if self.eat('}') {
                            break;
                        }
                        continue;
                    }
                    self.expect('}')?;
                    break;
                }
            }
            self.depth -= 1;
            return Ok((Plaintext::Struct(members), visibility));
        }

        if self.eat('[') {
            self.enter()?;
            let mut items = Vec::new();
            let mut visibility = None;
            if !self.eat(']') {
                loop {
                    let (value, vis) = self.plaintext()?;
                    visibility = visibility.or(vis);
                    items.push(value);
                    if self.eat(',') {
                        if self.eat(']') {
                            break;
                        }
                        continue;
                    }
                    self.expect(']')?;
                    break;
                }
            }
            self.depth -= 1;
            return Ok((Plaintext::Array(items), visibility));
        }

        let token = self.token()?;
        let (literal, visibility) = match token.rsplit_once('.') {
            Some((lit, suffix)) => match Visibility::from_suffix(suffix) {
                Some(vis) => (lit, Some(vis)),
                None => (token, None),
            },
            None => (token, None),
        };
        Ok((Plaintext::Literal(Literal::parse_token(literal)?), visibility))
    }

    pub(crate) fn finish(&mut self) -> Result<()> {
        self.skip_ws();
        if self.rest().is_empty() {
            Ok(())
        } else {
            Err(anyhow!(
                "unexpected trailing input '{}'",
                self.rest().chars().take(24).collect::<String>()
            ))
        }
    }
}

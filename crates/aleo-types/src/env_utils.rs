//! Environment variable parsing utilities.
//!
//! This module provides type-safe utilities for parsing environment variables
//! with default values, plus `${NAME}` interpolation used by the config loader.
//!
//! # Example
//!
//! ```
//! use aleo_sandbox_types::env_utils::{env_var, env_var_or};
//!
//! // Parse with default value
//! let timeout: u64 = env_var_or("ALEO_NODE_TIMEOUT_SECS", 30);
//!
//! // Parse returning Option
//! let custom: Option<u64> = env_var("CUSTOM_VALUE");
//! ```

use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Parse an environment variable with a default value.
///
/// Returns the default if the variable is not set or cannot be parsed.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Get a non-empty environment variable, treating blank values as unset.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Names of the `${NAME}` references in `input`, in order of appearance.
pub fn env_references(input: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                names.push(after[..end].trim().to_string());
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    names
}

/// Expand `${NAME}` references in `input` using `lookup`.
///
/// Fails on the first reference `lookup` cannot resolve or on an unterminated
/// `${`. Text outside references is copied verbatim.
pub fn expand_with<F>(input: &str, mut lookup: F) -> Result<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| anyhow!("unterminated '${{' in '{}'", input))?;
        let name = after[..end].trim();
        if name.is_empty() {
            return Err(anyhow!("empty variable reference in '{}'", input));
        }
        let value = lookup(name)
            .ok_or_else(|| anyhow!("environment variable {} is not set", name))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_parsing() {
        std::env::set_var("ALEO_TYPES_TEST_U64", "42");
        let val: Option<u64> = env_var("ALEO_TYPES_TEST_U64");
        assert_eq!(val, Some(42));

        let missing: Option<u64> = env_var("NONEXISTENT_VAR_12345");
        assert_eq!(missing, None);

        std::env::remove_var("ALEO_TYPES_TEST_U64");
    }

    #[test]
    fn test_expand_with_lookup() {
        let expanded = expand_with("${A}-mid-${ B }", |name| match name {
            "A" => Some("left".to_string()),
            "B" => Some("right".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(expanded, "left-mid-right");

        let plain = expand_with("no references", |_| None).unwrap();
        assert_eq!(plain, "no references");
    }

    #[test]
    fn test_expand_errors() {
        let missing = expand_with("${MISSING}", |_| None).unwrap_err();
        assert!(missing.to_string().contains("MISSING"));

        assert!(expand_with("${OPEN", |_| Some(String::new())).is_err());
        assert!(expand_with("${}", |_| Some(String::new())).is_err());
    }

    #[test]
    fn test_env_references() {
        assert_eq!(
            env_references("${ALEO_PRIVATE_KEY} and ${OTHER}"),
            vec!["ALEO_PRIVATE_KEY", "OTHER"]
        );
        assert!(env_references("plain").is_empty());
    }
}

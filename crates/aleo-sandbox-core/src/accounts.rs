//! Account derivation for the sandbox.
//!
//! The sandbox never touches real key material. The well-known devnet keys
//! map to their real addresses so test output lines up with a devnet node;
//! any other key gets a stable stand-in address derived with SHA-256.

use aleo_sandbox_types::{Address, PrivateKey, ProgramId};
use sha2::{Digest, Sha256};

/// Prefunded accounts of a local snarkOS devnet (`snarkos start --dev`).
pub const DEVNET_ACCOUNTS: [(&str, &str); 4] = [
    (
        "APrivateKey1zkp8CZNn3yeCseEtxuVPbDCwSyhGW6yZKUYKfgXmcpoGPWH",
        "aleo1rhgdu77hgyqd3xjj8ucu3jj9r2krwz6mnzyd80gncr5fxcwlh5rsvzp9px",
    ),
    (
        "APrivateKey1zkp2RWGDcde3efb89rjhME1VYA8QMxcxep5DShNBR6n8Yjh",
        "aleo1s3ws5tra87fjycnjrwsjcrnw2qxr8jfqqdugnf0xzqqw29q9m5pqem2u4t",
    ),
    (
        "APrivateKey1zkp2GUmKbVsuc1NSj28pa1WTQuZaK5f1DQJAT6vPcHyWokG",
        "aleo1ashyu96tjwe63u0gtnnv8z5lhapdu4l5pjsl2kha7fv7hvz2eqxs5dz0rg",
    ),
    (
        "APrivateKey1zkpBjpEgLo4arVUkQmcLdKQMiAKGaHAQVVwmF8HQby8vdYs",
        "aleo12ux3gdauck0v60westgcpqj7v8rrcr3v346e4jtq04q7kkt22czsh808v2",
    ),
];

/// Parsed devnet key pairs, in devnet order.
pub fn devnet_accounts() -> Vec<(PrivateKey, Address)> {
    DEVNET_ACCOUNTS
        .iter()
        .filter_map(|(key, address)| Some((key.parse().ok()?, address.parse().ok()?)))
        .collect()
}

/// Address of `private_key` as seen by the sandbox.
pub fn derive_address(private_key: &PrivateKey) -> Address {
    if let Some((_, address)) = DEVNET_ACCOUNTS
        .iter()
        .find(|(key, _)| *key == private_key.as_str())
    {
        if let Ok(address) = address.parse() {
            return address;
        }
    }
    stand_in_address(&[b"account", private_key.as_str().as_bytes()])
}

/// The address a program acts as when it calls another program.
pub fn program_address(program: &ProgramId) -> Address {
    stand_in_address(&[b"program", program.as_str().as_bytes()])
}

fn stand_in_address(parts: &[&[u8]]) -> Address {
    Address::from_digest(&digest(parts))
}

/// SHA-256 over length-prefixed `parts`.
pub(crate) fn digest(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleo_sandbox_types::address::is_valid_address;

    #[test]
    fn test_devnet_keys_map_to_known_addresses() {
        let accounts = devnet_accounts();
        assert_eq!(accounts.len(), DEVNET_ACCOUNTS.len());
        for (key, address) in &accounts {
            assert_eq!(&derive_address(key), address);
        }
    }

    #[test]
    fn test_stand_in_addresses_are_stable_and_valid() {
        let key: PrivateKey = format!("APrivateKey1{}", "z".repeat(47)).parse().unwrap();
        let a = derive_address(&key);
        let b = derive_address(&key);
        assert_eq!(a, b);
        assert!(is_valid_address(a.as_str()));
        assert!(!devnet_accounts().iter().any(|(_, addr)| *addr == a));
    }

    #[test]
    fn test_program_addresses_differ() {
        let a = program_address(&"token_v1.aleo".parse().unwrap());
        let b = program_address(&"handler_v1.aleo".parse().unwrap());
        assert_ne!(a, b);
        assert!(is_valid_address(a.as_str()));
    }
}

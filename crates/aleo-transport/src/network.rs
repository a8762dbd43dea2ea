/// Default endpoint of a local devnet node.
pub const LOCAL_DEVNET_ENDPOINT: &str = "http://localhost:3030";
/// Public mainnet API.
pub const MAINNET_ENDPOINT: &str = "https://api.explorer.aleo.org/v1";
/// Public testnet API.
pub const TESTNET_ENDPOINT: &str = "https://api.explorer.provable.com/v1";

/// Microcredits per credit.
pub const MICROCREDITS_PER_CREDIT: f64 = 1_000_000.0;

/// The numeric network id the `snarkos` binary expects for `--network`.
pub fn network_id(network: &str) -> Option<u8> {
    match network.to_lowercase().as_str() {
        "mainnet" => Some(0),
        "testnet" => Some(1),
        "canary" => Some(2),
        _ => None,
    }
}

pub fn infer_network_from_url(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    if lower.contains("testnet") {
        Some("testnet")
    } else if lower.contains("canary") {
        Some("canary")
    } else if lower.contains("mainnet") {
        Some("mainnet")
    } else {
        None
    }
}

pub fn default_endpoint(network: &str) -> String {
    match network {
        "mainnet" => MAINNET_ENDPOINT.to_string(),
        "testnet" => TESTNET_ENDPOINT.to_string(),
        _ => LOCAL_DEVNET_ENDPOINT.to_string(),
    }
}

/// Convert a fee in credits to microcredits, rounding to the nearest unit.
pub fn credits_to_microcredits(credits: f64) -> u64 {
    if credits <= 0.0 || !credits.is_finite() {
        return 0;
    }
    (credits * MICROCREDITS_PER_CREDIT).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_ids() {
        assert_eq!(network_id("mainnet"), Some(0));
        assert_eq!(network_id("TestNet"), Some(1));
        assert_eq!(network_id("canary"), Some(2));
        assert_eq!(network_id("devnet"), None);
    }

    #[test]
    fn test_fee_conversion() {
        assert_eq!(credits_to_microcredits(0.01), 10_000);
        assert_eq!(credits_to_microcredits(0.001), 1_000);
        assert_eq!(credits_to_microcredits(-1.0), 0);
    }

    #[test]
    fn test_infer_network() {
        assert_eq!(
            infer_network_from_url("https://api.explorer.aleo.org/v1/mainnet"),
            Some("mainnet")
        );
        assert_eq!(infer_network_from_url(LOCAL_DEVNET_ENDPOINT), None);
    }
}

//! TOML file configuration structures.
//!
//! These structs directly map to the `ccpay.toml` file format. Every field
//! has a default, so an empty or missing file is valid.

use ccpay_sdk::config::ChainConfig;
use ccpay_sdk::objects::DEFAULT_MIN_CREDIT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub chain: ChainConfig,
    pub checkout: CheckoutConfig,
}

/// Checkout section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Default order API base, e.g. `https://api.example.com`.
    pub api_base: Option<String>,
    /// Landing page the checkout redirects to once paid.
    pub landing_url: String,
    /// Checkout page that purchase URLs point at.
    pub checkout_url: String,
    pub poll_interval_ms: u64,
    pub redirect_delay_ms: u64,
    pub min_credit: i64,
    /// Where the last API base, user id and order id are kept.
    pub session_file: PathBuf,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            landing_url: "http://localhost:8080/index.html".to_string(),
            checkout_url: "http://localhost:8080/checkout.html".to_string(),
            poll_interval_ms: 4000,
            redirect_delay_ms: 2000,
            min_credit: DEFAULT_MIN_CREDIT,
            session_file: PathBuf::from("./ccpay-session.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let toml_str = r#"
[chain]
chain_id = "vota-ash"
rpc_endpoint = "https://vota-rpc.example.com/"

[checkout]
api_base = "https://api.example.com/"
poll_interval_ms = 1500
min_credit = 5000
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chain.chain_id, "vota-ash");
        assert_eq!(config.chain.denom, "peaka");
        assert_eq!(config.chain.decimals, 18);
        assert_eq!(config.checkout.api_base.as_deref(), Some("https://api.example.com/"));
        assert_eq!(config.checkout.poll_interval_ms, 1500);
        assert_eq!(config.checkout.redirect_delay_ms, 2000);
        assert_eq!(config.checkout.min_credit, 5000);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.chain, ChainConfig::default());
        assert_eq!(config.checkout.poll_interval_ms, 4000);
        assert_eq!(config.checkout.min_credit, 10000);
        assert!(config.checkout.api_base.is_none());
    }
}

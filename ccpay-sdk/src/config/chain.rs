//! Chain configuration.

use serde::{Deserialize, Serialize};

use crate::objects::{GasPrice, ValidationError};

/// Gas price tiers advertised to a wallet when the chain is registered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasPriceStep {
    pub low: f64,
    pub average: f64,
    pub high: f64,
}

impl GasPriceStep {
    /// All three tiers set to the same price.
    pub fn flat(price: f64) -> Self {
        Self {
            low: price,
            average: price,
            high: price,
        }
    }
}

/// Description of the target network.
///
/// Every field has a default matching the reference deployment, so a config
/// file only needs to list the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Chain id, e.g. `vota-testnet`.
    pub chain_id: String,
    /// Human-readable chain name shown by wallets.
    pub chain_name: String,
    /// Tendermint RPC endpoint used for broadcasting.
    pub rpc_endpoint: String,
    /// REST (LCD) endpoint.
    pub rest_endpoint: String,
    /// Base (smallest unit) denomination, e.g. `peaka`.
    pub denom: String,
    /// Display denomination, e.g. `DORA`.
    pub coin_denom: String,
    /// Number of decimals between the base and display denominations.
    pub decimals: u32,
    /// Gas price as `<amount><denom>`, e.g. `0.025peaka`.
    pub gas_price: String,
    pub gas_price_step: GasPriceStep,
    /// Bech32 account address prefix.
    pub bech32_prefix: String,
    /// BIP-44 coin type.
    pub coin_type: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: "vota-testnet".to_string(),
            chain_name: "DORA Vota Testnet".to_string(),
            rpc_endpoint: "https://vota-testnet-rpc.dorafactory.org/".to_string(),
            rest_endpoint: "https://vota-testnet-rest.dorafactory.org".to_string(),
            denom: "peaka".to_string(),
            coin_denom: "DORA".to_string(),
            decimals: 18,
            gas_price: "0.025peaka".to_string(),
            gas_price_step: GasPriceStep::flat(10_000_000_000.0),
            bech32_prefix: "dora".to_string(),
            coin_type: 118,
        }
    }
}

impl ChainConfig {
    /// Parse the configured gas price string.
    pub fn parsed_gas_price(&self) -> Result<GasPrice, ValidationError> {
        self.gas_price.parse()
    }

    /// Parse the RPC endpoint.
    pub fn rpc_url(&self) -> Result<url::Url, url::ParseError> {
        url::Url::parse(&self.rpc_endpoint)
    }

    /// Check the values a config file could have broken.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.chain_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("chain_id"));
        }
        if self.denom.trim().is_empty() {
            return Err(ValidationError::EmptyField("denom"));
        }
        if self.bech32_prefix.trim().is_empty() {
            return Err(ValidationError::EmptyField("bech32_prefix"));
        }
        let gas_price = self.parsed_gas_price()?;
        if gas_price.denom != self.denom {
            return Err(ValidationError::GasPriceDenomMismatch {
                expected: self.denom.clone(),
                found: gas_price.denom,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ChainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rpc_url().unwrap().host_str(), Some("vota-testnet-rpc.dorafactory.org"));
    }

    #[test]
    fn test_partial_override() {
        let config: ChainConfig =
            serde_json::from_str(r#"{"chain_id":"vota-ash","gas_price":"0.5peaka"}"#).unwrap();
        assert_eq!(config.chain_id, "vota-ash");
        assert_eq!(config.denom, "peaka");
        assert_eq!(config.decimals, 18);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_gas_denom_mismatch() {
        let config = ChainConfig {
            gas_price: "0.025uatom".to_string(),
            ..ChainConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::GasPriceDenomMismatch { .. })
        ));
    }
}

use ccpay_sdk::config::{ChainConfig, GasPriceStep};
use serde::{Deserialize, Serialize};

/// Feature flag enabling the bank-send capable signing API.
pub const TRANSFER_FEATURE: &str = "stargate";

/// Chain registration request sent to a wallet that does not yet know the
/// configured chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSuggestion {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc: String,
    pub rest: String,
    pub bip44: Bip44,
    pub bech32_config: Bech32Config,
    pub currencies: Vec<Currency>,
    pub stake_currency: Currency,
    pub fee_currencies: Vec<FeeCurrency>,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bip44 {
    pub coin_type: u32,
}

/// Bech32 prefixes for every address and key kind on the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bech32Config {
    pub bech32_prefix_acc_addr: String,
    pub bech32_prefix_acc_pub: String,
    pub bech32_prefix_val_addr: String,
    pub bech32_prefix_val_pub: String,
    pub bech32_prefix_cons_addr: String,
    pub bech32_prefix_cons_pub: String,
}

impl Bech32Config {
    /// Derive all prefixes from the account prefix, following the usual
    /// `<p>pub`, `<p>valoper`, `<p>valcons` convention.
    pub fn from_account_prefix(prefix: &str) -> Self {
        Self {
            bech32_prefix_acc_addr: prefix.to_string(),
            bech32_prefix_acc_pub: format!("{prefix}pub"),
            bech32_prefix_val_addr: format!("{prefix}valoper"),
            bech32_prefix_val_pub: format!("{prefix}valoperpub"),
            bech32_prefix_cons_addr: format!("{prefix}valcons"),
            bech32_prefix_cons_pub: format!("{prefix}valconspub"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub coin_denom: String,
    pub coin_minimal_denom: String,
    pub coin_decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeCurrency {
    #[serde(flatten)]
    pub currency: Currency,
    pub gas_price_step: GasPriceStep,
}

impl From<&ChainConfig> for ChainSuggestion {
    fn from(chain: &ChainConfig) -> Self {
        let currency = Currency {
            coin_denom: chain.coin_denom.clone(),
            coin_minimal_denom: chain.denom.clone(),
            coin_decimals: chain.decimals,
        };
        Self {
            chain_id: chain.chain_id.clone(),
            chain_name: chain.chain_name.clone(),
            rpc: chain.rpc_endpoint.clone(),
            rest: chain.rest_endpoint.clone(),
            bip44: Bip44 {
                coin_type: chain.coin_type,
            },
            bech32_config: Bech32Config::from_account_prefix(&chain.bech32_prefix),
            currencies: vec![currency.clone()],
            stake_currency: currency.clone(),
            fee_currencies: vec![FeeCurrency {
                currency,
                gas_price_step: chain.gas_price_step,
            }],
            features: vec![TRANSFER_FEATURE.to_string()],
        }
    }
}

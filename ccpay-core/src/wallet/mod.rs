//! Wallet bridge: the capabilities the checkout flow needs from a signing
//! wallet, and the enable / register / get-signer sequence built on them.

mod bridge;
mod suggestion;

pub use bridge::WalletBridge;
pub use suggestion::{Bech32Config, Bip44, ChainSuggestion, Currency, FeeCurrency};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a wallet or its signer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// The user declined the request in the wallet UI.
    #[error("request rejected by user")]
    Rejected,

    /// The wallet has no record of the requested chain.
    #[error("chain {0} is not known to the wallet")]
    UnknownChain(String),

    #[error("{0}")]
    Other(String),
}

/// An account exposed by a signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    /// Bech32 address.
    pub address: String,
    /// Key algorithm, e.g. `secp256k1`.
    pub algo: String,
    pub pubkey: Vec<u8>,
}

/// A signer bound to one chain, able to list its accounts and sign on
/// their behalf without exposing keys.
#[async_trait]
pub trait OfflineSigner: Send + Sync {
    async fn accounts(&self) -> Result<Vec<AccountData>, WalletError>;

    /// Sign `sign_doc` bytes for `signer_address`; returns the signature.
    async fn sign(&self, signer_address: &str, sign_doc: &[u8]) -> Result<Vec<u8>, WalletError>;
}

/// A wallet extension that manages keys for one or more chains.
#[async_trait]
pub trait WalletExtension: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Ask the wallet to enable `chain_id` for this site.
    async fn enable(&self, chain_id: &str) -> Result<(), WalletError>;

    /// Whether [`suggest_chain`](WalletExtension::suggest_chain) is available.
    fn supports_chain_suggestion(&self) -> bool;

    /// Register a chain the wallet does not know yet.
    async fn suggest_chain(&self, suggestion: &ChainSuggestion) -> Result<(), WalletError>;

    /// Signer bound to `chain_id`. The chain must be enabled first.
    async fn offline_signer(&self, chain_id: &str) -> Result<Arc<dyn OfflineSigner>, WalletError>;
}

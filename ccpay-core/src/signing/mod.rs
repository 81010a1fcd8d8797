//! Transaction-signing library seam.
//!
//! The signing library is loaded at runtime from one of several
//! [`LibrarySource`]s and memoized by [`SigningLibraryLoader`]. Tests
//! substitute a stub [`SigningLibrary`] directly.

mod loader;

pub use loader::SigningLibraryLoader;

use std::sync::Arc;

use async_trait::async_trait;
use ccpay_sdk::objects::{Coin, GasPrice};
use thiserror::Error;
use url::Url;

use crate::wallet::OfflineSigner;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// The library could not be fetched or initialized.
    #[error("library unavailable: {0}")]
    Unavailable(String),

    /// Connecting to the RPC endpoint failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Simulation, signing or broadcast failed before a result code was
    /// produced.
    #[error("broadcast failed: {0}")]
    Broadcast(String),
}

/// Fee selection for a transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fee {
    /// Simulate and use the estimated gas with the default multiplier.
    Auto,
    /// Simulate and scale the estimate by the given multiplier.
    Multiplier(f64),
}

/// Outcome of a broadcast that reached the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastResult {
    /// `0` on success; anything else is an on-chain rejection.
    pub code: u32,
    pub raw_log: String,
    pub transaction_hash: String,
    pub height: u64,
}

/// A client connected to an RPC endpoint, signing with one signer.
#[async_trait]
pub trait SigningClient: Send + Sync {
    /// Send a bank transfer of `amount` from `sender` to `recipient`.
    async fn send_tokens(
        &self,
        sender: &str,
        recipient: &str,
        amount: &[Coin],
        fee: Fee,
        memo: &str,
    ) -> Result<BroadcastResult, SigningError>;
}

/// A loaded signing library.
#[async_trait]
pub trait SigningLibrary: Send + Sync {
    async fn connect_with_signer(
        &self,
        rpc_endpoint: &Url,
        signer: Arc<dyn OfflineSigner>,
        gas_price: GasPrice,
    ) -> Result<Box<dyn SigningClient>, SigningError>;
}

/// One place a signing library can be loaded from.
#[async_trait]
pub trait LibrarySource: Send + Sync {
    /// Name used in logs, e.g. the URL the library is fetched from.
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Arc<dyn SigningLibrary>, SigningError>;
}

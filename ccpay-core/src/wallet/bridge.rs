use std::sync::Arc;

use ccpay_sdk::config::ChainConfig;
use tracing::{debug, info, warn};

use super::{ChainSuggestion, OfflineSigner, WalletError, WalletExtension};
use crate::error::CheckoutError;

/// Obtains a signer for the configured chain from an installed wallet.
#[derive(Clone)]
pub struct WalletBridge {
    wallet: Option<Arc<dyn WalletExtension>>,
}

impl WalletBridge {
    pub fn new(wallet: Arc<dyn WalletExtension>) -> Self {
        Self {
            wallet: Some(wallet),
        }
    }

    /// A bridge with no wallet attached; [`ensure_signer`](Self::ensure_signer)
    /// always fails with [`CheckoutError::WalletNotFound`].
    pub fn detached() -> Self {
        Self { wallet: None }
    }

    pub fn is_available(&self) -> bool {
        self.wallet.is_some()
    }

    /// Enable the chain (registering it first if the wallet does not know
    /// it and supports registration) and return a signer bound to it.
    ///
    /// A user rejection is returned as is. Any other enable failure is
    /// treated as an unknown chain, since wallets often report that case
    /// only as free text.
    ///
    /// Calling this again once the chain is enabled is a plain enable
    /// followed by signer retrieval.
    pub async fn ensure_signer(
        &self,
        chain: &ChainConfig,
    ) -> Result<Arc<dyn OfflineSigner>, CheckoutError> {
        let wallet = self.wallet.as_ref().ok_or(CheckoutError::WalletNotFound)?;
        let chain_id = chain.chain_id.as_str();

        if let Err(e) = wallet.enable(chain_id).await {
            if matches!(e, WalletError::Rejected) {
                info!(wallet = wallet.name(), chain_id, "User rejected enabling the chain");
                return Err(e.into());
            }
            if !wallet.supports_chain_suggestion() {
                warn!(wallet = wallet.name(), chain_id, error = %e, "Enable failed and wallet cannot register chains");
                return Err(CheckoutError::UnsupportedWallet {
                    chain_id: chain_id.to_string(),
                });
            }

            info!(wallet = wallet.name(), chain_id, error = %e, "Enable failed, suggesting chain to wallet");
            wallet.suggest_chain(&ChainSuggestion::from(chain)).await?;
            wallet.enable(chain_id).await?;
        }

        let signer = wallet.offline_signer(chain_id).await?;
        debug!(wallet = wallet.name(), chain_id, "Obtained offline signer");
        Ok(signer)
    }
}

impl std::fmt::Debug for WalletBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletBridge")
            .field("wallet", &self.wallet.as_ref().map(|w| w.name()))
            .finish()
    }
}

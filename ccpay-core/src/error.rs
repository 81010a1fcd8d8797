//! Error type shared by every checkout operation.

use ccpay_sdk::client::ClientError;
use ccpay_sdk::objects::ValidationError;
use thiserror::Error;

use crate::session::SessionError;
use crate::signing::SigningError;
use crate::wallet::WalletError;

/// Errors surfaced by the checkout flow.
///
/// Every variant ends up as a status message on the view; none of them is
/// retried automatically except fetch failures inside the poll loop.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Order creation or fetch failed (includes the raw response body).
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No compatible wallet extension is installed.
    #[error("no compatible wallet extension found")]
    WalletNotFound,

    /// The wallet does not know the chain and cannot register it.
    #[error("wallet cannot register chain {chain_id}, add it manually")]
    UnsupportedWallet { chain_id: String },

    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// The signer exposed no accounts.
    #[error("wallet returned no accounts")]
    NoAccount,

    /// Every signing library source failed.
    #[error("failed to load signing library after {attempts} attempt(s): {last_error}")]
    LibraryLoad { attempts: usize, last_error: String },

    /// The chain accepted the broadcast but rejected the transaction.
    #[error("transaction failed with code {code}: {raw_log}")]
    TransactionFailed { code: u32, raw_log: String },

    #[error("signing client error: {0}")]
    Signing(#[from] SigningError),

    #[error("order has not been loaded yet")]
    OrderNotLoaded,

    #[error("order is already paid")]
    OrderAlreadyPaid,

    #[error("missing checkout context: {0}")]
    MissingContext(&'static str),

    #[error("a payment is already in progress")]
    PaymentInProgress,

    #[error("an order submission is already in progress")]
    SubmissionInProgress,

    #[error("session store error: {0}")]
    Session(#[from] SessionError),
}

/// Failure category of a [`CheckoutError`], for branching without
/// inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OrderCreation,
    OrderFetch,
    Validation,
    Network,
    WalletNotFound,
    UnsupportedWallet,
    Wallet,
    NoAccount,
    LibraryLoad,
    TransactionFailed,
    Signing,
    /// The action is not allowed in the current checkout state.
    State,
    Session,
}

impl CheckoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::Client(e) => match e {
                ClientError::OrderCreation { .. } => ErrorKind::OrderCreation,
                ClientError::OrderFetch { .. } => ErrorKind::OrderFetch,
                ClientError::Validation(_) => ErrorKind::Validation,
                ClientError::Http(_) | ClientError::Json(_) | ClientError::Url(_) => {
                    ErrorKind::Network
                }
            },
            CheckoutError::Validation(_) | CheckoutError::InvalidUrl(_) => ErrorKind::Validation,
            CheckoutError::WalletNotFound => ErrorKind::WalletNotFound,
            CheckoutError::UnsupportedWallet { .. } => ErrorKind::UnsupportedWallet,
            CheckoutError::Wallet(_) => ErrorKind::Wallet,
            CheckoutError::NoAccount => ErrorKind::NoAccount,
            CheckoutError::LibraryLoad { .. } => ErrorKind::LibraryLoad,
            CheckoutError::TransactionFailed { .. } => ErrorKind::TransactionFailed,
            CheckoutError::Signing(_) => ErrorKind::Signing,
            CheckoutError::OrderNotLoaded
            | CheckoutError::OrderAlreadyPaid
            | CheckoutError::MissingContext(_)
            | CheckoutError::PaymentInProgress
            | CheckoutError::SubmissionInProgress => ErrorKind::State,
            CheckoutError::Session(_) => ErrorKind::Session,
        }
    }
}

//! Request and response types exchanged with the order backend, plus the
//! small value types (amounts, gas prices) the checkout flow computes with.

pub mod amount;
pub mod gas;
pub mod order;
mod timestamp;

pub use amount::{format_amount, format_amount_truncated, validate_base_amount};
pub use gas::{Coin, GasPrice};
pub use order::{CreateOrderRequest, CreditAmount, OrderStatus, PaymentOrder, DEFAULT_MIN_CREDIT};

/// Input rejected before any network call is made.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("credit must be a finite number")]
    CreditNotFinite,
    #[error("credit must be a whole number, got {0}")]
    CreditNotIntegral(f64),
    #[error("credit {found} is below the minimum of {min}")]
    CreditBelowMinimum { min: i64, found: f64 },
    #[error("credit {0} is out of range")]
    CreditOutOfRange(f64),
    #[error("credit is not a number: {0:?}")]
    CreditUnparseable(String),
    #[error("order id must not be empty")]
    EmptyOrderId,
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("invalid base amount: {0:?}")]
    InvalidBaseAmount(String),
    #[error("invalid gas price: {0:?}")]
    InvalidGasPrice(String),
    #[error("gas price denom {found:?} does not match chain denom {expected:?}")]
    GasPriceDenomMismatch { expected: String, found: String },
}

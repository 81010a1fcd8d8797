use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::ValidationError;

/// Smallest credit purchase the reference backend accepts.
pub const DEFAULT_MIN_CREDIT: i64 = 10_000;

/// A validated credit amount for a new order.
///
/// Serialized as a bare JSON integer, which is what the backend decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditAmount(i64);

impl CreditAmount {
    /// Validate a user-supplied credit value against `min`.
    ///
    /// Rejects non-finite, fractional and below-minimum values.
    pub fn new(value: f64, min: i64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::CreditNotFinite);
        }
        if value < min as f64 {
            return Err(ValidationError::CreditBelowMinimum { min, found: value });
        }
        if value.fract() != 0.0 {
            return Err(ValidationError::CreditNotIntegral(value));
        }
        if value >= i64::MAX as f64 {
            return Err(ValidationError::CreditOutOfRange(value));
        }
        Ok(Self(value as i64))
    }

    /// Parse a credit value typed by a user.
    pub fn parse(input: &str, min: i64) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| ValidationError::CreditUnparseable(trimmed.to_string()))?;
        Self::new(value, min)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CreditAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body of `POST /payments/orders`.
///
/// The user id travels in the `X-User-Id` header, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub credit: CreditAmount,
}

/// Order status as reported by the backend.
///
/// Unknown values are kept verbatim in [`OrderStatus::Other`] so that a
/// backend adding a status never breaks deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Freshly created, waiting for payment.
    #[default]
    Created,
    Pending,
    Paid,
    /// Paid after expiry; the backend re-quoted and still issued credit.
    PaidLateRepriced,
    Expired,
    Failed,
    /// Paid after expiry at a price that no longer covers the credit.
    LateNoCredit,
    Underpaid,
    Overpaid,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::PaidLateRepriced => "paid_late_repriced",
            OrderStatus::Expired => "expired",
            OrderStatus::Failed => "failed",
            OrderStatus::LateNoCredit => "late_no_credit",
            OrderStatus::Underpaid => "underpaid",
            OrderStatus::Overpaid => "overpaid",
            OrderStatus::Other(s) => s,
        }
    }

    /// `paid` and `paid_late_repriced` are the only states after which the
    /// client expects no further change.
    pub fn is_terminal_success(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::PaidLateRepriced)
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "created" => OrderStatus::Created,
            "pending" => OrderStatus::Pending,
            "paid" => OrderStatus::Paid,
            "paid_late_repriced" => OrderStatus::PaidLateRepriced,
            "expired" => OrderStatus::Expired,
            "failed" => OrderStatus::Failed,
            "late_no_credit" => OrderStatus::LateNoCredit,
            "underpaid" => OrderStatus::Underpaid,
            "overpaid" => OrderStatus::Overpaid,
            _ => OrderStatus::Other(value),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        OrderStatus::from(value.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side snapshot of a payment order.
///
/// Returned by both the create and fetch endpoints. The fetch response does
/// not repeat the order id, so [`crate::client::OrderClient::fetch_order`]
/// fills it in from the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    #[serde(default)]
    pub order_id: String,
    /// Address the payment must be sent to.
    pub recipient_address: String,
    /// Amount in the base denomination, as a decimal integer string.
    #[serde(alias = "amountPeaka")]
    pub amount_base: String,
    #[serde(default)]
    pub denom: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_issued: Option<i64>,
    /// Opaque pricing data recorded by the backend at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_snapshot: Option<serde_json::Value>,
}

impl PaymentOrder {
    /// The order's denom, or `fallback` when the backend left it blank.
    pub fn denom_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.denom.is_empty() {
            fallback
        } else {
            &self.denom
        }
    }

    /// Whether the quote has passed its expiry at `now`.
    ///
    /// Informational only: polling does not stop on expiry.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

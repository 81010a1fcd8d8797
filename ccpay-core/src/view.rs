//! Checkout view model.

use ccpay_sdk::config::ChainConfig;
use ccpay_sdk::objects::{PaymentOrder, format_amount_truncated};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

/// Fraction digits shown for display amounts.
pub const DISPLAY_FRACTION_DIGITS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_error {
            write!(f, "error: {}", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

/// Everything the checkout screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutView {
    /// Last order snapshot received from the backend.
    pub order: Option<PaymentOrder>,
    /// Hash of the payment broadcast from this session, or reported by the
    /// backend.
    pub tx_hash: Option<String>,
    pub message: Option<StatusMessage>,
    pub pay_enabled: bool,
    pub refresh_enabled: bool,
    /// Landing URL to navigate to once the order is settled.
    pub redirect: Option<Url>,
}

impl CheckoutView {
    /// Store a new snapshot. Returns `false` if it was ignored.
    ///
    /// Once the view holds a settled order, a late non-settled snapshot
    /// from an overlapping request no longer replaces it.
    pub fn apply_order(&mut self, order: PaymentOrder) -> bool {
        if self.is_complete() && !order.status.is_terminal_success() {
            return false;
        }
        if let Some(tx_hash) = order.tx_hash.as_ref().filter(|h| !h.is_empty()) {
            self.tx_hash = Some(tx_hash.clone());
        }
        self.order = Some(order);
        true
    }

    pub fn is_complete(&self) -> bool {
        self.order
            .as_ref()
            .is_some_and(|order| order.status.is_terminal_success())
    }

    /// Label/value pairs describing the current order.
    pub fn detail_lines(&self, chain: &ChainConfig) -> Vec<(&'static str, String)> {
        let Some(order) = &self.order else {
            return Vec::new();
        };

        let mut lines = vec![
            ("Order ID", order.order_id.clone()),
            ("Recipient", order.recipient_address.clone()),
            (
                "Amount",
                format!(
                    "{} {}",
                    format_amount_truncated(&order.amount_base, chain.decimals, DISPLAY_FRACTION_DIGITS),
                    chain.coin_denom
                ),
            ),
            (
                "Base amount",
                format!("{} {}", order.amount_base, order.denom_or(&chain.denom)),
            ),
            ("Status", order.status.to_string()),
            ("Expires", format_time(order.expires_at)),
        ];

        if let Some(tx_hash) = &self.tx_hash {
            lines.push(("Tx hash", tx_hash.clone()));
            if order.paid_at.is_some() {
                lines.push(("Confirmed at", format_time(order.paid_at)));
            }
            if let Some(credit) = order.credit_issued.filter(|c| *c != 0) {
                lines.push(("Credit issued", credit.to_string()));
            }
        }
        lines
    }
}

fn format_time(at: Option<OffsetDateTime>) -> String {
    at.and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccpay_sdk::objects::OrderStatus;
    use time::macros::datetime;

    fn order(status: OrderStatus) -> PaymentOrder {
        PaymentOrder {
            order_id: "ord_1".to_string(),
            recipient_address: "dora1recipient".to_string(),
            amount_base: "1234567891234567891".to_string(),
            status,
            expires_at: Some(datetime!(2026-03-01 12:00 UTC)),
            ..PaymentOrder::default()
        }
    }

    #[test]
    fn test_settled_order_is_not_overwritten() {
        let mut view = CheckoutView::default();
        assert!(view.apply_order(order(OrderStatus::Pending)));
        assert!(!view.is_complete());

        let mut paid = order(OrderStatus::Paid);
        paid.tx_hash = Some("ABC123".to_string());
        assert!(view.apply_order(paid));
        assert!(view.is_complete());
        assert_eq!(view.tx_hash.as_deref(), Some("ABC123"));

        assert!(!view.apply_order(order(OrderStatus::Pending)));
        assert_eq!(view.order.as_ref().unwrap().status, OrderStatus::Paid);
        assert_eq!(view.tx_hash.as_deref(), Some("ABC123"));
    }

    #[test]
    fn test_detail_lines() {
        let chain = ChainConfig::default();
        let mut view = CheckoutView::default();
        assert!(view.detail_lines(&chain).is_empty());

        view.apply_order(order(OrderStatus::Pending));
        let lines = view.detail_lines(&chain);
        assert_eq!(
            lines,
            vec![
                ("Order ID", "ord_1".to_string()),
                ("Recipient", "dora1recipient".to_string()),
                ("Amount", "1.234567 DORA".to_string()),
                ("Base amount", "1234567891234567891 peaka".to_string()),
                ("Status", "pending".to_string()),
                ("Expires", "2026-03-01T12:00:00Z".to_string()),
            ]
        );

        let mut paid = order(OrderStatus::Paid);
        paid.tx_hash = Some("ABC123".to_string());
        paid.paid_at = Some(datetime!(2026-03-01 11:00 UTC));
        paid.credit_issued = Some(10000);
        view.apply_order(paid);
        let lines = view.detail_lines(&chain);
        assert_eq!(
            &lines[6..],
            &[
                ("Tx hash", "ABC123".to_string()),
                ("Confirmed at", "2026-03-01T11:00:00Z".to_string()),
                ("Credit issued", "10000".to_string()),
            ]
        );
    }

    #[test]
    fn test_status_message_display() {
        assert_eq!(StatusMessage::info("Order status refreshed").to_string(), "Order status refreshed");
        assert_eq!(StatusMessage::error("boom").to_string(), "error: boom");
    }
}

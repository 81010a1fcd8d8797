//! Query-parameter contracts between the purchase, checkout and landing
//! views.

use ccpay_sdk::objects::OrderStatus;
use url::Url;

use crate::error::CheckoutError;
use crate::session::{SessionKey, SessionStore};

pub const PARAM_ORDER_ID: &str = "orderId";
pub const PARAM_API_BASE: &str = "apiBase";
pub const PARAM_USER_ID: &str = "userId";
pub const PARAM_STATUS: &str = "status";
pub const PARAM_TX_HASH: &str = "txHash";

/// Trim whitespace and drop one trailing `/`.
pub fn normalize_api_base(api_base: &str) -> String {
    let trimmed = api_base.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

fn query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Context the checkout view is entered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutParams {
    pub order_id: String,
    /// Normalized API base (no trailing `/`).
    pub api_base: String,
    pub user_id: Option<String>,
}

impl CheckoutParams {
    /// Read `orderId`, `apiBase` and `userId` from `url`, falling back to
    /// the persisted session for any that are absent.
    pub fn resolve(url: &Url, store: &dyn SessionStore) -> Result<Self, CheckoutError> {
        let order_id = match query_value(url, PARAM_ORDER_ID) {
            Some(id) => Some(id),
            None => store.get(SessionKey::LastOrderId)?,
        };
        let api_base = match query_value(url, PARAM_API_BASE) {
            Some(base) => Some(base),
            None => store.get(SessionKey::ApiBase)?,
        }
        .map(|base| normalize_api_base(&base))
        .filter(|base| !base.is_empty());
        let user_id = match query_value(url, PARAM_USER_ID) {
            Some(user) => Some(user),
            None => store.get(SessionKey::UserId)?,
        };

        let order_id = order_id.ok_or(CheckoutError::MissingContext(PARAM_ORDER_ID))?;
        let api_base = api_base.ok_or(CheckoutError::MissingContext(PARAM_API_BASE))?;
        Url::parse(&api_base)?;

        Ok(Self {
            order_id,
            api_base,
            user_id,
        })
    }

    pub fn api_base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.api_base)
    }

    /// The checkout page URL carrying these parameters.
    pub fn to_url(&self, checkout_page: &Url) -> Url {
        let mut url = checkout_page.clone();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.append_pair(PARAM_ORDER_ID, &self.order_id);
            query.append_pair(PARAM_API_BASE, &self.api_base);
            if let Some(user_id) = &self.user_id {
                query.append_pair(PARAM_USER_ID, user_id);
            }
        }
        url
    }
}

/// Landing URL after a completed payment.
pub fn landing_redirect(
    landing_page: &Url,
    status: &OrderStatus,
    order_id: &str,
    tx_hash: Option<&str>,
) -> Url {
    let mut url = landing_page.clone();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair(PARAM_STATUS, status.as_str());
        query.append_pair(PARAM_ORDER_ID, order_id);
        if let Some(tx_hash) = tx_hash {
            query.append_pair(PARAM_TX_HASH, tx_hash);
        }
    }
    url
}

/// Landing URL for leaving the checkout view without completing payment.
pub fn back_url(landing_page: &Url, order_id: Option<&str>) -> Url {
    let mut url = landing_page.clone();
    url.set_query(None);
    if let Some(order_id) = order_id {
        url.query_pairs_mut().append_pair(PARAM_ORDER_ID, order_id);
    }
    url
}

/// What the landing view shows about the last checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandingParams {
    pub status: Option<String>,
    pub order_id: Option<String>,
    pub tx_hash: Option<String>,
}

impl LandingParams {
    pub fn from_url(url: &Url) -> Self {
        Self {
            status: query_value(url, PARAM_STATUS),
            order_id: query_value(url, PARAM_ORDER_ID),
            tx_hash: query_value(url, PARAM_TX_HASH),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.order_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn page(path: &str) -> Url {
        Url::parse(&format!("https://pay.example.com/{path}")).unwrap()
    }

    #[test]
    fn test_checkout_params_from_query() {
        let store = MemorySessionStore::new();
        let url = Url::parse(
            "https://pay.example.com/checkout.html?orderId=ord_1&apiBase=https%3A%2F%2Fapi.example.com%2F&userId=u1",
        )
        .unwrap();

        let params = CheckoutParams::resolve(&url, &store).unwrap();

        assert_eq!(params.order_id, "ord_1");
        assert_eq!(params.api_base, "https://api.example.com");
        assert_eq!(params.user_id.as_deref(), Some("u1"));
        assert_eq!(
            params.to_url(&page("checkout.html")).query(),
            Some("orderId=ord_1&apiBase=https%3A%2F%2Fapi.example.com&userId=u1")
        );
    }

    #[test]
    fn test_checkout_params_fall_back_to_session() {
        let store = MemorySessionStore::new();
        store.set(SessionKey::LastOrderId, "ord_9").unwrap();
        store.set(SessionKey::ApiBase, "https://api.example.com/v1/").unwrap();
        store.set(SessionKey::UserId, "u9").unwrap();

        let params = CheckoutParams::resolve(&page("checkout.html"), &store).unwrap();

        assert_eq!(params.order_id, "ord_9");
        assert_eq!(params.api_base, "https://api.example.com/v1");
        assert_eq!(params.user_id.as_deref(), Some("u9"));
    }

    #[test]
    fn test_checkout_params_missing_context() {
        let store = MemorySessionStore::new();
        store.set(SessionKey::ApiBase, "https://api.example.com").unwrap();

        let err = CheckoutParams::resolve(&page("checkout.html"), &store).unwrap_err();
        assert!(matches!(err, CheckoutError::MissingContext("orderId")));

        let url = Url::parse("https://pay.example.com/checkout.html?orderId=ord_1&apiBase=not%20a%20url").unwrap();
        let err = CheckoutParams::resolve(&url, &store).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidUrl(_)));
    }

    #[test]
    fn test_landing_redirect_round_trip() {
        let url = landing_redirect(&page("index.html"), &OrderStatus::Paid, "ord_1", Some("ABC123"));
        assert_eq!(url.as_str(), "https://pay.example.com/index.html?status=paid&orderId=ord_1&txHash=ABC123");

        let params = LandingParams::from_url(&url);
        assert_eq!(params.status.as_deref(), Some("paid"));
        assert_eq!(params.tx_hash.as_deref(), Some("ABC123"));

        let without_hash = landing_redirect(&page("index.html"), &OrderStatus::PaidLateRepriced, "ord_1", None);
        assert_eq!(without_hash.query(), Some("status=paid_late_repriced&orderId=ord_1"));
    }

    #[test]
    fn test_back_url() {
        assert_eq!(
            back_url(&page("index.html?status=old"), Some("ord_1")).as_str(),
            "https://pay.example.com/index.html?orderId=ord_1"
        );
        assert_eq!(back_url(&page("index.html"), None).as_str(), "https://pay.example.com/index.html");
        assert!(LandingParams::from_url(&page("index.html")).is_empty());
    }
}

//! Purchase form controller: validates the form, creates the order and
//! hands off to the checkout view.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ccpay_sdk::objects::{CreditAmount, DEFAULT_MIN_CREDIT, PaymentOrder, ValidationError};
use tracing::{info, warn};
use url::Url;

use crate::error::CheckoutError;
use crate::gateway::GatewayFactory;
use crate::navigation::{CheckoutParams, normalize_api_base};
use crate::session::{SessionContext, SessionKey, SessionStore};

/// Raw purchase form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseForm {
    pub api_base: String,
    pub user_id: String,
    pub credit: String,
}

#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub order: PaymentOrder,
    /// Checkout page URL carrying `orderId`, `apiBase` and `userId`.
    pub checkout_url: Url,
}

struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct PurchaseFlow {
    store: Arc<dyn SessionStore>,
    factory: Arc<dyn GatewayFactory>,
    checkout_page: Url,
    min_credit: i64,
    in_flight: AtomicBool,
}

impl PurchaseFlow {
    pub fn new(
        store: Arc<dyn SessionStore>,
        factory: Arc<dyn GatewayFactory>,
        checkout_page: Url,
    ) -> Self {
        Self {
            store,
            factory,
            checkout_page,
            min_credit: DEFAULT_MIN_CREDIT,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_min_credit(mut self, min_credit: i64) -> Self {
        self.min_credit = min_credit;
        self
    }

    pub fn min_credit(&self) -> i64 {
        self.min_credit
    }

    /// Values to prefill the form with.
    pub fn prefill(&self) -> Result<SessionContext, CheckoutError> {
        Ok(SessionContext::load(self.store.as_ref())?)
    }

    /// Create an order from the form.
    ///
    /// All input is validated before anything is persisted or sent. The
    /// API base and user id are saved even if creation then fails. Only one
    /// submission runs at a time; a concurrent call fails with
    /// [`CheckoutError::SubmissionInProgress`].
    pub async fn submit(&self, form: &PurchaseForm) -> Result<PurchaseOutcome, CheckoutError> {
        let api_base = normalize_api_base(&form.api_base);
        if api_base.is_empty() {
            return Err(ValidationError::EmptyField("api_base").into());
        }
        let api_base_url = Url::parse(&api_base)?;
        let user_id = form.user_id.trim();
        if user_id.is_empty() {
            return Err(ValidationError::EmptyField("user_id").into());
        }
        let credit = CreditAmount::parse(&form.credit, self.min_credit)?;

        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(CheckoutError::SubmissionInProgress);
        }
        let _guard = SubmitGuard(&self.in_flight);

        self.store.set(SessionKey::ApiBase, &api_base)?;
        self.store.set(SessionKey::UserId, user_id)?;

        let gateway = self.factory.connect(&api_base_url);
        let order = match gateway.create_order(user_id, credit).await {
            Ok(order) => order,
            Err(e) => {
                warn!(api_base = %api_base, user_id, credit = %credit, error = %e, "Order creation failed");
                return Err(e.into());
            }
        };
        self.store.set(SessionKey::LastOrderId, &order.order_id)?;
        info!(order_id = %order.order_id, user_id, credit = %credit, "Order created");

        let params = CheckoutParams {
            order_id: order.order_id.clone(),
            api_base,
            user_id: Some(user_id.to_string()),
        };
        Ok(PurchaseOutcome {
            checkout_url: params.to_url(&self.checkout_page),
            order,
        })
    }
}

impl std::fmt::Debug for PurchaseFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurchaseFlow")
            .field("checkout_page", &self.checkout_page.as_str())
            .field("min_credit", &self.min_credit)
            .finish()
    }
}

//! Checkout controller.
//!
//! A [`CheckoutSession`] owns everything one checkout screen needs: the
//! view model, the poll loop, and the collaborators used to pay. Sessions
//! share no global state, so several can run side by side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use ccpay_sdk::config::ChainConfig;
use ccpay_sdk::objects::PaymentOrder;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CheckoutError;
use crate::gateway::OrderGateway;
use crate::navigation::{back_url, landing_redirect};
use crate::reconcile::{DEFAULT_POLL_INTERVAL, OrderObserver, OrderPoller, PollState};
use crate::signing::SigningLibraryLoader;
use crate::submitter::TransactionSubmitter;
use crate::view::{CheckoutView, StatusMessage};
use crate::wallet::WalletBridge;

pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(2000);

const MSG_REFRESHED: &str = "Order status refreshed";
const MSG_SENDING: &str = "Connecting wallet and sending transaction";
const MSG_BROADCAST: &str = "Transaction broadcast, waiting for confirmation";
const MSG_SETTLED: &str = "Payment complete, returning to the purchase page";

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Page the session redirects to once the order is settled.
    pub landing_url: Url,
    pub poll_interval: Duration,
    pub redirect_delay: Duration,
}

impl CheckoutConfig {
    pub fn new(landing_url: Url) -> Self {
        Self {
            landing_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
        }
    }
}

/// Collaborators a session talks to.
#[derive(Clone)]
pub struct CheckoutDeps {
    pub gateway: Arc<dyn OrderGateway>,
    pub wallet: WalletBridge,
    pub loader: Arc<SigningLibraryLoader>,
    pub chain: Arc<ChainConfig>,
}

/// State reachable from poll tasks.
struct SessionInner {
    order_id: String,
    config: CheckoutConfig,
    view_tx: watch::Sender<CheckoutView>,
    redirect_task: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl SessionInner {
    fn update(&self, f: impl FnOnce(&mut CheckoutView)) {
        self.view_tx.send_modify(f);
    }

    fn show_error(&self, error: &CheckoutError) {
        self.update(|view| view.message = Some(StatusMessage::error(error.to_string())));
    }

    /// Apply a snapshot; on the first settled snapshot, lock the pay action
    /// and schedule the redirect.
    fn publish_order(&self, order: PaymentOrder) {
        if self.disposed.load(Ordering::Acquire) {
            debug!(order_id = %self.order_id, "Dropping snapshot for disposed session");
            return;
        }

        let mut redirect = None;
        self.view_tx.send_modify(|view| {
            let was_complete = view.is_complete();
            if !view.apply_order(order) || !view.is_complete() {
                return;
            }
            view.pay_enabled = false;
            if was_complete {
                return;
            }
            view.message = Some(StatusMessage::info(MSG_SETTLED));
            if let Some(order) = &view.order {
                redirect = Some(landing_redirect(
                    &self.config.landing_url,
                    &order.status,
                    &self.order_id,
                    view.tx_hash.as_deref(),
                ));
            }
        });

        if let Some(url) = redirect {
            self.schedule_redirect(url);
        }
    }

    fn schedule_redirect(&self, url: Url) {
        let view_tx = self.view_tx.clone();
        let delay = self.config.redirect_delay;
        let order_id = self.order_id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!(order_id = %order_id, redirect = %url, "Redirecting to landing page");
            view_tx.send_modify(|view| view.redirect = Some(url));
        });

        let mut slot = self.redirect_task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    fn cancel_redirect(&self) {
        let mut slot = self.redirect_task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

impl OrderObserver for SessionInner {
    fn order_updated(&self, order: &PaymentOrder) {
        self.publish_order(order.clone());
    }

    fn fetch_failed(&self, _order_id: &str, error: &CheckoutError) {
        if !self.disposed.load(Ordering::Acquire) {
            self.show_error(error);
        }
    }
}

/// Resets the in-progress flag when the payment attempt ends, including
/// when its future is dropped.
struct PayingGuard<'a>(&'a AtomicBool);

impl Drop for PayingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One checkout screen for one order.
pub struct CheckoutSession {
    inner: Arc<SessionInner>,
    deps: CheckoutDeps,
    submitter: TransactionSubmitter,
    poller: OrderPoller,
    paying: AtomicBool,
}

impl CheckoutSession {
    pub fn new(order_id: impl Into<String>, deps: CheckoutDeps, config: CheckoutConfig) -> Self {
        let (view_tx, _) = watch::channel(CheckoutView {
            refresh_enabled: true,
            ..CheckoutView::default()
        });
        let poll_interval = config.poll_interval;
        let inner = Arc::new(SessionInner {
            order_id: order_id.into(),
            config,
            view_tx,
            redirect_task: Mutex::new(None),
            disposed: AtomicBool::new(false),
        });
        let poller = OrderPoller::new(deps.gateway.clone(), inner.clone(), poll_interval);
        let submitter = TransactionSubmitter::new(deps.loader.clone());

        Self {
            inner,
            deps,
            submitter,
            poller,
            paying: AtomicBool::new(false),
        }
    }

    pub fn order_id(&self) -> &str {
        &self.inner.order_id
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.deps.chain
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> CheckoutView {
        self.inner.view_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CheckoutView> {
        self.inner.view_tx.subscribe()
    }

    pub fn poll_state(&self) -> PollState {
        self.poller.state()
    }

    /// Load the order, then start polling it.
    ///
    /// Pay stays disabled until the first snapshot arrives. On failure the
    /// error is shown and polling is not started; refresh remains
    /// available.
    pub async fn open(&self) -> Result<(), CheckoutError> {
        self.inner.update(|view| view.pay_enabled = false);
        info!(order_id = %self.inner.order_id, "Opening checkout");

        if let Err(e) = self.fetch().await {
            warn!(order_id = %self.inner.order_id, error = %e, "Failed to load order");
            self.inner.show_error(&e);
            return Err(e);
        }

        let mut complete = false;
        self.inner.update(|view| {
            complete = view.is_complete();
            view.pay_enabled = !complete;
        });
        if !complete {
            self.poller.start(&self.inner.order_id);
        }
        Ok(())
    }

    /// Fetch the order once, outside the poll schedule.
    pub async fn refresh(&self) -> Result<PaymentOrder, CheckoutError> {
        match self.fetch().await {
            Ok(order) => {
                self.inner.update(|view| {
                    if !view.is_complete() {
                        view.message = Some(StatusMessage::info(MSG_REFRESHED));
                    }
                });
                Ok(order)
            }
            Err(e) => {
                self.inner.show_error(&e);
                Err(e)
            }
        }
    }

    /// Pay the loaded order from the wallet and return the transaction
    /// hash.
    ///
    /// Only one payment attempt runs at a time; a second call while one is
    /// in flight fails with [`CheckoutError::PaymentInProgress`] and leaves
    /// the view alone. Failed attempts are never retried automatically.
    pub async fn pay(&self) -> Result<String, CheckoutError> {
        if self.paying.swap(true, Ordering::AcqRel) {
            return Err(CheckoutError::PaymentInProgress);
        }
        let _guard = PayingGuard(&self.paying);

        match self.submit().await {
            Ok(tx_hash) => {
                self.inner.update(|view| {
                    view.tx_hash = Some(tx_hash.clone());
                    if !view.is_complete() {
                        view.message = Some(StatusMessage::info(MSG_BROADCAST));
                    }
                });
                self.poller.start(&self.inner.order_id);
                Ok(tx_hash)
            }
            Err(e) => {
                warn!(order_id = %self.inner.order_id, error = %e, kind = ?e.kind(), "Payment failed");
                self.inner.update(|view| {
                    view.message = Some(StatusMessage::error(e.to_string()));
                    view.pay_enabled = view.order.is_some() && !view.is_complete();
                });
                Err(e)
            }
        }
    }

    /// Landing URL for leaving without paying.
    pub fn back_url(&self) -> Url {
        back_url(&self.inner.config.landing_url, Some(&self.inner.order_id))
    }

    /// Stop polling for good and cancel a pending redirect. Results of
    /// fetches still in flight are discarded, and an `open` or `pay` still
    /// running does not restart polling. Safe to call more than once.
    pub fn dispose(&self) {
        if !self.inner.disposed.swap(true, Ordering::AcqRel) {
            debug!(order_id = %self.inner.order_id, "Disposing checkout session");
        }
        self.poller.close();
        self.inner.cancel_redirect();
    }

    async fn fetch(&self) -> Result<PaymentOrder, CheckoutError> {
        let order = self.deps.gateway.fetch_order(&self.inner.order_id).await?;
        self.inner.publish_order(order.clone());
        Ok(order)
    }

    async fn submit(&self) -> Result<String, CheckoutError> {
        let order = self
            .inner
            .view_tx
            .borrow()
            .order
            .clone()
            .ok_or(CheckoutError::OrderNotLoaded)?;
        if order.status.is_terminal_success() {
            return Err(CheckoutError::OrderAlreadyPaid);
        }

        self.inner.update(|view| {
            view.pay_enabled = false;
            view.message = Some(StatusMessage::info(MSG_SENDING));
        });

        let signer = self.deps.wallet.ensure_signer(&self.deps.chain).await?;
        self.submitter
            .submit_payment(signer, &order, &self.deps.chain)
            .await
    }
}

impl Drop for CheckoutSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for CheckoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutSession")
            .field("order_id", &self.inner.order_id)
            .field("poller", &self.poller)
            .field("wallet", &self.deps.wallet)
            .finish()
    }
}

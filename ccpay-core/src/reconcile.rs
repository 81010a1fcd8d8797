//! Order reconciliation loop.
//!
//! [`OrderPoller`] fetches an order once immediately and then on a fixed
//! interval, handing every snapshot and every fetch failure to an
//! [`OrderObserver`]. It stops itself when the backend reports a
//! terminal-success status, or when [`stop`](OrderPoller::stop) is called.
//!
//! [`close`](OrderPoller::close) stops the loop for good: later calls to
//! `start` are ignored.
//!
//! Each tick issues an independent fetch task, so a hung request never
//! delays the next tick. Stopping cancels the timer only: a fetch that is
//! already in flight still resolves and still reaches the observer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use ccpay_sdk::objects::{OrderStatus, PaymentOrder};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::CheckoutError;
use crate::gateway::OrderGateway;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(4000);

/// Whether a snapshot with `status` ends polling.
///
/// Expiry alone never stops the loop; the backend is expected to move an
/// expired order to a status of its own.
pub fn should_stop_polling(status: &OrderStatus) -> bool {
    status.is_terminal_success()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    Stopped,
}

/// Receives the results of poll fetches.
pub trait OrderObserver: Send + Sync {
    fn order_updated(&self, order: &PaymentOrder);

    fn fetch_failed(&self, order_id: &str, error: &CheckoutError);
}

struct Run {
    id: u64,
    stop_tx: watch::Sender<bool>,
    ticker: JoinHandle<()>,
}

impl Run {
    fn halt(self) {
        let _ = self.stop_tx.send(true);
        self.ticker.abort();
    }
}

struct Shared {
    gateway: Arc<dyn OrderGateway>,
    observer: Arc<dyn OrderObserver>,
    interval: Duration,
    state_tx: watch::Sender<PollState>,
    run: Mutex<Option<Run>>,
    next_run: AtomicU64,
    closed: AtomicBool,
}

impl Shared {
    fn lock_run(&self) -> std::sync::MutexGuard<'_, Option<Run>> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stop the loop if `run_id` is still the active run.
    fn finish_run(&self, run_id: u64) {
        let mut run = self.lock_run();
        if run.as_ref().is_some_and(|r| r.id == run_id) {
            if let Some(current) = run.take() {
                current.halt();
            }
            self.state_tx.send_replace(PollState::Stopped);
        }
    }
}

/// Handle to a cancellable repeating order fetch.
///
/// Dropping the handle stops the loop.
pub struct OrderPoller {
    shared: Arc<Shared>,
}

impl OrderPoller {
    pub fn new(
        gateway: Arc<dyn OrderGateway>,
        observer: Arc<dyn OrderObserver>,
        interval: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(PollState::Idle);
        Self {
            shared: Arc::new(Shared {
                gateway,
                observer,
                interval,
                state_tx,
                run: Mutex::new(None),
                next_run: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Start polling `order_id`, replacing any loop already running.
    /// Does nothing once the poller is closed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, order_id: &str) {
        let mut run = self.shared.lock_run();
        if self.shared.closed.load(Ordering::Acquire) {
            debug!(order_id = %order_id, "Poller closed, not starting");
            return;
        }
        let id = self.shared.next_run.fetch_add(1, Ordering::Relaxed);
        let (stop_tx, stop_rx) = watch::channel(false);

        if let Some(previous) = run.take() {
            debug!(run_id = previous.id, "Replacing running poll loop");
            previous.halt();
        }
        self.shared.state_tx.send_replace(PollState::Polling);
        info!(order_id = %order_id, interval_ms = self.shared.interval.as_millis() as u64, "Polling order");

        let ticker = tokio::spawn(tick_loop(
            self.shared.clone(),
            id,
            order_id.to_string(),
            stop_rx,
        ));
        *run = Some(Run {
            id,
            stop_tx,
            ticker,
        });
    }

    /// Cancel the interval and move to [`PollState::Stopped`], whatever the
    /// current state. Safe to call any number of times.
    pub fn stop(&self) {
        let mut run = self.shared.lock_run();
        if let Some(current) = run.take() {
            debug!(run_id = current.id, "Stopping poll loop");
            current.halt();
        }
        self.shared.state_tx.send_replace(PollState::Stopped);
    }

    /// Stop and refuse every later [`start`](Self::start).
    pub fn close(&self) {
        {
            let _run = self.shared.lock_run();
            self.shared.closed.store(true, Ordering::Release);
        }
        self.stop();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    pub fn state(&self) -> PollState {
        *self.shared.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PollState> {
        self.shared.state_tx.subscribe()
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }
}

impl Drop for OrderPoller {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for OrderPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderPoller")
            .field("state", &self.state())
            .field("interval", &self.shared.interval)
            .finish()
    }
}

async fn tick_loop(
    shared: Arc<Shared>,
    run_id: u64,
    order_id: String,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(shared.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = stop_rx.changed() => break,

            _ = interval.tick() => {
                tokio::spawn(fetch_once(shared.clone(), run_id, order_id.clone()));
            }
        }
    }
    debug!(run_id, order_id = %order_id, "Poll loop exited");
}

async fn fetch_once(shared: Arc<Shared>, run_id: u64, order_id: String) {
    match shared.gateway.fetch_order(&order_id).await {
        Ok(order) => {
            debug!(order_id = %order_id, status = %order.status, "Order polled");
            shared.observer.order_updated(&order);
            if should_stop_polling(&order.status) {
                info!(order_id = %order_id, status = %order.status, "Order settled, polling stopped");
                shared.finish_run(run_id);
            }
        }
        Err(e) => {
            let error = CheckoutError::from(e);
            warn!(order_id = %order_id, error = %error, "Order poll failed");
            shared.observer.fetch_failed(&order_id, &error);
        }
    }
}

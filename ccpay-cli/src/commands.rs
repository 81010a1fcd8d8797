//! Subcommand implementations.

use std::sync::Arc;

use anyhow::Context as _;
use ccpay_core::gateway::{GatewayFactory, HttpGatewayFactory};
use ccpay_core::navigation::{CheckoutParams, LandingParams, PARAM_API_BASE, PARAM_ORDER_ID};
use ccpay_core::session::{FileSessionStore, SessionContext};
use ccpay_core::signing::SigningLibraryLoader;
use ccpay_core::view::{CheckoutView, StatusMessage};
use ccpay_core::wallet::WalletBridge;
use ccpay_core::{CheckoutConfig, CheckoutDeps, CheckoutSession, PurchaseFlow, PurchaseForm};
use ccpay_sdk::config::ChainConfig;
use ccpay_sdk::objects::OrderStatus;
use url::Url;

use crate::config::LoadedConfig;
use crate::shutdown::shutdown_signal;

/// Shared handles for every command.
pub struct Context {
    config: LoadedConfig,
    store: Arc<FileSessionStore>,
    factory: Arc<HttpGatewayFactory>,
}

impl Context {
    pub fn new(config: LoadedConfig) -> anyhow::Result<Self> {
        let store = FileSessionStore::open(&config.session_file)
            .with_context(|| format!("failed to open session file {}", config.session_file.display()))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("ccpay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            config,
            store: Arc::new(store),
            factory: Arc::new(HttpGatewayFactory::new(http)),
        })
    }

    /// Checkout page URL carrying whatever the command line supplied;
    /// anything missing is filled from the session file.
    fn entry_url(&self, order_id: Option<&str>) -> Url {
        let mut url = self.config.checkout_url.clone();
        url.set_query(None);
        if let Some(order_id) = order_id {
            url.query_pairs_mut().append_pair(PARAM_ORDER_ID, order_id);
        }
        if let Some(api_base) = &self.config.api_base {
            url.query_pairs_mut().append_pair(PARAM_API_BASE, api_base);
        }
        url
    }

    fn checkout_session(&self, order_id: Option<&str>) -> anyhow::Result<CheckoutSession> {
        let params = CheckoutParams::resolve(&self.entry_url(order_id), self.store.as_ref())
            .context("no order to check out; pass an order id and --api-base, or create one first")?;
        let gateway = self.factory.connect(&params.api_base_url()?);

        // No wallet is reachable from a terminal, so the session only
        // observes the order.
        let deps = CheckoutDeps {
            gateway,
            wallet: WalletBridge::detached(),
            loader: Arc::new(SigningLibraryLoader::new(Vec::new())),
            chain: self.config.chain.clone(),
        };
        let mut config = CheckoutConfig::new(self.config.landing_url.clone());
        config.poll_interval = self.config.poll_interval;
        config.redirect_delay = self.config.redirect_delay;

        Ok(CheckoutSession::new(params.order_id, deps, config))
    }
}

/// Create an order and print its checkout URL.
pub async fn create(ctx: &Context, user_id: Option<String>, credit: String) -> anyhow::Result<()> {
    let flow = PurchaseFlow::new(
        ctx.store.clone(),
        ctx.factory.clone(),
        ctx.config.checkout_url.clone(),
    )
    .with_min_credit(ctx.config.min_credit);

    let prefill = flow.prefill()?;
    let api_base = ctx
        .config
        .api_base
        .clone()
        .or(prefill.api_base)
        .context("no API base configured; pass --api-base")?;
    let user_id = user_id
        .or(prefill.user_id)
        .context("no user id given; pass --user-id")?;

    let outcome = flow
        .submit(&PurchaseForm {
            api_base,
            user_id,
            credit,
        })
        .await?;

    let mut view = CheckoutView::default();
    view.apply_order(outcome.order);
    print_details(&view, &ctx.config.chain);
    println!();
    println!("Checkout: {}", outcome.checkout_url);
    Ok(())
}

/// Fetch an order once and print it.
pub async fn show(ctx: &Context, order_id: Option<String>) -> anyhow::Result<()> {
    let session = ctx.checkout_session(order_id.as_deref())?;
    session.refresh().await?;
    print_details(&session.view(), session.chain());
    session.dispose();
    Ok(())
}

/// Poll an order until it settles or the user interrupts.
pub async fn watch(ctx: &Context, order_id: Option<String>) -> anyhow::Result<()> {
    let session = ctx.checkout_session(order_id.as_deref())?;
    let mut view_rx = session.subscribe();
    session.open().await?;

    let initial = session.view();
    print_details(&initial, session.chain());
    println!();
    let mut last_status: Option<OrderStatus> = initial.order.map(|order| order.status);
    let mut last_message: Option<StatusMessage> = initial.message;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            res = &mut shutdown => {
                res?;
                println!("Left checkout: {}", session.back_url());
                break;
            }
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = view_rx.borrow_and_update().clone();

                let status = view.order.as_ref().map(|order| order.status.clone());
                if status != last_status {
                    if let Some(status) = &status {
                        println!("Status: {status}");
                    }
                    last_status = status;
                }
                if view.message != last_message {
                    if let Some(message) = &view.message {
                        println!("{message}");
                    }
                    last_message = view.message.clone();
                }
                if let Some(redirect) = view.redirect {
                    println!();
                    print_details(&session.view(), session.chain());
                    println!("Redirect: {redirect}");
                    break;
                }
            }
        }
    }

    session.dispose();
    Ok(())
}

/// Print or clear the persisted context.
pub fn session(ctx: &Context, clear: bool) -> anyhow::Result<()> {
    if clear {
        SessionContext::clear(ctx.store.as_ref())?;
        println!("Session cleared ({})", ctx.store.path().display());
    } else {
        let context = SessionContext::load(ctx.store.as_ref())?;
        println!("{}", serde_json::to_string_pretty(&context)?);
    }
    Ok(())
}

/// Summarize a landing redirect URL.
pub fn landing(url: &Url) {
    let params = LandingParams::from_url(url);
    if params.is_empty() {
        println!("No previous checkout in this URL");
        return;
    }
    for (label, value) in [
        ("Status", params.status),
        ("Order", params.order_id),
        ("Tx hash", params.tx_hash),
    ] {
        if let Some(value) = value {
            println!("{label:<14} {value}");
        }
    }
}

fn print_details(view: &CheckoutView, chain: &ChainConfig) {
    for (label, value) in view.detail_lines(chain) {
        println!("{label:<14} {value}");
    }
}

//! In-process stand-ins for the backend, wallet and signing library.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ccpay_core::gateway::{GatewayFactory, OrderGateway};
use ccpay_core::signing::{
    BroadcastResult, Fee, SigningClient, SigningError, SigningLibrary, SigningLibraryLoader,
};
use ccpay_core::wallet::{
    AccountData, ChainSuggestion, OfflineSigner, WalletBridge, WalletError, WalletExtension,
};
use ccpay_core::{CheckoutConfig, CheckoutDeps};
use ccpay_sdk::client::{ClientError, StatusCode};
use ccpay_sdk::config::ChainConfig;
use ccpay_sdk::objects::{Coin, CreditAmount, GasPrice, OrderStatus, PaymentOrder};
use time::macros::datetime;
use url::Url;

pub const ORDER_ID: &str = "ord_1";
pub const AMOUNT_BASE: &str = "500000000000000000";
pub const TX_HASH: &str = "ABC123";

pub fn pending_order() -> PaymentOrder {
    PaymentOrder {
        order_id: ORDER_ID.to_string(),
        recipient_address: "dora1recipient".to_string(),
        amount_base: AMOUNT_BASE.to_string(),
        denom: "peaka".to_string(),
        status: OrderStatus::Pending,
        expires_at: Some(datetime!(2026-10-19 12:00 UTC)),
        ..PaymentOrder::default()
    }
}

/// Order backend holding a single order.
pub struct StubBackend {
    order: Mutex<PaymentOrder>,
    creates: Mutex<Vec<(String, CreditAmount)>>,
    fetches: AtomicUsize,
    failing_fetches: AtomicUsize,
    create_delay: Mutex<Option<Duration>>,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            order: Mutex::new(pending_order()),
            creates: Mutex::new(vec![]),
            fetches: AtomicUsize::new(0),
            failing_fetches: AtomicUsize::new(0),
            create_delay: Mutex::new(None),
        })
    }

    pub fn mark_paid(&self) {
        let mut order = self.order.lock().unwrap();
        order.status = OrderStatus::Paid;
        order.paid_at = Some(datetime!(2026-10-19 11:00 UTC));
        order.credit_issued = Some(10000);
    }

    pub fn set_status(&self, status: OrderStatus) {
        self.order.lock().unwrap().status = status;
    }

    /// Make the next `count` fetches fail with a 503.
    pub fn fail_next_fetches(&self, count: usize) {
        self.failing_fetches.store(count, Ordering::SeqCst);
    }

    pub fn delay_creates(&self, delay: Duration) {
        *self.create_delay.lock().unwrap() = Some(delay);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> Vec<(String, CreditAmount)> {
        self.creates.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderGateway for StubBackend {
    async fn create_order(
        &self,
        user_id: &str,
        credit: CreditAmount,
    ) -> Result<PaymentOrder, ClientError> {
        self.creates
            .lock()
            .unwrap()
            .push((user_id.to_string(), credit));
        let delay = *self.create_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if user_id == "blocked" {
            return Err(ClientError::OrderCreation {
                status: StatusCode::UNAUTHORIZED,
                body: "user is blocked".to_string(),
            });
        }
        Ok(self.order.lock().unwrap().clone())
    }

    async fn fetch_order(&self, order_id: &str) -> Result<PaymentOrder, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_fetches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ClientError::OrderFetch {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "backend unavailable".to_string(),
            });
        }
        let mut order = self.order.lock().unwrap().clone();
        order.order_id = order_id.to_string();
        Ok(order)
    }
}

/// Hands out the same backend for every API base and records the bases.
pub struct StubFactory {
    pub backend: Arc<StubBackend>,
    pub connected: Mutex<Vec<String>>,
}

impl StubFactory {
    pub fn new(backend: Arc<StubBackend>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            connected: Mutex::new(vec![]),
        })
    }
}

impl GatewayFactory for StubFactory {
    fn connect(&self, api_base: &Url) -> Arc<dyn OrderGateway> {
        self.connected.lock().unwrap().push(api_base.to_string());
        self.backend.clone()
    }
}

pub struct StubSigner;

#[async_trait]
impl OfflineSigner for StubSigner {
    async fn accounts(&self) -> Result<Vec<AccountData>, WalletError> {
        Ok(vec![AccountData {
            address: "dora1buyer".to_string(),
            algo: "secp256k1".to_string(),
            pubkey: vec![2; 33],
        }])
    }

    async fn sign(&self, _: &str, _: &[u8]) -> Result<Vec<u8>, WalletError> {
        Ok(vec![0; 64])
    }
}

/// Wallet that already knows the chain. Enabling takes `enable_delay`.
pub struct StubWallet {
    pub enable_delay: Option<Duration>,
}

impl StubWallet {
    pub fn instant() -> Self {
        Self { enable_delay: None }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            enable_delay: Some(delay),
        }
    }
}

#[async_trait]
impl WalletExtension for StubWallet {
    fn name(&self) -> &str {
        "stub"
    }

    async fn enable(&self, _: &str) -> Result<(), WalletError> {
        if let Some(delay) = self.enable_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn supports_chain_suggestion(&self) -> bool {
        false
    }

    async fn suggest_chain(&self, _: &ChainSuggestion) -> Result<(), WalletError> {
        Err(WalletError::Other("unsupported".to_string()))
    }

    async fn offline_signer(&self, _: &str) -> Result<Arc<dyn OfflineSigner>, WalletError> {
        Ok(Arc::new(StubSigner))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub sender: String,
    pub recipient: String,
    pub amount: Vec<Coin>,
    pub memo: String,
}

/// Signing library whose broadcasts return `code`. A successful broadcast
/// marks the backend order as paid.
pub struct StubChain {
    code: u32,
    backend: Arc<StubBackend>,
    pub transfers: Mutex<Vec<Transfer>>,
}

impl StubChain {
    pub fn new(code: u32, backend: Arc<StubBackend>) -> Arc<Self> {
        Arc::new(Self {
            code,
            backend,
            transfers: Mutex::new(vec![]),
        })
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        self.transfers.lock().unwrap().clone()
    }
}

struct StubChainClient(Arc<StubChain>);

#[async_trait]
impl SigningClient for StubChainClient {
    async fn send_tokens(
        &self,
        sender: &str,
        recipient: &str,
        amount: &[Coin],
        _fee: Fee,
        memo: &str,
    ) -> Result<BroadcastResult, SigningError> {
        let chain = &self.0;
        chain.transfers.lock().unwrap().push(Transfer {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            amount: amount.to_vec(),
            memo: memo.to_string(),
        });
        if chain.code == 0 {
            chain.backend.mark_paid();
        }
        Ok(BroadcastResult {
            code: chain.code,
            raw_log: if chain.code == 0 {
                String::new()
            } else {
                "insufficient funds".to_string()
            },
            transaction_hash: TX_HASH.to_string(),
            height: 1200,
        })
    }
}

struct StubChainLibrary(Arc<StubChain>);

#[async_trait]
impl SigningLibrary for StubChainLibrary {
    async fn connect_with_signer(
        &self,
        _rpc_endpoint: &Url,
        _signer: Arc<dyn OfflineSigner>,
        _gas_price: GasPrice,
    ) -> Result<Box<dyn SigningClient>, SigningError> {
        Ok(Box::new(StubChainClient(self.0.clone())))
    }
}

pub fn landing_page() -> Url {
    Url::parse("https://pay.example.com/index.html").unwrap()
}

pub fn checkout_page() -> Url {
    Url::parse("https://pay.example.com/checkout.html").unwrap()
}

pub fn deps(backend: Arc<StubBackend>, chain: Arc<StubChain>) -> CheckoutDeps {
    CheckoutDeps {
        gateway: backend,
        wallet: WalletBridge::new(Arc::new(StubWallet::instant())),
        loader: Arc::new(SigningLibraryLoader::preloaded(Arc::new(StubChainLibrary(chain)))),
        chain: Arc::new(ChainConfig::default()),
    }
}

pub fn config() -> CheckoutConfig {
    CheckoutConfig::new(landing_page())
}

/// Let spawned tasks run without advancing the paused clock.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

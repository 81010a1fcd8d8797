//! Seam between the checkout flow and the order backend.
//!
//! [`OrderClient`] is the production implementation; tests plug in stubs.

use std::sync::Arc;

use async_trait::async_trait;
use ccpay_sdk::client::{ClientError, OrderClient};
use ccpay_sdk::objects::{CreditAmount, PaymentOrder};
use url::Url;

/// Backend order operations used by the checkout flow.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Create an order. Not idempotent.
    async fn create_order(
        &self,
        user_id: &str,
        credit: CreditAmount,
    ) -> Result<PaymentOrder, ClientError>;

    /// Read the current snapshot of an order.
    async fn fetch_order(&self, order_id: &str) -> Result<PaymentOrder, ClientError>;
}

#[async_trait]
impl OrderGateway for OrderClient {
    async fn create_order(
        &self,
        user_id: &str,
        credit: CreditAmount,
    ) -> Result<PaymentOrder, ClientError> {
        OrderClient::create_order(self, user_id, credit).await
    }

    async fn fetch_order(&self, order_id: &str) -> Result<PaymentOrder, ClientError> {
        OrderClient::fetch_order(self, order_id).await
    }
}

/// Builds a gateway for an API base chosen at runtime (typed into the
/// purchase form or read from the checkout URL).
pub trait GatewayFactory: Send + Sync {
    fn connect(&self, api_base: &Url) -> Arc<dyn OrderGateway>;
}

/// Factory producing HTTP [`OrderClient`]s that share one connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpGatewayFactory {
    http: reqwest::Client,
}

impl HttpGatewayFactory {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl GatewayFactory for HttpGatewayFactory {
    fn connect(&self, api_base: &Url) -> Arc<dyn OrderGateway> {
        Arc::new(OrderClient::new(api_base).with_http_client(self.http.clone()))
    }
}

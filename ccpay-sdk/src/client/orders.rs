//! Order API client (checkout frontend → order backend).

use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info};
use url::Url;

use super::ClientError;
use crate::objects::{CreateOrderRequest, CreditAmount, PaymentOrder, ValidationError};

/// Header carrying the buyer's identity on order creation.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Typed HTTP client for the payment-order endpoints.
///
/// - `POST {api_base}/payments/orders` creates an order.
/// - `GET {api_base}/payments/orders/{order_id}` reads one back.
///
/// Neither call has a client-side timeout unless one is configured on the
/// `reqwest::Client` passed to [`OrderClient::with_http_client`].
#[derive(Debug, Clone)]
pub struct OrderClient {
    http: Client,
    api_base: String,
}

impl OrderClient {
    /// Create a new `OrderClient`.
    ///
    /// A single trailing `/` on `api_base` is ignored.
    pub fn new(api_base: &Url) -> Self {
        let api_base = api_base.as_str();
        Self {
            http: Client::new(),
            api_base: api_base.strip_suffix('/').unwrap_or(api_base).to_string(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(Url::parse(&format!("{}{}", self.api_base, path))?)
    }

    /// `POST /payments/orders` – create a new order for `credit`.
    ///
    /// Not idempotent: every call may create a distinct order.
    pub async fn create_order(
        &self,
        user_id: &str,
        credit: CreditAmount,
    ) -> Result<PaymentOrder, ClientError> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("user_id").into());
        }
        let url = self.endpoint("/payments/orders")?;
        debug!(%url, %credit, "Creating payment order");

        let resp = self
            .http
            .post(url)
            .header(USER_ID_HEADER, user_id)
            .json(&CreateOrderRequest { credit })
            .send()
            .await?;

        let status = resp.status();
        let bytes = read_success(resp, |status, body| ClientError::OrderCreation { status, body })
            .await?;
        let order: PaymentOrder = serde_json::from_slice(&bytes)?;
        if order.order_id.is_empty() {
            return Err(ClientError::OrderCreation {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        info!(order_id = %order.order_id, amount_base = %order.amount_base, "Payment order created");
        Ok(order)
    }

    /// `GET /payments/orders/{order_id}` – read the current order snapshot.
    pub async fn fetch_order(&self, order_id: &str) -> Result<PaymentOrder, ClientError> {
        if order_id.is_empty() {
            return Err(ValidationError::EmptyOrderId.into());
        }
        let url = self.endpoint(&format!(
            "/payments/orders/{}",
            urlencoding::encode(order_id)
        ))?;

        let resp = self.http.get(url).send().await?;
        let bytes =
            read_success(resp, |status, body| ClientError::OrderFetch { status, body }).await?;
        let mut order: PaymentOrder = serde_json::from_slice(&bytes)?;
        if order.order_id.is_empty() {
            order.order_id = order_id.to_string();
        }

        debug!(order_id, status = %order.status, "Fetched payment order");
        Ok(order)
    }
}

async fn read_success(
    resp: Response,
    rejected: impl FnOnce(StatusCode, String) -> ClientError,
) -> Result<Bytes, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(rejected(status, body));
    }
    Ok(resp.bytes().await?)
}

//! HTTP client for the payment-order API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

mod orders;

pub use orders::{OrderClient, USER_ID_HEADER};

pub use reqwest::StatusCode;

use crate::objects::ValidationError;

/// Errors produced by [`OrderClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Order creation was rejected; `body` is the raw response text.
    #[error("order creation failed: status {status}, body: {body}")]
    OrderCreation { status: StatusCode, body: String },

    /// Order lookup was rejected; `body` is the raw response text.
    #[error("order fetch failed: status {status}, body: {body}")]
    OrderFetch { status: StatusCode, body: String },

    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API base could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Input rejected before sending.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ClientError {
    /// Raw response body for rejected requests.
    pub fn body(&self) -> Option<&str> {
        match self {
            ClientError::OrderCreation { body, .. } | ClientError::OrderFetch { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }
}

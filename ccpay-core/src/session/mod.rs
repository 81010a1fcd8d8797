//! Persisted checkout context.
//!
//! The last API base, user id and order id survive across runs so that
//! forms can be prefilled and a known order resumed. Values never expire.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse session file: {0}")]
    Json(#[from] serde_json::Error),
}

/// The fixed set of persisted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKey {
    ApiBase,
    UserId,
    LastOrderId,
}

impl SessionKey {
    pub const ALL: [SessionKey; 3] = [SessionKey::ApiBase, SessionKey::UserId, SessionKey::LastOrderId];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKey::ApiBase => "api_base",
            SessionKey::UserId => "user_id",
            SessionKey::LastOrderId => "last_order_id",
        }
    }
}

/// String key/value persistence port.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError>;

    fn set(&self, key: SessionKey, value: &str) -> Result<(), SessionError>;

    fn remove(&self, key: SessionKey) -> Result<(), SessionError>;
}

/// Snapshot of every persisted value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub api_base: Option<String>,
    pub user_id: Option<String>,
    pub last_order_id: Option<String>,
}

impl SessionContext {
    pub fn load(store: &dyn SessionStore) -> Result<Self, SessionError> {
        Ok(Self {
            api_base: store.get(SessionKey::ApiBase)?,
            user_id: store.get(SessionKey::UserId)?,
            last_order_id: store.get(SessionKey::LastOrderId)?,
        })
    }

    pub fn clear(store: &dyn SessionStore) -> Result<(), SessionError> {
        for key in SessionKey::ALL {
            store.remove(key)?;
        }
        Ok(())
    }
}

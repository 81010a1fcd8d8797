use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::{LibrarySource, SigningLibrary};
use crate::error::CheckoutError;

/// Loads the signing library at most once per loader.
///
/// Sources are tried in order until one succeeds. Concurrent callers of
/// [`load`](Self::load) wait on the same in-flight attempt instead of
/// starting their own. A failed attempt leaves the loader empty, so the
/// next call tries the sources again.
pub struct SigningLibraryLoader {
    sources: Vec<Arc<dyn LibrarySource>>,
    library: OnceCell<Arc<dyn SigningLibrary>>,
}

impl SigningLibraryLoader {
    pub fn new(sources: Vec<Arc<dyn LibrarySource>>) -> Self {
        Self {
            sources,
            library: OnceCell::new(),
        }
    }

    /// A loader that already holds `library`.
    pub fn preloaded(library: Arc<dyn SigningLibrary>) -> Self {
        Self {
            sources: Vec::new(),
            library: OnceCell::new_with(Some(library)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.library.initialized()
    }

    pub async fn load(&self) -> Result<Arc<dyn SigningLibrary>, CheckoutError> {
        self.library
            .get_or_try_init(|| self.load_from_sources())
            .await
            .map(Arc::clone)
    }

    async fn load_from_sources(&self) -> Result<Arc<dyn SigningLibrary>, CheckoutError> {
        let mut last_error = None;
        for source in &self.sources {
            debug!(source = source.name(), "Loading signing library");
            match source.load().await {
                Ok(library) => {
                    info!(source = source.name(), "Signing library loaded");
                    return Ok(library);
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "Signing library source failed");
                    last_error = Some(e);
                }
            }
        }
        Err(CheckoutError::LibraryLoad {
            attempts: self.sources.len(),
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no library sources configured".to_string()),
        })
    }
}

impl std::fmt::Debug for SigningLibraryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningLibraryLoader")
            .field("sources", &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

//! Application state shared across handlers.

use std::sync::Arc;

use printshare_core::{IdGenerator, RandomIds};

use crate::config::ServerConfig;
use crate::services::{AuthError, CredentialStore, Marketplace};
use crate::store::ResourceStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Both stores live here; there
/// is no process-global instance.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    credentials: Arc<CredentialStore>,
    marketplace: Marketplace,
}

impl AppState {
    /// Create a new application state with random IDs.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the configured hash cost is invalid.
    pub fn new(config: ServerConfig) -> Result<Self, AuthError> {
        Self::with_ids(config, Arc::new(RandomIds))
    }

    /// Create a new application state drawing IDs from `ids`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the configured hash cost is invalid.
    pub fn with_ids(config: ServerConfig, ids: Arc<dyn IdGenerator>) -> Result<Self, AuthError> {
        let credentials = Arc::new(CredentialStore::new(Arc::clone(&ids), config.hash_cost)?);
        let marketplace = Marketplace::new(Arc::new(ResourceStore::new()), ids);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                credentials,
                marketplace,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Shared handle to the credential store, for use on the blocking pool.
    #[must_use]
    pub fn credentials(&self) -> Arc<CredentialStore> {
        Arc::clone(&self.inner.credentials)
    }

    /// Get a reference to the printer and order operations.
    #[must_use]
    pub fn marketplace(&self) -> &Marketplace {
        &self.inner.marketplace
    }
}

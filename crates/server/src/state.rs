//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::db::Store;
use crate::services::auth::TokenService;
use crate::services::{AddressService, AuthService, CartService, CatalogService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the store, the token service and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn Store>,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Backend every service reads and writes through
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn Store>) -> Self {
        let tokens = TokenService::new(&config.jwt_secret);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the backing store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    fn store_timeout(&self) -> Duration {
        self.inner.config.store_timeout
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store(), self.tokens(), self.store_timeout())
    }

    #[must_use]
    pub fn cart(&self) -> CartService<'_> {
        CartService::new(self.store(), self.store_timeout())
    }

    #[must_use]
    pub fn addresses(&self) -> AddressService<'_> {
        AddressService::new(self.store(), self.store_timeout())
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(self.store(), self.store_timeout())
    }
}

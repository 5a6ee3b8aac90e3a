//! Application state shared across the presentation layer.
//!
//! `AppState` owns the stores for the lifetime of the process. Components
//! that must not keep the stores alive hold a [`StateHandle`] instead and get
//! [`AppError::NotInitialized`] once the state is gone.

use std::sync::{Arc, Weak};

use rust_decimal::Decimal;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result};
use crate::models::CartSummary;
use crate::services::{AuthStore, CartStore};
use crate::storage::{FileStore, KeyValueStore};

/// Application state shared by every consumer.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog and both stores.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    cart: CartStore,
    auth: AuthStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `storage` - Key-value store backing the session and user directory
    /// * `catalog` - Product catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be read.
    pub fn new(
        config: StorefrontConfig,
        storage: Arc<dyn KeyValueStore>,
        catalog: Catalog,
    ) -> Result<Self> {
        let auth = AuthStore::open(storage)?.with_latency(config.auth_latency);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart: CartStore::new(),
                auth,
            }),
        })
    }

    /// Create state backed by the on-disk store and catalog named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or catalog file is unusable.
    pub fn from_config(config: StorefrontConfig) -> Result<Self> {
        let storage = FileStore::in_dir(&config.data_dir)?;
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin(),
        };

        tracing::info!(
            storage = %storage.path().display(),
            products = catalog.len(),
            "storefront initialized"
        );
        Self::new(config, Arc::new(storage), catalog)
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the auth store.
    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.inner.auth
    }

    /// Cart summary at the configured tax rate.
    #[must_use]
    pub fn cart_summary(&self) -> CartSummary {
        self.cart().summary(self.tax_rate())
    }

    /// A handle that does not keep this state alive.
    #[must_use]
    pub fn handle(&self) -> StateHandle {
        StateHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn tax_rate(&self) -> Decimal {
        self.inner.config.tax_rate
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("products", &self.inner.catalog.len())
            .field("cart_lines", &self.inner.cart.len())
            .field("auth", &self.inner.auth)
            .finish()
    }
}

/// Weak reference to [`AppState`].
#[derive(Debug, Clone, Default)]
pub struct StateHandle {
    inner: Weak<AppStateInner>,
}

impl StateHandle {
    /// A handle that was never attached to any state.
    #[must_use]
    pub const fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    /// The state, if it is still alive.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotInitialized` if the state was dropped or the
    /// handle was never attached.
    pub fn upgrade(&self) -> Result<AppState> {
        self.inner
            .upgrade()
            .map(|inner| AppState { inner })
            .ok_or(AppError::NotInitialized("AppState"))
    }

    /// Run `f` against the cart store.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotInitialized` if the state is gone.
    pub fn with_cart<T>(&self, f: impl FnOnce(&CartStore) -> T) -> Result<T> {
        let state = self
            .inner
            .upgrade()
            .ok_or(AppError::NotInitialized("CartStore"))?;
        Ok(f(&state.cart))
    }

    /// Run `f` against the auth store.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotInitialized` if the state is gone.
    pub fn with_auth<T>(&self, f: impl FnOnce(&AuthStore) -> T) -> Result<T> {
        let state = self
            .inner
            .upgrade()
            .ok_or(AppError::NotInitialized("AuthStore"))?;
        Ok(f(&state.auth))
    }
}

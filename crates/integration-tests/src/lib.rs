//! Integration tests for Corner Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p corner-shop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart operations and totals over the real catalog
//! - `auth_store` - Signup, login and logout against a persistence collaborator
//! - `restart` - Session survival across a rebuilt application state
//!
//! This crate holds the shared fixtures.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use corner_shop_core::{Price, ProductId};
use corner_shop_storefront::AppState;
use corner_shop_storefront::catalog::Catalog;
use corner_shop_storefront::config::StorefrontConfig;
use corner_shop_storefront::models::Product;
use corner_shop_storefront::storage::{KeyValueStore, MemoryStore, StorageError};

/// Configuration with no simulated latency.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        auth_latency: Duration::ZERO,
        ..StorefrontConfig::default()
    }
}

/// Application state over `storage` and the built-in catalog.
///
/// # Panics
///
/// Panics if the stored session cannot be read.
#[must_use]
#[allow(clippy::expect_used)]
pub fn open_state(storage: Arc<dyn KeyValueStore>) -> AppState {
    AppState::new(test_config(), storage, Catalog::builtin()).expect("state opens")
}

/// A catalog product with the given price.
///
/// # Panics
///
/// Panics if `price` is not a valid price.
#[must_use]
#[allow(clippy::expect_used)]
pub fn product(id: &str, name: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        price: price.parse::<Price>().expect("valid price"),
        description: String::new(),
        image: format!("https://example.com/{id}.jpg"),
        category: "Test".to_owned(),
        in_stock: true,
        rating: 4.0,
    }
}

/// Collects every event a store publishes.
#[derive(Debug)]
pub struct Recorder<E> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E: Clone + Send + 'static> Recorder<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// An observer that appends to this recorder.
    #[must_use]
    pub fn observer(&self) -> impl Fn(&E) + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        move |event: &E| {
            events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
        }
    }

    /// Events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<E> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<E: Clone + Send + 'static> Default for Recorder<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A store whose reads or writes can be switched to fail.
#[derive(Debug, Clone, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    failing_key: Arc<Mutex<Option<String>>>,
}

impl FailingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The entries underneath, unaffected by failure switches.
    #[must_use]
    pub const fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail writes to `key` only, leaving other keys writable.
    pub fn fail_writes_to(&self, key: &str) {
        *self
            .failing_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(key.to_owned());
    }

    fn write_fails(&self, key: &str) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
            || self
                .failing_key
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .as_deref()
                == Some(key)
    }

    fn unavailable(key: &str) -> StorageError {
        StorageError::Io {
            path: key.into(),
            source: io::Error::other("storage unavailable"),
        }
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable(key));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.write_fails(key) {
            return Err(Self::unavailable(key));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.write_fails(key) {
            return Err(Self::unavailable(key));
        }
        self.inner.remove(key)
    }
}

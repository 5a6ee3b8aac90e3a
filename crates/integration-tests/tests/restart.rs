//! Integration tests for state that survives a rebuilt application.
//!
//! A "restart" drops the `AppState` and opens a new one over the same
//! storage, the way reloading the shop keeps the device's storage.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use corner_shop_core::ProductId;
use corner_shop_integration_tests::{open_state, test_config};
use corner_shop_storefront::services::AuthState;
use corner_shop_storefront::storage::{FileStore, KeyValueStore, MemoryStore, keys};
use corner_shop_storefront::{AppError, AppState};

#[tokio::test]
async fn test_session_survives_restart() {
    let storage = MemoryStore::new();

    let state = open_state(Arc::new(storage.clone()));
    let session = state
        .auth()
        .signup("Ada", "ada@example.com", "secret1")
        .await
        .unwrap();
    drop(state);

    let restarted = open_state(Arc::new(storage));
    assert_eq!(restarted.auth().state(), AuthState::Authenticated(session));
}

#[tokio::test]
async fn test_logout_survives_restart() {
    let storage = MemoryStore::new();

    let state = open_state(Arc::new(storage.clone()));
    state
        .auth()
        .signup("Ada", "ada@example.com", "secret1")
        .await
        .unwrap();
    state.auth().logout().unwrap();
    drop(state);

    let restarted = open_state(Arc::new(storage));
    assert_eq!(restarted.auth().state(), AuthState::Anonymous);
    // The account itself is still there.
    restarted
        .auth()
        .login("ada@example.com", "secret1")
        .await
        .unwrap();
}

#[test]
fn test_malformed_session_resets_to_anonymous() {
    for garbage in ["not json", "{\"name\":\"no id\"}", "[]", ""] {
        let storage = MemoryStore::new();
        storage.set(keys::SESSION, garbage).unwrap();

        let state = open_state(Arc::new(storage.clone()));
        assert_eq!(state.auth().state(), AuthState::Anonymous, "{garbage:?}");
        assert_eq!(storage.get(keys::SESSION).unwrap(), None);
    }
}

#[test]
fn test_cart_does_not_survive_restart() {
    let storage = MemoryStore::new();

    let state = open_state(Arc::new(storage.clone()));
    let product = state.catalog().get(&ProductId::new("prod_001")).unwrap();
    state.cart().add_item(product);
    drop(state);

    let restarted = open_state(Arc::new(storage));
    assert!(restarted.cart().is_empty());
}

#[tokio::test]
async fn test_file_store_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = || {
        let mut config = test_config();
        config.data_dir = dir.path().to_path_buf();
        config
    };

    let state = AppState::from_config(config()).unwrap();
    let session = state
        .auth()
        .signup("Ada", "ada@example.com", "secret1")
        .await
        .unwrap();
    drop(state);

    let on_disk = std::fs::read_to_string(dir.path().join(FileStore::FILE_NAME)).unwrap();
    let entries: serde_json::Value = serde_json::from_str(&on_disk).unwrap();
    assert!(entries.get(keys::SESSION).is_some());
    assert!(entries.get(keys::USERS).is_some());

    let restarted = AppState::from_config(config()).unwrap();
    assert_eq!(restarted.auth().session(), Some(session));
}

#[test]
fn test_corrupt_storage_file_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(FileStore::FILE_NAME), "not an object").unwrap();

    let mut config = test_config();
    config.data_dir = dir.path().to_path_buf();

    let err = AppState::from_config(config).unwrap_err();
    assert!(matches!(err, AppError::Auth(_)), "{err}");
    assert!(!err.is_rejection());
}

#[test]
fn test_handle_outlives_state() {
    let state = open_state(Arc::new(MemoryStore::new()));
    let handle = state.handle();
    drop(state);

    assert!(matches!(
        handle.with_auth(|auth| auth.is_authenticated()),
        Err(AppError::NotInitialized("AuthStore"))
    ));
}

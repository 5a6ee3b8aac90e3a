//! Corner Shop storefront library.
//!
//! The state core of a small shop: a read-only product catalog, an
//! in-memory cart, and an auth store whose session and user directory live
//! in a key-value persistence collaborator.
//!
//! Stores expose operations, readable state and subscriptions. Rendering is
//! left to the caller (see the `shop` CLI).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod state;
pub mod storage;

pub use error::AppError;
pub use state::{AppState, StateHandle};

//! Client-side stores for the storefront.
//!
//! # Services
//!
//! - `cart` - Shopping cart lines and totals
//! - `auth` - Signup, login and the persisted session

pub mod auth;
pub mod cart;

pub use auth::{AuthError, AuthEvent, AuthState, AuthStore};
pub use cart::{CartEvent, CartStore};

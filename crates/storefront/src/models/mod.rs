//! Domain models for the storefront.
//!
//! # Models
//!
//! - [`product`] - Catalog products and the snapshot the cart consumes
//! - [`cart`] - Cart lines and the derived summary
//! - [`user`] - User directory records and their credential
//! - [`session`] - The public identity of the signed-in user

pub mod cart;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{CartLine, CartSummary};
pub use product::{CartItem, Product};
pub use session::Session;
pub use user::{Credential, UserRecord};

//! Catalog product types.

use serde::{Deserialize, Serialize};

use corner_shop_core::{Price, ProductId};

/// A product in the static catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: String,
    pub image: String,
    pub category: String,
    pub in_stock: bool,
    /// Average review score, 0.0 to 5.0.
    pub rating: f64,
}

impl Product {
    /// The fields the cart snapshots when this product is added.
    #[must_use]
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }
}

/// The product fields a cart line is created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        product.to_cart_item()
    }
}

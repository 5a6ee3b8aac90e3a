//! Cart line and summary types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use corner_shop_core::{Price, ProductId};

use super::CartItem;

/// One product's accumulated quantity within a cart.
///
/// Name, price and image are a snapshot taken when the product was first
/// added; later catalog changes do not reach existing lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    /// Always at least 1.
    pub quantity: u32,
    pub image: String,
}

impl CartLine {
    /// A new line for `item` with quantity 1.
    #[must_use]
    pub fn new(item: CartItem) -> Self {
        Self {
            product_id: item.id,
            name: item.name,
            price: item.price,
            quantity: 1,
            image: item.image,
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Order summary shown next to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Sum of line totals, rounded to cents.
    pub subtotal: Price,
    /// `subtotal × tax_rate`, rounded to cents.
    pub tax: Price,
    /// `subtotal + tax`.
    pub total: Price,
    /// The rate the tax was computed with.
    pub tax_rate: Decimal,
    /// Sum of quantities.
    pub item_count: u64,
}

impl CartSummary {
    /// Build a summary from exact totals.
    #[must_use]
    pub fn new(subtotal: Price, item_count: u64, tax_rate: Decimal) -> Self {
        let tax = subtotal.scaled(tax_rate).round_cents();
        let subtotal = subtotal.round_cents();
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
            tax_rate,
            item_count,
        }
    }

    /// Tax rate as a whole-number percentage label (e.g. `8%`).
    #[must_use]
    pub fn tax_label(&self) -> String {
        format!("{}%", (self.tax_rate * Decimal::ONE_HUNDRED).normalize())
    }
}

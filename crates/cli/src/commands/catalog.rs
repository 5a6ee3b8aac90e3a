//! Product browsing commands.
//!
//! # Usage
//!
//! ```bash
//! shop products --category Electronics --sort price-low
//! shop product prod_001
//! shop categories
//! ```

use corner_shop_core::ProductId;
use corner_shop_storefront::AppState;
use corner_shop_storefront::catalog::{CategoryFilter, SortOrder};
use corner_shop_storefront::models::Product;

use super::{CliError, print, print_line};
use crate::output;

/// List products.
pub fn list(state: &AppState, filter: &CategoryFilter, sort: SortOrder) {
    let products = state.catalog().browse(filter, sort);
    print(&output::product_table(&products));
}

/// List categories in catalog order.
pub fn categories(state: &AppState) {
    for category in state.catalog().categories() {
        print_line(category);
    }
}

/// Show one product.
///
/// # Errors
///
/// Returns `CliError::UnknownProduct` if the ID is not in the catalog.
pub fn show(state: &AppState, id: &ProductId) -> Result<(), CliError> {
    let product = find(state, id)?;
    print(&output::product_detail(product));
    Ok(())
}

/// Look up a product for display or purchase.
///
/// # Errors
///
/// Returns `CliError::UnknownProduct` if the ID is not in the catalog.
pub fn find<'s>(state: &'s AppState, id: &ProductId) -> Result<&'s Product, CliError> {
    state
        .catalog()
        .get(id)
        .ok_or_else(|| CliError::UnknownProduct(id.clone()))
}

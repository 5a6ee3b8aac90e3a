//! Plain-text rendering of storefront state.

use std::fmt::Write as _;

use corner_shop_storefront::models::{CartLine, CartSummary, Product, Session};
use corner_shop_storefront::notify::{Notification, Severity};

/// One row per product.
#[must_use]
pub fn product_table(products: &[&Product]) -> String {
    if products.is_empty() {
        return "No products found\n".to_owned();
    }

    let mut out = String::new();
    for product in products {
        let _ = write!(
            out,
            "{:<10} {:<22} {:>9}  {:.1}*  {}",
            product.id.as_str(),
            product.name,
            product.price.to_string(),
            product.rating,
            product.category
        );
        if !product.in_stock {
            out.push_str("  (out of stock)");
        }
        out.push('\n');
    }
    out
}

#[must_use]
pub fn product_detail(product: &Product) -> String {
    let stock = if product.in_stock {
        "In Stock"
    } else {
        "Out of Stock"
    };
    format!(
        "{name}\n{price}  {rating:.1}*  {category}\n{stock}\n\n{description}\n",
        name = product.name,
        price = product.price,
        rating = product.rating,
        category = product.category,
        description = product.description,
    )
}

/// Cart lines followed by the order summary.
#[must_use]
pub fn cart(lines: &[CartLine], summary: &CartSummary) -> String {
    if lines.is_empty() {
        return "Your cart is empty\n".to_owned();
    }

    let mut out = String::new();
    for line in lines {
        let _ = writeln!(
            out,
            "{:<10} {:<22} {:>3} x {:>9} = {:>9}",
            line.product_id.as_str(),
            line.name,
            line.quantity,
            line.price.to_string(),
            line.line_total().to_string()
        );
    }
    let _ = writeln!(out, "{:>38}", "--------------------");
    let _ = writeln!(out, "Items: {}", summary.item_count);
    let _ = writeln!(out, "Subtotal: {}", summary.subtotal);
    let _ = writeln!(out, "Tax ({}): {}", summary.tax_label(), summary.tax);
    let _ = writeln!(out, "Total: {}", summary.total);
    out
}

#[must_use]
pub fn session(session: Option<&Session>) -> String {
    session.map_or_else(
        || "Not logged in\n".to_owned(),
        |s| format!("{} <{}> ({})\n", s.name, s.email, s.user_id),
    )
}

/// A toast line, e.g. `[+] Yoga Mat added to cart`.
#[must_use]
pub fn toast(notification: &Notification) -> String {
    let marker = match notification.severity {
        Severity::Success => "+",
        Severity::Info => "i",
        Severity::Error => "!",
    };
    format!("[{marker}] {}", notification.message)
}

//! Cart store.
//!
//! Owns the ordered list of [`CartLine`]s for the session and the totals
//! derived from it. The cart lives in memory only.
//!
//! Invariants held after every operation:
//! - at most one line per product ID
//! - every quantity is at least 1
//! - totals are recomputed from the lines on each read

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use tracing::instrument;

use corner_shop_core::{Price, ProductId};

use crate::error::add_breadcrumb;
use crate::models::{CartItem, CartLine, CartSummary};
use crate::notify::{Notification, Observers, SubscriptionId};

/// A change to the cart, published after it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A new line was appended.
    Added { product_id: ProductId, name: String },
    /// An existing line's quantity went up by one through `add_item`.
    Incremented {
        product_id: ProductId,
        name: String,
        quantity: u32,
    },
    /// A line's quantity was replaced through `set_quantity`.
    QuantityChanged {
        product_id: ProductId,
        name: String,
        quantity: u32,
    },
    /// A line was removed.
    Removed { product_id: ProductId, name: String },
    /// The cart was emptied.
    Cleared,
}

impl CartEvent {
    /// The toast to show for this change, if any.
    #[must_use]
    pub fn notification(&self) -> Option<Notification> {
        match self {
            Self::Added { name, .. } => Some(Notification::success(format!("{name} added to cart"))),
            Self::Incremented { name, quantity, .. } => Some(Notification::success(format!(
                "{name} quantity updated to {quantity}"
            ))),
            Self::Removed { name, .. } => {
                Some(Notification::info(format!("{name} removed from cart")))
            }
            Self::QuantityChanged { .. } | Self::Cleared => None,
        }
    }

    const fn action(&self) -> &'static str {
        match self {
            Self::Added { .. } => "added",
            Self::Incremented { .. } => "incremented",
            Self::QuantityChanged { .. } => "quantity_changed",
            Self::Removed { .. } => "removed",
            Self::Cleared => "cleared",
        }
    }
}

/// The session's shopping cart.
#[derive(Debug, Default)]
pub struct CartStore {
    lines: RwLock<Vec<CartLine>>,
    observers: Observers<CartEvent>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `item`.
    ///
    /// Increments the existing line for the same product, otherwise appends a
    /// new line with quantity 1 that snapshots the item's name, price and image.
    #[instrument(skip_all)]
    pub fn add_item(&self, item: impl Into<CartItem>) {
        let item = item.into();
        let event = {
            let mut lines = self.write();
            if let Some(line) = lines.iter_mut().find(|l| l.product_id == item.id) {
                line.quantity = line.quantity.saturating_add(1);
                CartEvent::Incremented {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                }
            } else {
                let line = CartLine::new(item);
                let event = CartEvent::Added {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                };
                lines.push(line);
                event
            }
        };
        self.publish(&event);
    }

    /// Remove the line for `product_id`. Does nothing if there is none.
    #[instrument(skip(self))]
    pub fn remove_item(&self, product_id: &ProductId) {
        let removed = {
            let mut lines = self.write();
            lines
                .iter()
                .position(|l| &l.product_id == product_id)
                .map(|index| lines.remove(index))
        };

        if let Some(line) = removed {
            self.publish(&CartEvent::Removed {
                product_id: line.product_id,
                name: line.name,
            });
        }
    }

    /// Replace the quantity of the line for `product_id`.
    ///
    /// A quantity of zero or less removes the line exactly like
    /// [`remove_item`](Self::remove_item). Unknown products are ignored.
    #[instrument(skip(self))]
    pub fn set_quantity(&self, product_id: &ProductId, quantity: i64) {
        let Ok(quantity) = u32::try_from(quantity.clamp(0, i64::from(u32::MAX))) else {
            return;
        };
        if quantity == 0 {
            self.remove_item(product_id);
            return;
        }

        let event = {
            let mut lines = self.write();
            let Some(line) = lines.iter_mut().find(|l| &l.product_id == product_id) else {
                return;
            };
            if line.quantity == quantity {
                return;
            }
            line.quantity = quantity;
            CartEvent::QuantityChanged {
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                quantity,
            }
        };
        self.publish(&event);
    }

    /// Raise the quantity of an existing line by one.
    pub fn increment(&self, product_id: &ProductId) {
        if let Some(line) = self.line(product_id) {
            self.set_quantity(product_id, i64::from(line.quantity) + 1);
        }
    }

    /// Lower the quantity of an existing line by one, removing it at zero.
    pub fn decrement(&self, product_id: &ProductId) {
        if let Some(line) = self.line(product_id) {
            self.set_quantity(product_id, i64::from(line.quantity) - 1);
        }
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let had_lines = {
            let mut lines = self.write();
            let had_lines = !lines.is_empty();
            lines.clear();
            had_lines
        };

        if had_lines {
            self.publish(&CartEvent::Cleared);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Snapshot of the lines in display order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.read().clone()
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<CartLine> {
        self.read()
            .iter()
            .find(|l| &l.product_id == product_id)
            .cloned()
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.read().iter().any(|l| &l.product_id == product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Σ price × quantity; zero for an empty cart.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.read().iter().map(CartLine::line_total).sum()
    }

    /// Σ quantity; zero for an empty cart.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.read().iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Subtotal, tax and total at `tax_rate`.
    #[must_use]
    pub fn summary(&self, tax_rate: Decimal) -> CartSummary {
        let lines = self.read();
        let subtotal = lines.iter().map(CartLine::line_total).sum();
        let item_count = lines.iter().map(|l| u64::from(l.quantity)).sum();
        CartSummary::new(subtotal, item_count, tax_rate)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Observe every cart change. Observers run in registration order.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&CartEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn publish(&self, event: &CartEvent) {
        tracing::debug!(
            action = event.action(),
            lines = self.len(),
            items = self.total_item_count(),
            "cart changed"
        );
        add_breadcrumb("cart", event.action(), None);
        self.observers.publish(event);
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<CartLine>> {
        self.lines.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<CartLine>> {
        self.lines.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::notify::Severity;

    fn item(id: &str, price: &str) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: price.parse().unwrap(),
            image: format!("https://img.example/{id}.jpg"),
        }
    }

    fn recorder(cart: &CartStore) -> Arc<Mutex<Vec<CartEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        cart.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = CartStore::new();
        assert!(cart.is_empty());
        assert!(cart.total_price().is_zero());
        assert_eq!(cart.total_item_count(), 0);
    }

    #[test]
    fn test_add_same_product_twice_increments() {
        let cart = CartStore::new();
        cart.add_item(item("prod_001", "79.99"));
        cart.add_item(item("prod_001", "79.99"));

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(cart.total_item_count(), 2);
        assert_eq!(cart.total_price(), "159.98".parse().unwrap());
    }

    #[test]
    fn test_insertion_order_is_display_order() {
        let cart = CartStore::new();
        cart.add_item(item("b", "1"));
        cart.add_item(item("a", "1"));
        cart.add_item(item("b", "1"));

        let ids: Vec<_> = cart.lines().into_iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![ProductId::new("b"), ProductId::new("a")]);
    }

    #[test]
    fn test_snapshot_ignores_later_price_changes() {
        let cart = CartStore::new();
        cart.add_item(item("prod_001", "10.00"));
        cart.add_item(item("prod_001", "99.00"));

        let line = cart.line(&ProductId::new("prod_001")).unwrap();
        assert_eq!(line.price, "10.00".parse().unwrap());
        assert_eq!(cart.total_price(), "20.00".parse().unwrap());
    }

    #[test]
    fn test_set_quantity_replaces() {
        let cart = CartStore::new();
        let id = ProductId::new("prod_002");
        cart.add_item(item("prod_002", "5"));
        cart.set_quantity(&id, 4);
        assert_eq!(cart.line(&id).unwrap().quantity, 4);
        assert_eq!(cart.total_price(), "20".parse().unwrap());
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        for quantity in [0, -1, i64::MIN] {
            let cart = CartStore::new();
            let id = ProductId::new("prod_003");
            cart.add_item(item("prod_003", "5"));
            cart.add_item(item("prod_004", "5"));

            cart.set_quantity(&id, quantity);
            assert!(!cart.contains(&id), "quantity {quantity} should remove");
            assert_eq!(cart.len(), 1);
        }
    }

    #[test]
    fn test_set_quantity_unknown_is_noop() {
        let cart = CartStore::new();
        let events = recorder(&cart);
        cart.set_quantity(&ProductId::new("missing"), 3);
        assert!(cart.is_empty());
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_remove_missing_is_silent() {
        let cart = CartStore::new();
        cart.add_item(item("prod_001", "1"));
        let events = recorder(&cart);

        cart.remove_item(&ProductId::new("prod_999"));
        assert_eq!(cart.len(), 1);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_increment_and_decrement() {
        let cart = CartStore::new();
        let id = ProductId::new("prod_005");
        cart.add_item(item("prod_005", "2.50"));

        cart.increment(&id);
        assert_eq!(cart.line(&id).unwrap().quantity, 2);

        cart.decrement(&id);
        cart.decrement(&id);
        assert!(!cart.contains(&id));

        cart.increment(&id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let cart = CartStore::new();
        cart.add_item(item("a", "1"));
        cart.add_item(item("b", "2"));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_item_count(), 0);
    }

    #[test]
    fn test_events_and_notifications() {
        let cart = CartStore::new();
        let events = recorder(&cart);
        let id = ProductId::new("prod_001");

        cart.add_item(item("prod_001", "1"));
        cart.add_item(item("prod_001", "1"));
        cart.set_quantity(&id, 5);
        cart.remove_item(&id);
        cart.add_item(item("prod_001", "1"));
        cart.clear();
        cart.clear();

        let events = events.lock().unwrap();
        let actions: Vec<_> = events.iter().map(CartEvent::action).collect();
        assert_eq!(
            actions,
            vec!["added", "incremented", "quantity_changed", "removed", "added", "cleared"]
        );

        let added = events[0].notification().unwrap();
        assert_eq!(added.severity, Severity::Success);
        assert_eq!(added.message, "Product prod_001 added to cart");

        let removed = events[3].notification().unwrap();
        assert_eq!(removed.severity, Severity::Info);
        assert!(events[2].notification().is_none());
    }

    #[test]
    fn test_observer_can_read_cart() {
        let cart = Arc::new(CartStore::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let reader = Arc::clone(&cart);
        let sink = Arc::clone(&seen);
        cart.subscribe(move |_| sink.lock().unwrap().push(reader.total_item_count()));

        cart.add_item(item("a", "1"));
        cart.add_item(item("a", "1"));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_summary() {
        let cart = CartStore::new();
        cart.add_item(item("prod_001", "79.99"));
        cart.add_item(item("prod_003", "89.99"));

        let summary = cart.summary(Decimal::new(8, 2));
        assert_eq!(summary.subtotal.to_string(), "$169.98");
        assert_eq!(summary.tax.to_string(), "$13.60");
        assert_eq!(summary.total.to_string(), "$183.58");
        assert_eq!(summary.item_count, 2);
    }
}

//! Shopping cart state and handlers.
//!
//! The cart is an insertion-ordered list keyed by product name. Every
//! mutation is persisted immediately and the count badge is re-rendered.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{CurrencyCode, Price, PriceError, format_amount};
use tracing::instrument;

use crate::controller::Storefront;
use crate::notifications::Severity;
use crate::page::{AddButtonState, Page};
use crate::product::Product;
use crate::scheduler::Deferred;
use crate::storage::KeyValueStore;

/// Parse a cart unit price.
///
/// Totals are shown in dollars, so prices in other currencies are rejected.
///
/// # Errors
///
/// Returns an error if the price does not parse or is not in USD.
pub fn unit_price(raw: &str) -> Result<Decimal, PriceError> {
    let price = Price::parse(raw)?;
    if price.currency_code != CurrencyCode::USD {
        return Err(PriceError::UnsupportedCurrency(price.currency_code));
    }
    Ok(price.amount)
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub name: String,
    /// Display-formatted unit price, e.g. `"$19.99"`.
    pub price: String,
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price × quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored price is not a USD amount or the
    /// product overflows.
    pub fn line_total(&self) -> Result<Decimal, PriceError> {
        unit_price(&self.price)?
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(PriceError::Overflow)
    }
}

/// Cart contents.
///
/// Invariants: names are unique and every quantity is at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from persisted items, restoring the invariants.
    ///
    /// Items with quantity 0 are dropped. Duplicate names are merged into the
    /// first occurrence with their quantities summed.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for item in items {
            if item.quantity == 0 {
                tracing::debug!(product = %item.name, "Dropping persisted cart item with zero quantity");
                continue;
            }
            match positions.get(&item.name) {
                Some(&index) => {
                    if let Some(existing) = cart.items.get_mut(index) {
                        existing.quantity = existing.quantity.saturating_add(item.quantity);
                    }
                }
                None => {
                    positions.insert(item.name.clone(), cart.items.len());
                    cart.items.push(item);
                }
            }
        }

        cart
    }

    /// Add one unit of `product`. Returns the item's new quantity.
    pub fn add(&mut self, product: &Product) -> u32 {
        if let Some(item) = self.items.iter_mut().find(|i| i.name == product.name) {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }

        self.items.push(CartItem {
            name: product.name.clone(),
            price: product.price.clone(),
            image: product.image.clone(),
            quantity: 1,
        });
        1
    }

    /// Remove the item named `name`, if present.
    pub fn remove(&mut self, name: &str) -> Option<CartItem> {
        let index = self.items.iter().position(|i| i.name == name)?;
        Some(self.items.remove(index))
    }

    /// Remove everything. Returns the number of lines removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }

    /// Sum of price × quantity across all lines.
    ///
    /// # Errors
    ///
    /// Returns the first line that cannot be totalled, or
    /// `PriceError::Overflow` if the sum does not fit.
    pub fn total(&self) -> Result<Decimal, PriceError> {
        self.items.iter().try_fold(Decimal::ZERO, |sum, item| {
            sum.checked_add(item.line_total()?)
                .ok_or(PriceError::Overflow)
        })
    }

    /// Check that one more unit of `product` can be added and still totalled.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is not a USD amount, or if the line or
    /// cart total would overflow.
    pub fn check_add(&self, product: &Product) -> Result<(), PriceError> {
        let amount = unit_price(&product.price)?;
        let quantity = self
            .get(&product.name)
            .map_or(0, |item| item.quantity)
            .saturating_add(1);
        amount
            .checked_mul(Decimal::from(quantity))
            .ok_or(PriceError::Overflow)?;
        // A total that is already unavailable cannot overflow further
        if let Ok(total) = self.total() {
            total.checked_add(amount).ok_or(PriceError::Overflow)?;
        }
        Ok(())
    }

    /// [`Cart::total`] formatted with two decimals, e.g. `"25.50"`.
    ///
    /// # Errors
    ///
    /// Returns the first price parse failure.
    pub fn formatted_total(&self) -> Result<String, PriceError> {
        self.total().map(format_amount)
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.name == name)
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Handlers
// =============================================================================

impl<S: KeyValueStore, P: Page> Storefront<S, P> {
    /// Add one unit of `product` to the cart.
    ///
    /// A product whose price cannot be totalled is rejected with a warning.
    #[instrument(skip(self, product), fields(product = %product.name))]
    pub fn add_to_cart(&mut self, product: &Product) {
        if let Err(e) = self.cart.check_add(product) {
            tracing::warn!(price = %product.price, error = %e, "Rejecting product with invalid price");
            self.notify(
                format!("{} has an invalid price.", product.name),
                Severity::Warning,
            );
            return;
        }

        let quantity = self.cart.add(product);
        tracing::info!(quantity, "Added to cart");
        self.persist_cart();
        self.render_cart_count();
        self.notify(format!("{} added to cart!", product.name), Severity::Success);
        self.acknowledge_add(&product.name);
    }

    /// Remove a product from the cart. Absent names are a silent no-op.
    #[instrument(skip(self))]
    pub fn remove_from_cart(&mut self, name: &str) {
        if self.cart.remove(name).is_none() {
            tracing::debug!("Product not in cart, nothing to remove");
            return;
        }

        tracing::info!("Removed from cart");
        self.persist_cart();
        self.render_cart_count();
        self.notify(format!("{name} removed from cart!"), Severity::Success);
    }

    /// Empty the cart and close the cart overlay.
    #[instrument(skip(self))]
    pub fn clear_cart(&mut self) {
        let removed = self.cart.clear();
        tracing::info!(removed, "Cart cleared");
        self.persist_cart();
        self.render_cart_count();
        self.notify("Cart cleared!", Severity::Success);
        self.close_cart_modal();
    }

    /// Cart total formatted with two decimals.
    ///
    /// # Errors
    ///
    /// Returns an error if a persisted price does not parse.
    pub fn cart_total(&self) -> Result<String, PriceError> {
        self.cart.formatted_total()
    }

    /// Sum of quantities in the cart.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    pub(crate) fn render_cart_count(&mut self) {
        let count = self.cart.item_count();
        self.page.set_cart_count(count);
    }

    pub(crate) fn on_reset_add_button(&mut self, name: &str) {
        self.add_button_resets.remove(name);
        if !self.page.set_add_button(name, AddButtonState::Default) {
            tracing::debug!(product = name, "Add button gone, skipping reset");
        }
    }

    fn persist_cart(&mut self) {
        if let Err(e) = self.store.save_cart(self.cart.items()) {
            self.report_error("persist cart", e.into());
        }
    }

    /// Flash the add button, restarting the window on repeat clicks.
    fn acknowledge_add(&mut self, name: &str) {
        if let Some(previous) = self.add_button_resets.remove(name) {
            previous.cancel();
        }
        self.page.set_add_button(name, AddButtonState::Added);

        let token = self.scheduler.child_token();
        self.scheduler.schedule(
            self.config.add_acknowledgment,
            token.clone(),
            Deferred::ResetAddButton(name.to_string()),
        );
        self.add_button_resets.insert(name.to_string(), token);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::page::{ProductCard, VirtualPage};
    use crate::storage::{MemoryStore, StateStore};

    fn product(name: &str, price: &str) -> Product {
        Product::new(name, price, format!("/img/{name}.jpg"))
    }

    const MAX_PRICE: &str = "$79228162514264337593543950335";

    fn item(name: &str, price: &str, quantity: u32) -> CartItem {
        CartItem {
            name: name.to_string(),
            price: price.to_string(),
            image: format!("/img/{name}.jpg"),
            quantity,
        }
    }

    fn storefront() -> Storefront<MemoryStore, VirtualPage> {
        let page = VirtualPage::with_products([
            ProductCard::new("A", "$10.00", "/img/A.jpg"),
            ProductCard::new("B", "$5.50", "/img/B.jpg"),
        ]);
        Storefront::init(StorefrontConfig::default(), MemoryStore::default(), page)
    }

    fn persisted(storefront: Storefront<MemoryStore, VirtualPage>) -> Vec<CartItem> {
        let (store, _page) = storefront.shutdown();
        StateStore::new(store).load_cart()
    }

    #[test]
    fn test_add_same_product_twice_increments_quantity() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(&product("A", "$10.00")), 1);
        assert_eq!(cart.add(&product("A", "$10.00")), 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("A").unwrap().quantity, 2);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut cart = Cart::new();
        cart.add(&product("A", "$10.00"));
        cart.add(&product("A", "$10.00"));
        cart.add(&product("B", "$5.50"));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_total_two_decimals() {
        let cart = Cart::from_items(vec![item("A", "$10.00", 2), item("B", "$5.50", 1)]);
        assert_eq!(cart.formatted_total().unwrap(), "25.50");
        assert_eq!(Cart::new().formatted_total().unwrap(), "0.00");
    }

    #[test]
    fn test_total_reports_malformed_price() {
        let cart = Cart::from_items(vec![item("A", "$10.00", 1), item("B", "call us", 1)]);
        assert!(matches!(cart.total(), Err(PriceError::NotANumber(_))));
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let cart = Cart::from_items(vec![item("Yacht", MAX_PRICE, 2)]);
        assert_eq!(cart.total(), Err(PriceError::Overflow));

        let cart = Cart::from_items(vec![item("Yacht", MAX_PRICE, 1), item("Jet", MAX_PRICE, 1)]);
        assert_eq!(cart.formatted_total(), Err(PriceError::Overflow));
    }

    #[test]
    fn test_total_rejects_other_currencies() {
        let cart = Cart::from_items(vec![item("A", "€10.00", 1), item("B", "$5.00", 1)]);
        assert_eq!(
            cart.total(),
            Err(PriceError::UnsupportedCurrency(CurrencyCode::EUR))
        );
        assert!(unit_price("£3.20").is_err());
        assert_eq!(unit_price("$1,299.00").unwrap(), Decimal::new(129_900, 2));
    }

    #[test]
    fn test_remove_absent_leaves_cart_unchanged() {
        let mut cart = Cart::from_items(vec![item("A", "$10.00", 2)]);
        let before = cart.clone();
        assert!(cart.remove("Z").is_none());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new();
        cart.add(&product("B", "$1.00"));
        cart.add(&product("A", "$1.00"));
        cart.add(&product("B", "$1.00"));
        let names: Vec<_> = cart.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_from_items_restores_invariants() {
        let cart = Cart::from_items(vec![
            item("A", "$1.00", 1),
            item("Z", "$1.00", 0),
            item("B", "$1.00", 2),
            item("A", "$1.00", 3),
        ]);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get("A").unwrap().quantity, 4);
        assert!(cart.get("Z").is_none());
        assert_eq!(cart.items().first().unwrap().name, "A");
    }

    #[test]
    fn test_add_to_cart_persists_and_updates_page() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("A", "$10.00"));

        let page = storefront.page();
        assert_eq!(page.cart_count(), "1");
        assert_eq!(page.last_notification().unwrap().message, "A added to cart!");
        assert_eq!(page.last_notification().unwrap().severity, Severity::Success);
        assert_eq!(page.card("A").unwrap().add_button, AddButtonState::Added);

        assert_eq!(persisted(storefront), vec![item("A", "$10.00", 1)]);
    }

    #[test]
    fn test_add_to_cart_rejects_invalid_price() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("A", "free!"));

        assert!(storefront.cart().is_empty());
        let last = storefront.page().last_notification().unwrap();
        assert_eq!(last.message, "A has an invalid price.");
        assert_eq!(last.severity, Severity::Warning);
    }

    #[test]
    fn test_add_to_cart_rejects_overflowing_quantity() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("Yacht", MAX_PRICE));
        storefront.add_to_cart(&product("Yacht", MAX_PRICE));

        assert_eq!(storefront.cart().get("Yacht").unwrap().quantity, 1);
        let last = storefront.page().last_notification().unwrap();
        assert_eq!(last.message, "Yacht has an invalid price.");
        assert_eq!(last.severity, Severity::Warning);

        storefront.show_cart();
        let modal = storefront.page().modal().unwrap();
        assert!(modal.view.total.is_some());
    }

    #[test]
    fn test_add_to_cart_rejects_overflowing_total() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("Yacht", MAX_PRICE));
        storefront.add_to_cart(&product("A", "$10.00"));

        assert!(storefront.cart().get("A").is_none());
        assert!(storefront.cart_total().is_ok());
    }

    #[test]
    fn test_add_to_cart_rejects_non_dollar_price() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("A", "$5.00"));
        storefront.add_to_cart(&product("B", "€10.00"));

        assert!(storefront.cart().get("B").is_none());
        assert_eq!(storefront.cart_total().unwrap(), "5.00");
        assert_eq!(
            storefront.page().last_notification().unwrap().message,
            "B has an invalid price."
        );
    }

    #[test]
    fn test_remove_from_cart() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("A", "$10.00"));
        storefront.add_to_cart(&product("B", "$5.50"));
        storefront.remove_from_cart("A");

        assert_eq!(storefront.page().cart_count(), "1");
        assert_eq!(
            storefront.page().last_notification().unwrap().message,
            "A removed from cart!"
        );
        assert_eq!(persisted(storefront), vec![item("B", "$5.50", 1)]);
    }

    #[test]
    fn test_remove_absent_is_silent() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("A", "$10.00"));
        let notifications = storefront.page().notifications().len();

        storefront.remove_from_cart("Z");
        assert_eq!(storefront.page().notifications().len(), notifications);
        assert_eq!(storefront.cart().len(), 1);
    }

    #[test]
    fn test_clear_cart() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("A", "$10.00"));
        storefront.add_to_cart(&product("B", "$5.50"));
        storefront.clear_cart();

        assert_eq!(storefront.item_count(), 0);
        assert_eq!(storefront.page().cart_count(), "0");
        assert_eq!(
            storefront.page().last_notification().unwrap().message,
            "Cart cleared!"
        );
        assert!(persisted(storefront).is_empty());
    }

    #[test]
    fn test_cart_total_through_controller() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("A", "$10.00"));
        storefront.add_to_cart(&product("A", "$10.00"));
        storefront.add_to_cart(&product("B", "$5.50"));
        assert_eq!(storefront.cart_total().unwrap(), "25.50");
        assert_eq!(storefront.item_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_button_reverts_after_acknowledgment() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("A", "$10.00"));

        tokio::time::advance(Duration::from_millis(1999)).await;
        storefront.fire_due_timers();
        assert_eq!(
            storefront.page().card("A").unwrap().add_button,
            AddButtonState::Added
        );

        tokio::time::advance(Duration::from_millis(1)).await;
        storefront.fire_due_timers();
        assert_eq!(
            storefront.page().card("A").unwrap().add_button,
            AddButtonState::Default
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_add_restarts_acknowledgment() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("A", "$10.00"));
        tokio::time::advance(Duration::from_millis(1500)).await;
        storefront.add_to_cart(&product("A", "$10.00"));

        tokio::time::advance(Duration::from_millis(1000)).await;
        storefront.fire_due_timers();
        assert_eq!(
            storefront.page().card("A").unwrap().add_button,
            AddButtonState::Added
        );

        tokio::time::advance(Duration::from_millis(1000)).await;
        storefront.fire_due_timers();
        assert_eq!(
            storefront.page().card("A").unwrap().add_button,
            AddButtonState::Default
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_button_reset_tolerates_removed_card() {
        let mut storefront = storefront();
        storefront.add_to_cart(&product("A", "$10.00"));
        storefront.page_mut().remove_card("A");

        tokio::time::advance(Duration::from_secs(3)).await;
        storefront.fire_due_timers();
        assert!(storefront.page().card("A").is_none());
        assert_eq!(storefront.cart().get("A").unwrap().quantity, 1);
    }
}

//! Wishlist state and handlers.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::controller::Storefront;
use crate::notifications::Severity;
use crate::page::Page;
use crate::product::Product;
use crate::storage::KeyValueStore;

/// A wishlisted product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub name: String,
    pub price: String,
    pub image: String,
}

impl From<&Product> for WishlistItem {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.clone(),
            image: product.image.clone(),
        }
    }
}

/// Result of a wishlist toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Insertion-ordered wishlist with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a wishlist from persisted items, keeping the first of any
    /// duplicate names.
    #[must_use]
    pub fn from_items(items: Vec<WishlistItem>) -> Self {
        let mut wishlist = Self::new();
        for item in items {
            if !wishlist.contains(&item.name) {
                wishlist.items.push(item);
            }
        }
        wishlist
    }

    /// Remove `product` if present, otherwise append it.
    pub fn toggle(&mut self, product: &Product) -> Toggled {
        if let Some(index) = self.items.iter().position(|i| i.name == product.name) {
            self.items.remove(index);
            Toggled::Removed
        } else {
            self.items.push(WishlistItem::from(product));
            Toggled::Added
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|i| i.name == name)
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
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

impl<S: KeyValueStore, P: Page> Storefront<S, P> {
    /// Toggle wishlist membership for `product`.
    #[instrument(skip(self, product), fields(product = %product.name))]
    pub fn toggle_wishlist(&mut self, product: &Product) -> Toggled {
        let toggled = self.wishlist.toggle(product);
        let wishlisted = toggled == Toggled::Added;
        self.page.set_wishlist_button(&product.name, wishlisted);

        match toggled {
            Toggled::Added => {
                tracing::info!("Added to wishlist");
                self.notify(
                    format!("{} added to wishlist!", product.name),
                    Severity::Success,
                );
            }
            Toggled::Removed => {
                tracing::info!("Removed from wishlist");
                self.notify(
                    format!("{} removed from wishlist!", product.name),
                    Severity::Info,
                );
            }
        }

        if let Err(e) = self.store.save_wishlist(self.wishlist.items()) {
            self.report_error("persist wishlist", e.into());
        }
        toggled
    }

    /// Mark every wishlist button whose product is wishlisted.
    ///
    /// Buttons for other products are left as they are.
    pub fn sync_wishlist_buttons(&mut self) {
        let mut marked = 0usize;
        for name in self.page.wishlist_buttons() {
            if self.wishlist.contains(&name) {
                self.page.set_wishlist_button(&name, true);
                marked += 1;
            }
        }
        tracing::debug!(marked, "Synced wishlist buttons");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use crate::page::{ProductCard, VirtualPage};
    use crate::storage::{MemoryStore, StateStore};

    fn product(name: &str) -> Product {
        Product::new(name, "$12.00", format!("/img/{name}.jpg"))
    }

    fn page() -> VirtualPage {
        VirtualPage::with_products([
            ProductCard::new("A", "$12.00", "/img/A.jpg"),
            ProductCard::new("B", "$12.00", "/img/B.jpg"),
        ])
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut wishlist = Wishlist::new();
        assert_eq!(wishlist.toggle(&product("A")), Toggled::Added);
        assert!(wishlist.contains("A"));
        assert_eq!(wishlist.toggle(&product("A")), Toggled::Removed);
        assert!(!wishlist.contains("A"));

        let mut wishlist = Wishlist::from_items(vec![WishlistItem::from(&product("A"))]);
        wishlist.toggle(&product("A"));
        wishlist.toggle(&product("A"));
        assert!(wishlist.contains("A"));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_from_items_drops_duplicates() {
        let wishlist = Wishlist::from_items(vec![
            WishlistItem::from(&product("A")),
            WishlistItem::from(&product("B")),
            WishlistItem::from(&product("A")),
        ]);
        assert_eq!(wishlist.len(), 2);
    }

    #[test]
    fn test_toggle_wishlist_updates_button_and_notifies() {
        let mut storefront =
            Storefront::init(StorefrontConfig::default(), MemoryStore::default(), page());

        storefront.toggle_wishlist(&product("A"));
        assert!(storefront.page().card("A").unwrap().wishlisted);
        let last = storefront.page().last_notification().unwrap();
        assert_eq!(last.message, "A added to wishlist!");
        assert_eq!(last.severity, Severity::Success);

        storefront.toggle_wishlist(&product("A"));
        assert!(!storefront.page().card("A").unwrap().wishlisted);
        let last = storefront.page().last_notification().unwrap();
        assert_eq!(last.message, "A removed from wishlist!");
        assert_eq!(last.severity, Severity::Info);
    }

    #[test]
    fn test_toggle_wishlist_persists() {
        let mut storefront =
            Storefront::init(StorefrontConfig::default(), MemoryStore::default(), page());
        storefront.toggle_wishlist(&product("B"));

        let (store, _page) = storefront.shutdown();
        let saved = StateStore::new(store).load_wishlist();
        assert_eq!(saved, vec![WishlistItem::from(&product("B"))]);
    }

    #[test]
    fn test_sync_marks_persisted_items_on_init() {
        let mut store = StateStore::new(MemoryStore::default());
        store
            .save_wishlist(&[WishlistItem::from(&product("B"))])
            .unwrap();

        let mut storefront =
            Storefront::init(StorefrontConfig::default(), store.into_inner(), page());
        assert!(!storefront.page().card("A").unwrap().wishlisted);
        assert!(storefront.page().card("B").unwrap().wishlisted);

        // Idempotent
        storefront.sync_wishlist_buttons();
        storefront.sync_wishlist_buttons();
        assert!(!storefront.page().card("A").unwrap().wishlisted);
        assert!(storefront.page().card("B").unwrap().wishlisted);
    }
}

//! Cart overlay.
//!
//! The overlay is always rebuilt from current cart state; removing a line
//! from inside it closes and reopens it rather than patching markup.

use serde::Serialize;
use tracing::instrument;

use crate::cart::Cart;
use crate::controller::Storefront;
use crate::notifications::Severity;
use crate::page::Page;
use crate::storage::KeyValueStore;
use crate::templates;

/// One row of the cart overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartModalRow {
    pub name: String,
    pub image: String,
    pub price: String,
    pub quantity: u32,
}

/// Data shown in the cart overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartModalView {
    pub item_count: u32,
    pub rows: Vec<CartModalRow>,
    /// Two-decimal total, or `None` if a price could not be parsed.
    pub total: Option<String>,
}

impl CartModalView {
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        let total = match cart.formatted_total() {
            Ok(total) => Some(total),
            Err(e) => {
                tracing::warn!(error = %e, "Cart total unavailable");
                None
            }
        };

        Self {
            item_count: cart.item_count(),
            rows: cart
                .items()
                .iter()
                .map(|item| CartModalRow {
                    name: item.name.clone(),
                    image: item.image.clone(),
                    price: item.price.clone(),
                    quantity: item.quantity,
                })
                .collect(),
            total,
        }
    }
}

/// A rendered cart overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartModal {
    pub view: CartModalView,
    pub html: String,
}

impl<S: KeyValueStore, P: Page> Storefront<S, P> {
    /// Open the cart overlay, or report an empty cart.
    #[instrument(skip(self))]
    pub fn show_cart(&mut self) {
        if self.cart.is_empty() {
            self.notify("Your cart is empty!", Severity::Info);
            return;
        }

        let view = CartModalView::from_cart(&self.cart);
        let html = match templates::render_cart_modal(&view) {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(error = %e, "Failed to render cart overlay");
                return;
            }
        };

        if self.modal_open {
            self.page.unmount_modal();
        }
        self.page.mount_modal(&CartModal { view, html });
        self.modal_open = true;
        tracing::debug!(items = self.cart.len(), "Cart overlay opened");
    }

    /// Close the cart overlay if it is open.
    pub fn close_cart_modal(&mut self) {
        if !self.modal_open {
            return;
        }
        self.page.unmount_modal();
        self.modal_open = false;
        tracing::debug!("Cart overlay closed");
    }

    /// Remove a line from inside the overlay and rebuild it.
    ///
    /// The overlay is only reopened if it was open to begin with.
    #[instrument(skip(self))]
    pub fn remove_from_cart_modal(&mut self, name: &str) {
        let was_open = self.modal_open;
        self.remove_from_cart(name);
        if was_open {
            self.close_cart_modal();
            self.show_cart();
        }
    }

    /// Checkout is not wired to a payment backend.
    pub fn checkout(&mut self) {
        tracing::info!(items = self.cart.item_count(), "Checkout requested");
        self.notify("Checkout functionality coming soon!", Severity::Info);
    }

    #[must_use]
    pub const fn is_cart_modal_open(&self) -> bool {
        self.modal_open
    }
}

//! The page port.
//!
//! Everything the controller does to the document goes through [`Page`]:
//! count badges, button states, card visibility, notifications, the cart
//! modal, and navigation. Hosts bind this trait to a real DOM; [`VirtualPage`]
//! is an in-memory document used by headless hosts and by the tests.

use serde::{Deserialize, Serialize};
use shopfront_core::NotificationId;

use crate::modal::CartModal;
use crate::notifications::{Notification, NotificationPhase};
use crate::product::Product;

/// A product card as rendered in the current listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCard {
    pub name: String,
    /// Current price as displayed, e.g. `"$19.99"`.
    pub price: String,
    pub image: String,
}

impl ProductCard {
    #[must_use]
    pub fn new(name: impl Into<String>, price: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            image: image.into(),
        }
    }

    /// The cart/wishlist payload for this card.
    #[must_use]
    pub fn product(&self) -> Product {
        Product::new(&self.name, &self.price, &self.image)
    }
}

/// Whether a product card is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardVisibility {
    /// Displayed; `animate` replays the entrance animation.
    Shown { animate: bool },
    Hidden,
}

impl CardVisibility {
    #[must_use]
    pub const fn is_shown(self) -> bool {
        matches!(self, Self::Shown { .. })
    }
}

/// Add-to-cart button appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddButtonState {
    #[default]
    Default,
    /// Transient acknowledgment after a successful add.
    Added,
}

impl AddButtonState {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Add To Cart",
            Self::Added => "Added!",
        }
    }

    #[must_use]
    pub const fn background(self) -> &'static str {
        match self {
            Self::Default => "#000",
            Self::Added => "#28a745",
        }
    }
}

/// Wishlist heart color.
#[must_use]
pub const fn wishlist_color(wishlisted: bool) -> &'static str {
    if wishlisted { "#ff6b6b" } else { "#333" }
}

/// Newsletter submit control appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubscribeButton {
    #[default]
    Ready,
    Submitting,
}

impl SubscribeButton {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "Subscribe",
            Self::Submitting => "Subscribing...",
        }
    }

    #[must_use]
    pub const fn disabled(self) -> bool {
        matches!(self, Self::Submitting)
    }
}

/// DOM operations required by the storefront controller.
///
/// Methods that target elements which may have been removed since the
/// controller last looked (buttons, notifications) return `false` when the
/// element no longer exists.
pub trait Page {
    /// Add global style rules for the overlay and notifications.
    fn inject_stylesheet(&mut self, css: &str);

    /// Product cards in the current listing, in document order.
    fn product_cards(&self) -> Vec<ProductCard>;

    /// Product names that have a wishlist toggle on the page.
    fn wishlist_buttons(&self) -> Vec<String> {
        self.product_cards().into_iter().map(|card| card.name).collect()
    }

    fn set_cart_count(&mut self, count: u32);

    fn set_add_button(&mut self, product: &str, state: AddButtonState) -> bool;

    fn set_wishlist_button(&mut self, product: &str, wishlisted: bool) -> bool;

    /// Show or hide the card at `index` in [`Page::product_cards`] order.
    fn set_card_visibility(&mut self, index: usize, visibility: CardVisibility);

    fn mount_notification(&mut self, notification: &Notification);

    fn set_notification_phase(&mut self, id: NotificationId, phase: NotificationPhase) -> bool;

    fn remove_notification(&mut self, id: NotificationId) -> bool;

    /// Mount the cart overlay, replacing any overlay already mounted.
    fn mount_modal(&mut self, modal: &CartModal);

    /// Remove the cart overlay. Returns `false` if none was mounted.
    fn unmount_modal(&mut self) -> bool;

    fn set_subscribe_button(&mut self, state: SubscribeButton);

    fn clear_email_input(&mut self);

    /// Full-page navigation to a relative URL.
    fn navigate(&mut self, target: &str);
}

// =============================================================================
// In-memory document
// =============================================================================

/// A product card plus the inline state the controller has applied to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualCard {
    pub card: ProductCard,
    pub visibility: CardVisibility,
    pub add_button: AddButtonState,
    pub wishlisted: bool,
}

/// A notification element currently in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedNotification {
    pub notification: Notification,
    pub phase: NotificationPhase,
}

/// In-memory [`Page`] implementation.
#[derive(Debug, Clone, Default)]
pub struct VirtualPage {
    cards: Vec<VirtualCard>,
    stylesheets: Vec<String>,
    cart_count: String,
    notifications: Vec<MountedNotification>,
    modal: Option<CartModal>,
    subscribe_button: SubscribeButton,
    email_input: String,
    navigations: Vec<String>,
}

impl VirtualPage {
    /// A page listing the given products.
    #[must_use]
    pub fn with_products(cards: impl IntoIterator<Item = ProductCard>) -> Self {
        Self {
            cards: cards
                .into_iter()
                .map(|card| VirtualCard {
                    card,
                    visibility: CardVisibility::Shown { animate: false },
                    add_button: AddButtonState::Default,
                    wishlisted: false,
                })
                .collect(),
            cart_count: "0".to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn card(&self, name: &str) -> Option<&VirtualCard> {
        self.cards.iter().find(|c| c.card.name == name)
    }

    #[must_use]
    pub fn cards(&self) -> &[VirtualCard] {
        &self.cards
    }

    /// Remove a card from the document, as a re-render by the host would.
    pub fn remove_card(&mut self, name: &str) {
        self.cards.retain(|c| c.card.name != name);
    }

    /// Text of the cart count badge.
    #[must_use]
    pub fn cart_count(&self) -> &str {
        &self.cart_count
    }

    #[must_use]
    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    #[must_use]
    pub fn notifications(&self) -> &[MountedNotification] {
        &self.notifications
    }

    /// Messages of all mounted notifications, oldest first.
    #[must_use]
    pub fn notification_messages(&self) -> Vec<&str> {
        self.notifications
            .iter()
            .map(|n| n.notification.message.as_str())
            .collect()
    }

    /// The most recently mounted notification.
    #[must_use]
    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last().map(|n| &n.notification)
    }

    #[must_use]
    pub const fn modal(&self) -> Option<&CartModal> {
        self.modal.as_ref()
    }

    #[must_use]
    pub const fn subscribe_button(&self) -> SubscribeButton {
        self.subscribe_button
    }

    #[must_use]
    pub fn email_input(&self) -> &str {
        &self.email_input
    }

    /// Simulate typing into the email field.
    pub fn set_email_input(&mut self, value: impl Into<String>) {
        self.email_input = value.into();
    }

    #[must_use]
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }
}

impl Page for VirtualPage {
    fn inject_stylesheet(&mut self, css: &str) {
        self.stylesheets.push(css.to_string());
    }

    fn product_cards(&self) -> Vec<ProductCard> {
        self.cards.iter().map(|c| c.card.clone()).collect()
    }

    fn set_cart_count(&mut self, count: u32) {
        self.cart_count = count.to_string();
    }

    fn set_add_button(&mut self, product: &str, state: AddButtonState) -> bool {
        let mut found = false;
        for card in self.cards.iter_mut().filter(|c| c.card.name == product) {
            card.add_button = state;
            found = true;
        }
        found
    }

    fn set_wishlist_button(&mut self, product: &str, wishlisted: bool) -> bool {
        let mut found = false;
        for card in self.cards.iter_mut().filter(|c| c.card.name == product) {
            card.wishlisted = wishlisted;
            found = true;
        }
        found
    }

    fn set_card_visibility(&mut self, index: usize, visibility: CardVisibility) {
        if let Some(card) = self.cards.get_mut(index) {
            card.visibility = visibility;
        }
    }

    fn mount_notification(&mut self, notification: &Notification) {
        self.notifications.push(MountedNotification {
            notification: notification.clone(),
            phase: notification.phase,
        });
    }

    fn set_notification_phase(&mut self, id: NotificationId, phase: NotificationPhase) -> bool {
        self.notifications
            .iter_mut()
            .find(|n| n.notification.id == id)
            .map(|n| n.phase = phase)
            .is_some()
    }

    fn remove_notification(&mut self, id: NotificationId) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.notification.id != id);
        self.notifications.len() != before
    }

    fn mount_modal(&mut self, modal: &CartModal) {
        self.modal = Some(modal.clone());
    }

    fn unmount_modal(&mut self) -> bool {
        self.modal.take().is_some()
    }

    fn set_subscribe_button(&mut self, state: SubscribeButton) {
        self.subscribe_button = state;
    }

    fn clear_email_input(&mut self) {
        self.email_input.clear();
    }

    fn navigate(&mut self, target: &str) {
        self.navigations.push(target.to_string());
    }
}

//! The storefront controller.
//!
//! [`Storefront`] owns every piece of page state: the cart, the wishlist,
//! mounted notifications, the cart overlay and the pending timer queue. The
//! feature modules (`cart`, `wishlist`, `notifications`, `search`, `modal`,
//! `newsletter`, `product`) each add their handlers in their own `impl`
//! block; this module wires them to [`Command`]s and to the clock.
//!
//! The controller can be driven two ways:
//!
//! - synchronously, with [`Storefront::dispatch`] for user actions and
//!   [`Storefront::fire_due_timers`] whenever the host's clock ticks;
//! - asynchronously, with [`Storefront::run`], which owns the controller and
//!   selects between incoming commands and the next timer deadline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shopfront_core::NotificationId;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::cart::Cart;
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result};
use crate::notifications::{NotificationCenter, Severity};
use crate::page::Page;
use crate::product::{Product, ProductDetails};
use crate::scheduler::{Deferred, DueTask, Scheduler};
use crate::storage::{FileStore, KeyValueStore, StateStore};
use crate::templates;
use crate::wishlist::Wishlist;

/// A user action, as produced by the host's event bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Add-to-cart control on a product card.
    AddToCart(Product),
    /// Remove control outside the cart overlay.
    RemoveFromCart { name: String },
    ClearCart,
    /// Cart icon.
    ShowCart,
    /// Close control inside the cart overlay.
    CloseCart,
    /// Click on the overlay backdrop, outside its content.
    CartBackdropClick,
    /// Remove control inside the cart overlay.
    ModalRemoveItem { name: String },
    Checkout,
    ToggleWishlist(Product),
    /// Search control click or Enter in the search input.
    Search { term: String },
    /// Newsletter form submission.
    Subscribe { email: String },
    DismissNotification { id: NotificationId },
    /// Escape key anywhere on the page.
    Escape,
    /// Click on a product card outside its controls.
    ViewProduct(ProductDetails),
}

/// Storefront controller for one page view.
pub struct Storefront<S: KeyValueStore, P: Page> {
    pub(crate) config: StorefrontConfig,
    pub(crate) store: StateStore<S>,
    pub(crate) page: P,
    pub(crate) cart: Cart,
    pub(crate) wishlist: Wishlist,
    pub(crate) scheduler: Scheduler,
    pub(crate) notifications: NotificationCenter,
    /// Pending add-button reversions by product name.
    pub(crate) add_button_resets: HashMap<String, CancellationToken>,
    /// Token of the in-flight subscription, if any.
    pub(crate) subscription: Option<CancellationToken>,
    pub(crate) modal_open: bool,
    pub(crate) navigated: bool,
}

impl<P: Page> Storefront<FileStore, P> {
    /// Initialize against a file-backed store in `config.storage_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if no storage directory is configured or it cannot
    /// be created.
    pub fn open(config: StorefrontConfig, page: P) -> Result<Self> {
        let store = FileStore::open(config.require_storage_dir()?)?;
        Ok(Self::init(config, store, page))
    }
}

impl<S: KeyValueStore, P: Page> Storefront<S, P> {
    /// Initialize the page: inject styles, load persisted state, render the
    /// cart count and mark wishlisted products.
    #[instrument(skip_all)]
    pub fn init(config: StorefrontConfig, store: S, mut page: P) -> Self {
        page.inject_stylesheet(templates::STYLESHEET);

        let store = StateStore::new(store);
        let cart = Cart::from_items(store.load_cart());
        let wishlist = Wishlist::from_items(store.load_wishlist());

        let mut storefront = Self {
            config,
            store,
            page,
            cart,
            wishlist,
            scheduler: Scheduler::new(),
            notifications: NotificationCenter::default(),
            add_button_resets: HashMap::new(),
            subscription: None,
            modal_open: false,
            navigated: false,
        };
        storefront.render_cart_count();
        storefront.sync_wishlist_buttons();

        tracing::info!(
            cart_items = storefront.cart.item_count(),
            wishlist_items = storefront.wishlist.len(),
            "Storefront initialized"
        );
        storefront
    }

    /// Handle one user action.
    ///
    /// Commands arriving after a navigation are ignored.
    pub fn dispatch(&mut self, command: Command) {
        if self.navigated {
            tracing::debug!(?command, "Page navigated away, ignoring command");
            return;
        }

        match command {
            Command::AddToCart(product) => self.add_to_cart(&product),
            Command::RemoveFromCart { name } => self.remove_from_cart(&name),
            Command::ClearCart => self.clear_cart(),
            Command::ShowCart => self.show_cart(),
            Command::CloseCart | Command::CartBackdropClick | Command::Escape => {
                self.close_cart_modal();
            }
            Command::ModalRemoveItem { name } => self.remove_from_cart_modal(&name),
            Command::Checkout => self.checkout(),
            Command::ToggleWishlist(product) => {
                self.toggle_wishlist(&product);
            }
            Command::Search { term } => {
                self.search(&term);
            }
            Command::Subscribe { email } => self.subscribe(&email),
            Command::DismissNotification { id } => {
                self.dismiss_notification(id);
            }
            Command::ViewProduct(details) => self.view_product(&details),
        }
    }

    /// Run every timer whose deadline has passed. Returns how many fired.
    pub fn fire_due_timers(&mut self) -> usize {
        let mut fired = 0;
        while let Some(task) = self.scheduler.pop_due(Instant::now()) {
            self.apply_deferred(task);
            fired += 1;
        }
        fired
    }

    /// Drive the controller from a command channel until the channel closes
    /// or the page navigates away.
    ///
    /// Returns the store and page once the loop ends. Timers still pending at
    /// that point are cancelled.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> (S, P) {
        tracing::debug!("Storefront event loop started");
        while !self.navigated {
            let deadline = self.scheduler.next_deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.dispatch(command),
                    None => break,
                },
                () = sleep_until(deadline) => {
                    self.fire_due_timers();
                }
            }
        }
        tracing::debug!(navigated = self.navigated, "Storefront event loop stopped");
        self.shutdown()
    }

    /// Cancel every pending timer and hand back the store and page.
    pub fn shutdown(mut self) -> (S, P) {
        self.scheduler.shutdown();
        let Self { store, page, .. } = self;
        (store.into_inner(), page)
    }

    /// Log a failure and tell the shopper about it.
    pub(crate) fn report_error(&mut self, context: &str, err: AppError) {
        tracing::error!(error = %err, context, "Operation failed");
        self.notify(err.user_message(), Severity::Error);
    }

    fn apply_deferred(&mut self, task: DueTask) {
        match task.action {
            Deferred::NotificationEnter(id) => self.on_notification_enter(id),
            Deferred::NotificationLeave(id) => self.on_notification_leave(id, task.due),
            Deferred::NotificationRemove(id) => self.on_notification_remove(id),
            Deferred::ResetAddButton(name) => self.on_reset_add_button(&name),
            Deferred::CompleteSubscription => self.on_subscription_complete(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    #[must_use]
    pub const fn page(&self) -> &P {
        &self.page
    }

    /// Mutable access for host-side changes to the document.
    pub const fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Number of timers that can still fire.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    #[must_use]
    pub const fn has_navigated(&self) -> bool {
        self.navigated
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

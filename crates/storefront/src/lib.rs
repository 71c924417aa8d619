//! Shopfront storefront library.
//!
//! The interactive layer of a static product-listing page: cart, wishlist,
//! toast notifications, product search, the cart overlay and the newsletter
//! form. The page itself and the browser's key-value storage are injected
//! through the [`Page`] and [`KeyValueStore`] ports so the same controller
//! runs against a real document or the in-memory [`VirtualPage`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod controller;
pub mod error;
pub mod modal;
pub mod newsletter;
pub mod notifications;
pub mod page;
pub mod product;
pub mod scheduler;
pub mod search;
pub mod storage;
pub mod telemetry;
pub mod templates;
pub mod wishlist;

pub use cart::{Cart, CartItem};
pub use config::StorefrontConfig;
pub use controller::{Command, Storefront};
pub use error::{AppError, Result};
pub use notifications::{Notification, Severity};
pub use page::{Page, ProductCard, VirtualPage};
pub use product::{Product, ProductDetails};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StateStore};
pub use wishlist::{Wishlist, WishlistItem};

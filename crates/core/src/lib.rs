//! Shopfront Core - Shared types library.
//!
//! This crate provides the value types used by the storefront controller:
//! validated email addresses, display-formatted prices, and typed IDs.
//!
//! # Architecture
//!
//! The core crate contains only types and parsing - no I/O, no storage access,
//! no page rendering. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

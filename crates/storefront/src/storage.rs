//! Persistent store adapter.
//!
//! The cart and wishlist survive page navigation only through a key-value
//! store with `localStorage` semantics: string keys, string (JSON) values,
//! synchronous reads and writes. [`KeyValueStore`] is that port;
//! [`StateStore`] layers the typed `cart`/`wishlist`/`selectedProduct`
//! records on top of it.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::cart::CartItem;
use crate::product::ProductDetails;
use crate::wishlist::WishlistItem;

/// Storage keys.
pub mod keys {
    /// JSON array of cart items.
    pub const CART: &str = "cart";

    /// JSON array of wishlist items.
    pub const WISHLIST: &str = "wishlist";

    /// JSON object read by the product-details page.
    pub const SELECTED_PRODUCT: &str = "selectedProduct";
}

/// Errors that can occur when reading or writing the store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A value could not be encoded or decoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key cannot be used as a storage name.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A string key-value store with `localStorage` semantics.
pub trait KeyValueStore {
    /// Read the raw value for `key`, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write the raw value for `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// Stores
// =============================================================================

/// Store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Store that keeps one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Atomic replace via rename
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Typed adapter
// =============================================================================

/// Typed access to the storefront's persisted records.
#[derive(Debug)]
pub struct StateStore<S> {
    inner: S,
}

impl<S: KeyValueStore> StateStore<S> {
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Load the persisted cart. Missing or unreadable data yields an empty cart.
    #[must_use]
    pub fn load_cart(&self) -> Vec<CartItem> {
        self.load_list(keys::CART)
    }

    /// Replace the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the items cannot be encoded or written.
    pub fn save_cart(&mut self, items: &[CartItem]) -> Result<(), StorageError> {
        self.save_value(keys::CART, items)
    }

    /// Load the persisted wishlist. Missing or unreadable data yields an empty list.
    #[must_use]
    pub fn load_wishlist(&self) -> Vec<WishlistItem> {
        self.load_list(keys::WISHLIST)
    }

    /// Replace the persisted wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the items cannot be encoded or written.
    pub fn save_wishlist(&mut self, items: &[WishlistItem]) -> Result<(), StorageError> {
        self.save_value(keys::WISHLIST, items)
    }

    /// Write the product-details hand-off record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    pub fn save_selected_product(&mut self, details: &ProductDetails) -> Result<(), StorageError> {
        self.save_value(keys::SELECTED_PRODUCT, details)
    }

    fn load_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.inner.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read persisted state");
                return Vec::new();
            }
        };

        // `null` is what a host writes for a never-initialized list
        match serde_json::from_str::<Option<Vec<T>>>(&raw) {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unparseable persisted state");
                Vec::new()
            }
        }
    }

    fn save_value<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.inner.set_item(key, &raw)?;
        tracing::debug!(key, bytes = raw.len(), "Persisted state");
        Ok(())
    }
}

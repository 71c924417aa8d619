//! Product payloads and the product-details hand-off.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::controller::Storefront;
use crate::page::Page;
use crate::storage::KeyValueStore;

/// The product fields carried by add-to-cart and wishlist controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    /// Display-formatted price, e.g. `"$19.99"`.
    pub price: String,
    /// Image URL.
    pub image: String,
}

impl Product {
    #[must_use]
    pub fn new(name: impl Into<String>, price: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            image: image.into(),
        }
    }
}

/// Product record handed to the product-details view through storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub name: String,
    pub image: String,
    pub current_price: String,
    pub original_price: String,
    pub discount: String,
    pub category: String,
}

impl<S: KeyValueStore, P: Page> Storefront<S, P> {
    /// Store `details` under `selectedProduct` and navigate to the details page.
    ///
    /// Navigation ends this page view, so the controller stops accepting
    /// commands afterwards and every pending timer is cancelled.
    #[instrument(skip(self, details), fields(product = %details.name))]
    pub fn view_product(&mut self, details: &ProductDetails) {
        if let Err(e) = self.store.save_selected_product(details) {
            self.report_error("store selected product", e.into());
            return;
        }

        let target = self.config.product_details_url.clone();
        tracing::info!(%target, "Navigating to product details");
        self.scheduler.shutdown();
        self.navigated = true;
        self.page.navigate(&target);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use crate::page::VirtualPage;
    use crate::storage::{KeyValueStore, MemoryStore, keys};

    fn details() -> ProductDetails {
        ProductDetails {
            name: "Glow Serum".to_string(),
            image: "/img/serum.jpg".to_string(),
            current_price: "$19.99".to_string(),
            original_price: "$29.99".to_string(),
            discount: "33% OFF".to_string(),
            category: "Skincare".to_string(),
        }
    }

    #[test]
    fn test_details_serialize_camel_case() {
        let json = serde_json::to_value(details()).unwrap();
        assert_eq!(json["currentPrice"], "$19.99");
        assert_eq!(json["originalPrice"], "$29.99");
        assert!(json.get("current_price").is_none());
    }

    #[test]
    fn test_view_product_writes_storage_then_navigates() {
        let mut storefront = Storefront::init(
            StorefrontConfig::default(),
            MemoryStore::default(),
            VirtualPage::default(),
        );
        storefront.view_product(&details());

        assert!(storefront.has_navigated());
        assert_eq!(storefront.page().navigations(), ["product-details.html"]);

        let (store, _page) = storefront.shutdown();
        let raw = store.get_item(keys::SELECTED_PRODUCT).unwrap().unwrap();
        let stored: ProductDetails = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, details());
    }
}

//! Product catalog.

use std::time::Duration;

use ecom_cart_core::{NewProduct, Product};

use super::ShopError;
use crate::db::{Store, with_deadline};

/// Catalog reads and imports.
pub struct CatalogService<'a> {
    store: &'a dyn Store,
    timeout: Duration,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Every product, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NoProducts` when the catalog is empty.
    pub async fn list_products(&self) -> Result<Vec<Product>, ShopError> {
        let products = with_deadline(self.timeout, self.store.list_products()).await?;
        if products.is_empty() {
            return Err(ShopError::NoProducts);
        }
        Ok(products)
    }

    /// Validate and insert a product.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidProduct` if validation fails, or
    /// `ShopError::Repository` if the insert does.
    pub async fn add_product(&self, product: NewProduct) -> Result<Product, ShopError> {
        let product = product.into_product()?;
        with_deadline(self.timeout, self.store.insert_product(&product)).await?;
        tracing::info!(
            product_id = %product.product_id,
            name = %product.product_name,
            "Product added"
        );
        Ok(product)
    }
}

//! Catalog products.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Errors raised when validating a [`NewProduct`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// Name is blank.
    #[error("product name cannot be empty")]
    EmptyName,
    /// Rating outside 0..=5.
    #[error("rating must be between 0 and {max}")]
    RatingOutOfRange {
        /// Highest allowed rating.
        max: u8,
    },
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product id.
    pub product_id: ProductId,
    /// Display name.
    pub product_name: String,
    /// Current catalog price.
    pub price: Price,
    /// Average rating, 0-5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A product as supplied by a catalog import, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    pub product_name: String,
    pub price: Price,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewProduct {
    /// Highest allowed rating.
    pub const MAX_RATING: u8 = 5;

    /// Validate and assign a fresh id.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] if the name is blank or the rating is out of range.
    pub fn into_product(self) -> Result<Product, ProductError> {
        let product_name = self.product_name.trim().to_owned();
        if product_name.is_empty() {
            return Err(ProductError::EmptyName);
        }
        if self.rating.is_some_and(|r| r > Self::MAX_RATING) {
            return Err(ProductError::RatingOutOfRange {
                max: Self::MAX_RATING,
            });
        }

        Ok(Product {
            product_id: ProductId::generate(),
            product_name,
            price: self.price,
            rating: self.rating,
            image: self.image.filter(|url| !url.trim().is_empty()),
        })
    }
}

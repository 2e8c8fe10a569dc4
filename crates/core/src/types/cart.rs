//! Cart line items.
//!
//! A [`CartItem`] is a snapshot of a [`Product`] taken when it was added to
//! the cart, not a reference to it: later catalog edits do not change the
//! price of items already in a cart.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, UserId};
use super::price::Price;
use super::product::Product;

/// A denormalized product snapshot embedded in a user's cart (and in orders).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Price,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.product_id,
            product_name: product.product_name.clone(),
            price: product.price,
            rating: product.rating,
            image: product.image.clone(),
        }
    }
}

/// A user's cart contents with their summed price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub user_id: UserId,
    #[serde(rename = "cart")]
    pub items: Vec<CartItem>,
    pub total: Price,
}

impl CartSummary {
    /// Build a summary, computing the total from the items.
    #[must_use]
    pub fn new(user_id: UserId, items: Vec<CartItem>) -> Self {
        let total = items.iter().map(|item| item.price).sum();
        Self {
            user_id,
            items,
            total,
        }
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: u64) -> Product {
        Product {
            product_id: ProductId::generate(),
            product_name: format!("item-{price}"),
            price: Price::new(price),
            rating: Some(3),
            image: None,
        }
    }

    #[test]
    fn test_snapshot_copies_fields() {
        let p = product(150);
        let item = CartItem::from(&p);
        assert_eq!(item.product_id, p.product_id);
        assert_eq!(item.product_name, p.product_name);
        assert_eq!(item.price, p.price);
        assert_eq!(item.rating, Some(3));
    }

    #[test]
    fn test_snapshot_is_detached_from_product() {
        let mut p = product(100);
        let item = CartItem::from(&p);
        p.price = Price::new(999);
        assert_eq!(item.price, Price::new(100));
    }

    #[test]
    fn test_summary_total() {
        let items = vec![CartItem::from(&product(100)), CartItem::from(&product(200))];
        let summary = CartSummary::new(UserId::generate(), items);
        assert_eq!(summary.total, Price::new(300));
        assert!(!summary.is_empty());
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::new(UserId::generate(), Vec::new());
        assert!(summary.is_empty());
        assert_eq!(summary.total, Price::ZERO);
    }
}

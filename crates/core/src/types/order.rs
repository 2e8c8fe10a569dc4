//! Orders and payment methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::id::OrderId;
use super::price::Price;

/// How an order is paid for.
///
/// Exactly one method applies to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid online.
    Digital,
    /// Cash on delivery.
    #[default]
    Cod,
}

/// Error returned for an unknown payment method name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown payment method {0:?} (expected \"digital\" or \"cod\")")]
pub struct PaymentMethodError(pub String);

impl PaymentMethod {
    /// The wire name of this method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Digital => "digital",
            Self::Cod => "cod",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = PaymentMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digital" => Ok(Self::Digital),
            "cod" => Ok(Self::Cod),
            _ => Err(PaymentMethodError(s.to_owned())),
        }
    }
}

/// A placed order embedded in a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub order_cart: Vec<CartItem>,
    pub ordered_at: DateTime<Utc>,
    /// Sum of the item prices.
    pub price: Price,
    /// Percentage discount, if any.
    #[serde(default)]
    pub discount: Option<u8>,
    pub payment_method: PaymentMethod,
}

impl Order {
    /// Create an order from cart items, totalling their prices.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>, payment_method: PaymentMethod) -> Self {
        let price = items.iter().map(|item| item.price).sum();
        Self {
            order_id: OrderId::generate(),
            order_cart: items,
            ordered_at: Utc::now(),
            price,
            discount: None,
            payment_method,
        }
    }
}

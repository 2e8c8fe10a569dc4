//! Cart, address, order and catalog errors.

use thiserror::Error;

use ecom_cart_core::{AddressError, ProductError};

use crate::db::RepositoryError;

/// Errors from the shop services.
#[derive(Debug, Error)]
pub enum ShopError {
    /// A query parameter is missing or malformed.
    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("invalid product: {0}")]
    InvalidProduct(#[from] ProductError),

    #[error("user not found")]
    UserNotFound,

    #[error("product not found")]
    ProductNotFound,

    /// Remove was asked for a product the cart does not hold.
    #[error("item not found in cart")]
    ItemNotInCart,

    #[error("address not found")]
    AddressNotFound,

    /// Checkout of a cart with no items.
    #[error("cart is empty")]
    EmptyCart,

    /// The catalog holds no products.
    #[error("No products found")]
    NoProducts,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ShopError {
    /// Map a store error from a user-scoped call, where `NotFound` means the user.
    pub(crate) fn for_user(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::UserNotFound,
            other => Self::Repository(other),
        }
    }
}

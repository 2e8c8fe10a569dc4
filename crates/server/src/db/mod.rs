//! Store traits and their backends.
//!
//! # Database: `PostgreSQL`, schema `shop`
//!
//! ## Tables
//!
//! - `users` - Accounts plus three embedded `JSONB` collections:
//!   `user_cart`, `address_details` and `order_status`
//! - `products` - The catalog
//!
//! Every mutation of one user's cart, addresses or orders is a single-row
//! `UPDATE`, so it is atomic without explicit transactions.
//!
//! # Backends
//!
//! - [`PgStore`] - production backend over a `sqlx` pool
//! - [`MemoryStore`] - in-process backend for development and tests
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p ecom-cart-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use ecom_cart_core::{
    Address, AddressId, CartItem, Email, Order, OrderId, PaymentMethod, Phone, Product, ProductId,
    UserId,
};

use crate::models::User;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Embedded migrations for the `shop` schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The operation did not finish before its deadline.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Which unique field a conflicting insert collided on.
pub const EMAIL_TAKEN: &str = "email";
/// See [`EMAIL_TAKEN`].
pub const PHONE_TAKEN: &str = "phone";

/// Result of moving a cart into an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The cart was cleared and this order recorded.
    Placed(Order),
    /// The user exists but the cart held nothing.
    EmptyCart,
}

/// Account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Whether any user has this email.
    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError>;

    /// Whether any user has this phone number.
    async fn phone_exists(&self, phone: &Phone) -> Result<bool, RepositoryError>;

    /// Insert a new user with empty cart, addresses and orders.
    ///
    /// Fails with `Conflict(EMAIL_TAKEN)` or `Conflict(PHONE_TAKEN)` when a
    /// unique field is already in use.
    async fn insert_user(&self, user: &User) -> Result<(), RepositoryError>;

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Replace the stored token pair. `NotFound` if the user is gone.
    async fn update_tokens(
        &self,
        id: UserId,
        token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Catalog persistence.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products ordered by name.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError>;
}

/// Cart and order collections embedded in a user.
///
/// Every method fails with `NotFound` when the user does not exist.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Append a snapshot to the cart.
    async fn push_cart_item(&self, user: UserId, item: &CartItem) -> Result<(), RepositoryError>;

    /// Remove every cart item with this product id, returning how many went.
    async fn pull_cart_item(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<usize, RepositoryError>;

    async fn cart_items(&self, user: UserId) -> Result<Vec<CartItem>, RepositoryError>;

    /// Atomically turn the whole cart into one order and empty the cart.
    async fn checkout_cart(
        &self,
        user: UserId,
        order_id: OrderId,
        ordered_at: DateTime<Utc>,
        payment: PaymentMethod,
    ) -> Result<CheckoutOutcome, RepositoryError>;

    /// Append an already-built order, leaving the cart untouched.
    async fn push_order(&self, user: UserId, order: &Order) -> Result<(), RepositoryError>;

    async fn orders(&self, user: UserId) -> Result<Vec<Order>, RepositoryError>;
}

/// Address collection embedded in a user.
///
/// Every method fails with `NotFound` when the user does not exist.
#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn push_address(&self, user: UserId, address: &Address) -> Result<(), RepositoryError>;

    /// Remove the address with this id. Returns `false` if none matched.
    async fn pull_address(
        &self,
        user: UserId,
        address: AddressId,
    ) -> Result<bool, RepositoryError>;
}

/// Everything the HTTP layer needs from a backend.
pub trait Store: UserStore + ProductStore + CartStore + AddressStore {}

impl<T> Store for T where T: UserStore + ProductStore + CartStore + AddressStore {}

/// Run a store call under a deadline.
///
/// The future is dropped when `limit` elapses, abandoning the call.
///
/// # Errors
///
/// Returns `RepositoryError::Timeout` on expiry, otherwise whatever the call returned.
pub async fn with_deadline<T, F>(limit: Duration, call: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| RepositoryError::Timeout(limit))?
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

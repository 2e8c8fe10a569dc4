//! Business logic.
//!
//! Services are cheap borrowing wrappers built per request from `AppState`.
//! Every store call they make runs under the configured deadline.

pub mod address;
pub mod auth;
pub mod cart;
pub mod catalog;
mod error;

pub use address::AddressService;
pub use auth::AuthService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use error::ShopError;

//! Domain models owned by the server.
//!
//! Catalog, cart, address and order types live in `ecom-cart-core`; this
//! module only holds types that carry secrets or are never sent as-is.

pub mod user;

pub use user::{User, UserProfile};

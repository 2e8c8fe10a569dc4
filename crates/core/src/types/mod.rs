//! Core types for ecom-cart.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! sub-documents embedded in a user record.

pub mod address;
pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod phone;
pub mod price;
pub mod product;

pub use address::{Address, AddressError, NewAddress};
pub use cart::{CartItem, CartSummary};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, PaymentMethod, PaymentMethodError};
pub use phone::{Phone, PhoneError};
pub use price::Price;
pub use product::{NewProduct, Product, ProductError};

//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store round trip)
//!
//! # Users
//! POST /users/signup           - Create account, returns tokens (201)
//! POST /users/login            - Password login, returns fresh tokens
//! POST /users/addproduct       - Not implemented (501)
//! GET  /users/productview      - Full catalog
//! GET  /users/search           - Not implemented (501)
//!
//! # Cart and orders (requires the user's own access token)
//! GET  /addtocart?id=&userID=          - Add product snapshot to cart
//! GET  /removeitem?id=&userID=         - Remove product from cart
//! GET  /listcart?id=                   - Cart items and total
//! GET  /cartcheckout?userID=&payment=  - Checkout the whole cart
//! GET  /instantbuy?id=&userID=&payment= - Buy one product directly
//! GET  /orders?userID=                 - Order history
//!
//! # Addresses (requires the user's own access token)
//! POST   /addaddress?id=                  - Add address (JSON body)
//! POST   /edithomeaddress?id=             - Not implemented (501)
//! POST   /editworkaddress?id=             - Not implemented (501)
//! DELETE /deleteaddresses?id=&address_id= - Delete address
//! ```

pub mod address;
pub mod cart;
pub mod health;
pub mod users;

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{
        Query,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use ecom_cart_core::{AddressId, PaymentMethod, ProductId, UserId};

use crate::error::AppError;
use crate::services::ShopError;
use crate::state::AppState;

/// Create the full API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/users", user_routes())
        .merge(cart_routes())
        .merge(address_routes())
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/addproduct", post(not_implemented))
        .route("/productview", get(users::product_view))
        .route("/search", get(not_implemented))
}

/// Create the cart and order routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/addtocart", get(cart::add_to_cart))
        .route("/removeitem", get(cart::remove_item))
        .route("/listcart", get(cart::list_cart))
        .route("/cartcheckout", get(cart::checkout))
        .route("/instantbuy", get(cart::instant_buy))
        .route("/orders", get(cart::orders))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/addaddress", post(address::add_address))
        .route("/edithomeaddress", post(address::edit_home_address))
        .route("/editworkaddress", post(address::edit_work_address))
        .route("/deleteaddresses", delete(address::delete_address))
}

// =============================================================================
// Shared Extraction Helpers
// =============================================================================

/// Query parameters used across the cart and address endpoints.
///
/// Everything is optional at this level so that a missing parameter produces
/// a JSON validation error instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ShopQuery {
    /// Product id on cart routes, user id on `listcart` and address routes.
    pub id: Option<String>,
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    pub address_id: Option<String>,
    pub payment: Option<String>,
}

impl ShopQuery {
    /// Unwrap the query extractor, turning a malformed query string into a 400.
    fn from_extractor(query: Result<Query<Self>, QueryRejection>) -> Result<Self, AppError> {
        query
            .map(|Query(q)| q)
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
    }

    fn product_id(&self) -> Result<ProductId, ShopError> {
        parse_param(self.id.as_deref(), "product id")
    }

    fn user_id(&self) -> Result<UserId, ShopError> {
        parse_param(self.user_id.as_deref(), "user id")
    }

    /// The user id carried in `id` (used by `listcart` and the address routes).
    fn owner_id(&self) -> Result<UserId, ShopError> {
        parse_param(self.id.as_deref(), "user id")
    }

    fn address_id(&self) -> Result<AddressId, ShopError> {
        parse_param(self.address_id.as_deref(), "address id")
    }

    /// Requested payment method, cash on delivery when absent.
    fn payment(&self) -> Result<PaymentMethod, ShopError> {
        match self.payment.as_deref().map(str::trim) {
            None | Some("") => Ok(PaymentMethod::default()),
            Some(raw) => raw.parse().map_err(|e: ecom_cart_core::PaymentMethodError| {
                ShopError::InvalidInput(e.to_string())
            }),
        }
    }
}

fn parse_param<T: FromStr>(value: Option<&str>, name: &str) -> Result<T, ShopError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ShopError::InvalidInput(format!("{name} is empty")))?;
    value
        .parse()
        .map_err(|_| ShopError::InvalidInput(format!("invalid {name}")))
}

/// Unwrap a JSON body extractor, turning a bad body into a 400 JSON error.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Handler for endpoints that are routed but have no behavior.
async fn not_implemented() -> AppError {
    AppError::NotImplemented
}

/// A bare `{"message": ...}` body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

const fn message(message: &'static str) -> Json<Message> {
    Json(Message { message })
}

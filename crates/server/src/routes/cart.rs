//! Cart and order route handlers.
//!
//! All handlers require a valid access token. The user being acted on is the
//! one named in the query string, and it must be the token's own user.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Serialize;
use tracing::instrument;

use ecom_cart_core::{CartItem, CartSummary, Order};

use super::{Message, ShopQuery, message};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

type ShopParams = std::result::Result<Query<ShopQuery>, QueryRejection>;

#[derive(Debug, Serialize)]
pub struct AddedToCart {
    pub message: &'static str,
    pub item: CartItem,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub cart: CartSummary,
}

#[derive(Debug, Serialize)]
pub struct OrderPlaced {
    pub message: &'static str,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct OrderHistory {
    pub orders: Vec<Order>,
}

/// `GET /addtocart?id=<product>&userID=<user>`
#[instrument(skip_all)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    auth: RequireAuth,
    query: ShopParams,
) -> Result<Json<AddedToCart>> {
    let query = ShopQuery::from_extractor(query)?;
    let product_id = query.product_id()?;
    let user_id = query.user_id()?;
    auth.authorize(user_id)?;

    let item = state.cart().add_to_cart(user_id, product_id).await?;
    Ok(Json(AddedToCart {
        message: "product added to cart successfully",
        item,
    }))
}

/// `GET /removeitem?id=<product>&userID=<user>`
#[instrument(skip_all)]
pub async fn remove_item(
    State(state): State<AppState>,
    auth: RequireAuth,
    query: ShopParams,
) -> Result<Json<Message>> {
    let query = ShopQuery::from_extractor(query)?;
    let product_id = query.product_id()?;
    let user_id = query.user_id()?;
    auth.authorize(user_id)?;

    state.cart().remove_from_cart(user_id, product_id).await?;
    Ok(message("product removed from cart successfully"))
}

/// `GET /listcart?id=<user>`
///
/// An existing user with nothing in the cart gets a 200 with an empty list.
#[instrument(skip_all)]
pub async fn list_cart(
    State(state): State<AppState>,
    auth: RequireAuth,
    query: ShopParams,
) -> Result<Json<CartResponse>> {
    let query = ShopQuery::from_extractor(query)?;
    let user_id = query.owner_id()?;
    auth.authorize(user_id)?;

    let cart = state.cart().get_cart(user_id).await?;
    let message = if cart.is_empty() {
        "Cart is empty"
    } else {
        "Cart retrieved successfully"
    };
    Ok(Json(CartResponse { message, cart }))
}

/// `GET /cartcheckout?userID=<user>[&payment=digital|cod]`
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    auth: RequireAuth,
    query: ShopParams,
) -> Result<Json<OrderPlaced>> {
    let query = ShopQuery::from_extractor(query)?;
    let user_id = query.user_id()?;
    auth.authorize(user_id)?;
    let payment = query.payment()?;

    let order = state.cart().checkout(user_id, payment).await?;
    Ok(Json(OrderPlaced {
        message: "all items purchased successfully",
        order,
    }))
}

/// `GET /instantbuy?id=<product>&userID=<user>[&payment=digital|cod]`
#[instrument(skip_all)]
pub async fn instant_buy(
    State(state): State<AppState>,
    auth: RequireAuth,
    query: ShopParams,
) -> Result<Json<OrderPlaced>> {
    let query = ShopQuery::from_extractor(query)?;
    let product_id = query.product_id()?;
    let user_id = query.user_id()?;
    auth.authorize(user_id)?;
    let payment = query.payment()?;

    let order = state
        .cart()
        .instant_buy(user_id, product_id, payment)
        .await?;
    Ok(Json(OrderPlaced {
        message: "product purchased successfully",
        order,
    }))
}

/// `GET /orders?userID=<user>`
#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    auth: RequireAuth,
    query: ShopParams,
) -> Result<Json<OrderHistory>> {
    let query = ShopQuery::from_extractor(query)?;
    let user_id = query.user_id()?;
    auth.authorize(user_id)?;

    let orders = state.cart().list_orders(user_id).await?;
    Ok(Json(OrderHistory { orders }))
}

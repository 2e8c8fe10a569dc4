//! Address route handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
};
use serde::Serialize;
use tracing::instrument;

use ecom_cart_core::{Address, NewAddress};

use super::{Message, ShopQuery, json_body, message};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AddressAdded {
    pub message: &'static str,
    pub address: Address,
}

/// `POST /addaddress?id=<user>` with the address as a JSON body.
#[instrument(skip_all)]
pub async fn add_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    query: std::result::Result<Query<ShopQuery>, QueryRejection>,
    body: std::result::Result<Json<NewAddress>, JsonRejection>,
) -> Result<Json<AddressAdded>> {
    let query = ShopQuery::from_extractor(query)?;
    let user_id = query.owner_id()?;
    auth.authorize(user_id)?;
    let address = json_body(body)?;

    let address = state.addresses().add_address(user_id, address).await?;
    Ok(Json(AddressAdded {
        message: "Address added successfully",
        address,
    }))
}

/// `DELETE /deleteaddresses?id=<user>&address_id=<address>`
#[instrument(skip_all)]
pub async fn delete_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    query: std::result::Result<Query<ShopQuery>, QueryRejection>,
) -> Result<Json<Message>> {
    let query = ShopQuery::from_extractor(query)?;
    let user_id = query.owner_id()?;
    auth.authorize(user_id)?;
    let address_id = query.address_id()?;

    state
        .addresses()
        .delete_address(user_id, address_id)
        .await?;
    Ok(message("Address deleted successfully"))
}

pub async fn edit_home_address(RequireAuth(_claims): RequireAuth) -> AppError {
    AppError::NotImplemented
}

pub async fn edit_work_address(RequireAuth(_claims): RequireAuth) -> AppError {
    AppError::NotImplemented
}

//! Account and catalog route handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use ecom_cart_core::Product;

use super::json_body;
use crate::error::Result;
use crate::models::UserProfile;
use crate::services::auth::{LoginRequest, SignUpRequest};
use crate::state::AppState;

/// Signup and login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: UserProfile,
}

/// Create an account.
#[instrument(skip(state, body))]
pub async fn signup(
    State(state): State<AppState>,
    body: std::result::Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let request = json_body(body)?;
    let user = state.auth().sign_up(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User signed up successfully!",
            user,
        }),
    ))
}

/// Log in with email and password.
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let request = json_body(body)?;
    let user = state.auth().login(request).await?;

    Ok(Json(AuthResponse {
        message: "Login successful!",
        user,
    }))
}

/// List every product.
#[instrument(skip(state))]
pub async fn product_view(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().list_products().await?;
    Ok(Json(products))
}

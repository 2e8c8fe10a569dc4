//! Product listing, health probes and store deadlines.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};

use ecom_cart_core::{
    Address, AddressId, CartItem, Email, Order, OrderId, PaymentMethod, Phone, Product, ProductId,
    UserId,
};
use ecom_cart_integration_tests::{TestApp, send};
use ecom_cart_server::db::{
    AddressStore, CartStore, CheckoutOutcome, ProductStore, RepositoryError, UserStore,
};
use ecom_cart_server::models::User;

#[tokio::test]
async fn test_empty_catalog_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/users/productview", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "No products found");
}

#[tokio::test]
async fn test_catalog_is_sorted_by_name() {
    let app = TestApp::new();
    app.seed_product("Zither", 900).await;
    app.seed_product("Accordion", 400).await;

    let response = app.get("/users/productview", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let names: Vec<_> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["product_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Accordion", "Zither"]);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let app = TestApp::new();

    let live = app.get("/health", None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");
    assert!(live.headers.contains_key("x-request-id"));

    let ready = app.get("/health/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();
    let response = app.get("/nope", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

/// A store whose every call hangs forever.
struct StalledStore;

#[async_trait]
impl UserStore for StalledStore {
    async fn email_exists(&self, _: &Email) -> Result<bool, RepositoryError> {
        pending().await
    }
    async fn phone_exists(&self, _: &Phone) -> Result<bool, RepositoryError> {
        pending().await
    }
    async fn insert_user(&self, _: &User) -> Result<(), RepositoryError> {
        pending().await
    }
    async fn find_user_by_email(&self, _: &Email) -> Result<Option<User>, RepositoryError> {
        pending().await
    }
    async fn update_tokens(
        &self,
        _: UserId,
        _: &str,
        _: &str,
        _: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        pending().await
    }
    async fn ping(&self) -> Result<(), RepositoryError> {
        pending().await
    }
}

#[async_trait]
impl ProductStore for StalledStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        pending().await
    }
    async fn find_product(&self, _: ProductId) -> Result<Option<Product>, RepositoryError> {
        pending().await
    }
    async fn insert_product(&self, _: &Product) -> Result<(), RepositoryError> {
        pending().await
    }
}

#[async_trait]
impl CartStore for StalledStore {
    async fn push_cart_item(&self, _: UserId, _: &CartItem) -> Result<(), RepositoryError> {
        pending().await
    }
    async fn pull_cart_item(&self, _: UserId, _: ProductId) -> Result<usize, RepositoryError> {
        pending().await
    }
    async fn cart_items(&self, _: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        pending().await
    }
    async fn checkout_cart(
        &self,
        _: UserId,
        _: OrderId,
        _: DateTime<Utc>,
        _: PaymentMethod,
    ) -> Result<CheckoutOutcome, RepositoryError> {
        pending().await
    }
    async fn push_order(&self, _: UserId, _: &Order) -> Result<(), RepositoryError> {
        pending().await
    }
    async fn orders(&self, _: UserId) -> Result<Vec<Order>, RepositoryError> {
        pending().await
    }
}

#[async_trait]
impl AddressStore for StalledStore {
    async fn push_address(&self, _: UserId, _: &Address) -> Result<(), RepositoryError> {
        pending().await
    }
    async fn pull_address(&self, _: UserId, _: AddressId) -> Result<bool, RepositoryError> {
        pending().await
    }
}

#[tokio::test]
async fn test_stalled_store_hits_the_deadline() {
    let router = TestApp::router_for(Arc::new(StalledStore), Duration::from_millis(50));

    let listing = send(&router, Method::GET, "/users/productview", None, None).await;
    assert_eq!(listing.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(listing.body["kind"], "internal");
    assert_eq!(listing.body["error"], "Internal server error");

    let ready = send(&router, Method::GET, "/health/ready", None, None).await;
    assert_eq!(ready.status, StatusCode::SERVICE_UNAVAILABLE);
}

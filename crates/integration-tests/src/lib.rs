//! Integration tests for ecom-cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ecom-cart-integration-tests
//! ```
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`
//! against a [`MemoryStore`], so no database or listening socket is needed.
//!
//! # Test Categories
//!
//! - `auth` - Signup, login, token enforcement
//! - `shop_flow` - Cart, checkout, instant buy, order history
//! - `addresses` - Address book and stub endpoints
//! - `catalog` - Product listing, health probes, store deadlines
//! - `postgres_store` - `PgStore` against a live database (ignored by default)

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use ecom_cart_core::{Email, Price, Product, ProductId, UserId};
use ecom_cart_server::db::{MemoryStore, ProductStore, Store};
use ecom_cart_server::services::auth::{TokenService, TokenSubject};
use ecom_cart_server::{AppState, ServerConfig};

/// Signing secret used by every test app.
pub const TEST_JWT_SECRET: &str = "tEst-s1gning-k3y-9f8e7d6c5b4a3210";

/// Config with test defaults and the given store deadline.
#[must_use]
pub fn test_config(store_timeout: Duration) -> ServerConfig {
    ServerConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        database_url: None,
        jwt_secret: SecretString::from(TEST_JWT_SECRET),
        store_timeout,
        json_logs: false,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// The JSON body, or the raw text as a JSON string if it was not JSON.
    pub body: Value,
}

/// A signed-up user.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub token: String,
    pub refresh_token: String,
}

/// The router wired to an in-memory store.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// App over an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = Self::router_for(store.clone(), Duration::from_secs(10));
        Self { router, store }
    }

    /// Router over any store, with a custom store deadline.
    #[must_use]
    pub fn router_for(store: Arc<dyn Store>, store_timeout: Duration) -> Router {
        let state = AppState::new(test_config(store_timeout), store);
        ecom_cart_server::app(state)
    }

    /// Send one request through a fresh clone of the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        send(&self.router, method, uri, token, body).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Insert a catalog product directly into the store.
    pub async fn seed_product(&self, name: &str, price: u64) -> Product {
        let product = Product {
            product_id: ProductId::generate(),
            product_name: name.to_owned(),
            price: Price::new(price),
            rating: Some(4),
            image: None,
        };
        self.store.insert_product(&product).await.unwrap();
        product
    }

    /// Sign up through the API and return the new user's id and tokens.
    pub async fn sign_up(&self, email: &str, phone: &str) -> TestUser {
        let response = self.post("/users/signup", None, signup_body(email, phone)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        let user = &response.body["user"];
        TestUser {
            id: user["id"].as_str().unwrap().to_owned(),
            token: user["token"].as_str().unwrap().to_owned(),
            refresh_token: user["refresh_token"].as_str().unwrap().to_owned(),
        }
    }
}

/// A valid access token for `user_id`, whether or not that user exists.
#[must_use]
pub fn access_token_for(user_id: UserId) -> String {
    let email = Email::parse("ghost@example.com").unwrap();
    TokenService::new(&SecretString::from(TEST_JWT_SECRET))
        .issue(TokenSubject {
            user_id,
            email: &email,
            first_name: "Ghost",
            last_name: "User",
        })
        .unwrap()
        .access
}

/// Signup JSON with valid defaults for everything but email and phone.
#[must_use]
pub fn signup_body(email: &str, phone: &str) -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "password": "secret1",
        "email": email,
        "phone": phone,
    })
}

/// Send one request through `router`.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    TestResponse {
        status,
        headers,
        body,
    }
}

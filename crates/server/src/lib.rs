//! ecom-cart server library.
//!
//! JSON HTTP API for accounts, a product catalog, a per-user cart, addresses
//! and checkout. The binary in `main.rs` wires configuration, logging and
//! Sentry around [`app`]; integration tests drive [`app`] directly against a
//! [`db::MemoryStore`].
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - Store traits ([`db::Store`]) with `PostgreSQL` and in-memory backends
//! - Argon2 password hashes, HS256 access/refresh tokens
//! - Every store call bounded by a configurable deadline

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub use config::ServerConfig;
pub use state::AppState;

/// Build the application router with request tracing and request IDs.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

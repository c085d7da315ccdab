//! # packs-api — Axum Service for Optimal Pack Allocation
//!
//! HTTP surface over `packs-core`: a calculation endpoint, a registry of
//! named pack size configurations, health probes, metrics, and an OpenAPI
//! document.
//!
//! ## API Surface
//!
//! | Prefix                        | Module                             | Domain              |
//! |-------------------------------|------------------------------------|---------------------|
//! | `/v1/calculate`               | [`routes::calculator`]             | Pack allocation     |
//! | `/v1/pack-configurations/*`   | [`routes::pack_configurations`]    | Stored size sets    |
//! | `/metrics`                    | [`routes::metrics`]                | Operations          |
//! | `/openapi.json`               | [`openapi`]                        | API document        |
//! | `/health/*`                   | this module                        | Probes (no auth)    |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! Cors → CatchPanic → TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! CORS sits outside authentication so browser preflights never need a
//! token. A panicking handler becomes a 500 with the usual error body.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::any::Any;

use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

pub use error::AppError;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = state.metrics.clone();

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::calculator::router())
        .merge(routes::pack_configurations::router())
        .merge(routes::metrics::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .with_state(state.clone());

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new()
        .merge(health)
        .merge(api)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer())
}

/// Any origin may call the API; the bearer token travels in a header, so
/// no cookies are involved.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
        ])
        .expose_headers([header::CONTENT_LENGTH])
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "non-string panic payload".to_string()
    };
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 while the service accepts traffic, 503 before
/// startup completes and once shutdown begins.
async fn readiness(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    if state.readiness.is_ready() {
        Ok("ready")
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

//! HTTP surface: the verification page, health check and middleware.

pub mod pages;
pub mod security;

use axum::{http::StatusCode, middleware, response::IntoResponse, routing::get, Extension, Router};
use tower_http::trace::TraceLayer;

use crate::config::SecurityHeadersConfig;
use crate::ledger::LedgerHandle;

pub use pages::{lookup, verification_page};
pub use security::{build_security_headers, security_headers_middleware};

/// Shared state for page handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lazily built ledger client, shared by every request.
    pub ledger: LedgerHandle,
    /// Public root URL without trailing slash.
    pub base_url: String,
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Build the application router.
///
/// Layer order, innermost first: routes, state extension, request tracing,
/// security headers.
pub fn router(state: AppState, security_headers: &SecurityHeadersConfig) -> Router {
    let mut app = Router::new()
        .route("/", get(verification_page))
        .route("/health", get(health_check))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http());

    if security_headers.enabled {
        app = app
            .layer(middleware::from_fn(security_headers_middleware))
            .layer(Extension(build_security_headers(security_headers)));
    }

    app
}

//! HTTP surface for the ticket settlement engine:
//! charge-token issuance, checkout, wallet management, and the inbound
//! Paystack webhook, all behind an already-authenticated `X-User-ID`.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full router: versioned API routes, swagger UI, `/healthz`,
/// and the ambient middleware stack (timing, security headers, CORS,
/// request tracing).
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .fallback(|req: axum::http::Request<axum::body::Body>| async move { eprintln!("UNMATCHED: {} {}", req.method(), req.uri()); axum::http::StatusCode::NOT_FOUND })
        .nest("/v1", routes::api_v1_routes())
        .merge(routes::swagger_routes())
        .layer(axum_middleware::from_fn(middleware::security_headers_middleware))
        .layer(axum_middleware::from_fn(middleware::timing_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

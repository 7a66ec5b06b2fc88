//! HTTP route handlers for the DocVault server.
//!
//! Routes are organized by subsystem:
//! - `sys`: health reporting
//! - `gate`: credential verification, status, sign-out (public)
//! - `library`: manifest listing and document content (session-gated)

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::middleware as axum_mw;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::session_middleware;
use crate::state::AppState;

pub mod gate;
pub mod library;
pub mod sys;

/// Assemble the full application router.
pub fn api_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/v1/sys", sys::router())
        .nest("/v1/gate", gate::router())
        .nest("/v1/library", library::router())
        .layer(axum_mw::from_fn_with_state(
            Arc::clone(&state),
            session_middleware,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

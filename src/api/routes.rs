//! API Routes
//!
//! Configures the Axum router. There are no fixed endpoints: every path is an
//! item address handled by [`item_handler`].

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{item_handler, AppState};

/// Creates the main router.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .fallback(item_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! HTTP API route definitions.

use axum::{middleware, routing::get, Router};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::errors::{not_found, PanicResponder};
use super::handlers::{health, info, ping, root, status, AppState};
use super::middleware::stamp_response;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    with_boundary(api_routes(), state)
}

/// The five service routes. Other methods on these paths fall through to 404.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root).fallback(not_found))
        .route("/status", get(status).fallback(not_found))
        .route("/health", get(health).fallback(not_found))
        .route("/info", get(info).fallback(not_found))
        .route("/ping", get(ping).fallback(not_found))
}

/// Add the 404 fallback, panic conversion, tracing and response stamping
/// around `routes`.
///
/// Stamping is the outermost layer, so 404 and 500 responses get the
/// service headers too.
pub fn with_boundary(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(PanicResponder::new(&state.meta)))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(state.clone(), stamp_response))
        .with_state(state)
}

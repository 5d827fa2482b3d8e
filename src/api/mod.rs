//! HTTP API module for the status, health and info endpoints.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use errors::ApiError;
pub use handlers::AppState;
pub use routes::{create_router, with_boundary};

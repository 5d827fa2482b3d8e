//! App 2 API service.
//!
//! A small JSON status service that sits behind a Cloudflare tunnel in the
//! demo container stack. It answers five read-only routes:
//!
//! ```text
//! GET /         service identity and route list
//! GET /status   uptime and environment
//! GET /health   uptime, runtime details, constant checks
//! GET /info     static architecture and security metadata
//! GET /ping     pong
//! ```
//!
//! Every response, including 404 and 500 errors, carries `X-Service`,
//! `X-Version` and `X-Response-Time` headers.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Startup and serve errors
//! - [`metadata`]: Service identity, uptime, health snapshot
//! - [`api`]: Routes, handlers, error boundary, response stamping
//! - [`metrics`]: Request metrics
//! - [`utils`]: Formatting helpers and shutdown signal

pub mod api;
pub mod config;
pub mod error;
pub mod metadata;
pub mod metrics;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError};
pub use metadata::ServiceMetadata;

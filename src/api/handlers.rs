//! HTTP API handlers.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::errors::ApiError;
use super::middleware::RequestContext;
use crate::config::Config;
use crate::metadata::{
    Endpoint, EnvironmentInfo, HealthChecks, ServiceMetadata, SystemInfo, UptimeInfo, PROTECTION,
    SERVICE_ID,
};
use crate::utils::{format_uptime, now_timestamp, round2};

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Immutable service identity.
    pub meta: Arc<ServiceMetadata>,
}

impl AppState {
    /// Create new app state, capturing the start time.
    pub fn new(config: &Config) -> Self {
        Self::from_metadata(ServiceMetadata::new(config))
    }

    /// Wrap already captured metadata.
    pub fn from_metadata(meta: ServiceMetadata) -> Self {
        Self {
            meta: Arc::new(meta),
        }
    }
}

/// Endpoint descriptor listed by `/`.
#[derive(Debug, Serialize)]
pub struct EndpointDescriptor {
    pub path: &'static str,
    pub method: &'static str,
    pub description: &'static str,
}

impl From<Endpoint> for EndpointDescriptor {
    fn from(endpoint: Endpoint) -> Self {
        Self {
            path: endpoint.path(),
            method: endpoint.method(),
            description: endpoint.description(),
        }
    }
}

/// Root response.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub message: &'static str,
    /// Always "running".
    pub status: &'static str,
    pub timestamp: String,
    pub endpoints: Vec<EndpointDescriptor>,
    pub protection: &'static str,
}

/// Status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    /// Always "ok".
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since start, two decimals.
    pub uptime_seconds: f64,
    /// Human-readable uptime.
    pub uptime: String,
    pub version: &'static str,
    pub environment: String,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy".
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub uptime: UptimeInfo,
    pub environment: EnvironmentInfo,
    pub system: SystemInfo,
    pub checks: HealthChecks,
}

/// Ping response.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

/// Root handler - service identity and a short route list.
pub async fn root(State(state): State<AppState>, ctx: RequestContext) -> Json<RootResponse> {
    ctx.log_request();

    // `/ping` is deliberately left off this list.
    let endpoints = [
        Endpoint::Root,
        Endpoint::Status,
        Endpoint::Health,
        Endpoint::Info,
    ]
    .into_iter()
    .map(EndpointDescriptor::from)
    .collect();

    Json(RootResponse {
        service: state.meta.name,
        version: state.meta.version,
        message: "App 2 API Service - Limbic Capital DevOps Assessment",
        status: "running",
        timestamp: now_timestamp(),
        endpoints,
        protection: PROTECTION,
    })
}

/// Status handler - uptime and environment.
pub async fn status(State(state): State<AppState>, ctx: RequestContext) -> Json<StatusResponse> {
    ctx.log_request();

    let uptime_seconds = state.meta.uptime_seconds();

    Json(StatusResponse {
        service: SERVICE_ID,
        status: "ok",
        timestamp: now_timestamp(),
        uptime_seconds: round2(uptime_seconds),
        uptime: format_uptime(uptime_seconds),
        version: state.meta.version,
        environment: state.meta.environment.clone(),
    })
}

/// Health handler - always 200 once the snapshot can be built.
pub async fn health(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<HealthResponse>, ApiError> {
    ctx.log_request();

    let snapshot = state
        .meta
        .health_snapshot()
        .map_err(|e| ApiError::internal(format!("health snapshot failed: {e}"), &state.meta))?;

    Ok(Json(HealthResponse {
        status: "healthy",
        service: state.meta.name,
        version: state.meta.version,
        timestamp: now_timestamp(),
        uptime: snapshot.uptime,
        environment: snapshot.environment,
        system: snapshot.system,
        checks: snapshot.checks,
    }))
}

/// Info handler - static descriptive metadata.
pub async fn info(State(state): State<AppState>, ctx: RequestContext) -> Json<Value> {
    ctx.log_request();

    Json(json!({
        "service_name": state.meta.name,
        "version": state.meta.version,
        "description": "Rust API service for Limbic Capital DevOps Assessment",
        "author": "Limbic Capital",
        "environment": state.meta.environment,
        "port": state.meta.port,
        "runtime": "tokio",
        "framework": "axum",
        "architecture": {
            "layer": "Application Layer",
            "host": "LXD container (app-host)",
            "runtime": "Docker",
            "network": "internal_net (Docker bridge)",
            "exposure": "Cloudflare Tunnel with Zero Trust Access",
            "communication": "Called by app1 via Docker DNS",
        },
        "security": {
            "authentication": "Cloudflare Access",
            "encryption": "TLS via Cloudflare",
            "non_root_user": true,
            "minimal_privileges": true,
        },
        "features": [
            "RESTful API",
            "JSON responses",
            "Health monitoring",
            "Service-to-service communication",
            "Cloudflare Zero Trust integration",
        ],
    }))
}

/// Ping handler.
pub async fn ping(ctx: RequestContext) -> Json<PingResponse> {
    ctx.log_request();

    Json(PingResponse {
        message: "pong",
        service: SERVICE_ID,
        timestamp: now_timestamp(),
    })
}

//! Per-request context and response stamping.

use std::convert::Infallible;
use std::time::Instant;

use axum::{
    async_trait,
    extract::{FromRequestParts, MatchedPath, Request, State},
    http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tracing::info;

use super::handlers::AppState;
use crate::metadata::ServiceMetadata;
use crate::metrics;

/// Service name header.
pub const X_SERVICE: HeaderName = HeaderName::from_static("x-service");
/// Service version header.
pub const X_VERSION: HeaderName = HeaderName::from_static("x-version");
/// Response duration header.
pub const X_RESPONSE_TIME: HeaderName = HeaderName::from_static("x-response-time");
/// Upstream hop header, logged only.
pub const X_FORWARDED_BY: HeaderName = HeaderName::from_static("x-forwarded-by");

/// What the service knows about one inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// When the request entered the service.
    pub arrived: Instant,
    pub method: Method,
    pub path: String,
    /// Value of `X-Forwarded-By`, if sent.
    pub forwarded_by: Option<String>,
}

impl RequestContext {
    /// Capture the context from request parts, stamping arrival now.
    pub fn capture(method: &Method, path: &str, headers: &HeaderMap) -> Self {
        Self {
            arrived: Instant::now(),
            method: method.clone(),
            path: path.to_string(),
            forwarded_by: headers
                .get(X_FORWARDED_BY)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    /// Log the request line.
    pub fn log_request(&self) {
        info!(
            "[App2] {} {} - Forwarded by: {}",
            self.method,
            self.path,
            self.forwarded_by.as_deref().unwrap_or("unknown")
        );
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<RequestContext>() {
            return Ok(ctx.clone());
        }
        Ok(RequestContext::capture(
            &parts.method,
            parts.uri.path(),
            &parts.headers,
        ))
    }
}

/// Format a duration in seconds as `"0.012s"`.
pub fn format_response_time(seconds: f64) -> String {
    format!("{seconds:.3}s")
}

/// Set the identity headers and, when the arrival instant is known, the
/// response time header.
pub fn apply_service_headers(
    headers: &mut HeaderMap,
    meta: &ServiceMetadata,
    arrived: Option<Instant>,
) {
    headers.insert(X_SERVICE, HeaderValue::from_static(meta.name));
    headers.insert(X_VERSION, HeaderValue::from_static(meta.version));

    if let Some(arrived) = arrived {
        let elapsed = format_response_time(arrived.elapsed().as_secs_f64());
        if let Ok(value) = HeaderValue::from_str(&elapsed) {
            headers.insert(X_RESPONSE_TIME, value);
        }
    }
}

/// Middleware wrapped around the whole router.
pub async fn stamp_response(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let ctx = RequestContext::capture(request.method(), request.uri().path(), request.headers());
    let arrived = ctx.arrived;
    // Unmatched requests share one label to keep cardinality bounded.
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    request.extensions_mut().insert(ctx);

    let mut response = next.run(request).await;

    apply_service_headers(response.headers_mut(), &state.meta, Some(arrived));

    let status = response.status();
    if state.meta.is_development() {
        let elapsed = response
            .headers()
            .get(X_RESPONSE_TIME)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("N/A");
        info!("[App2] Response: {} - {}", status.as_u16(), elapsed);
    }

    metrics::record_http_latency(arrived, &endpoint);
    metrics::inc_http_responses(status.as_u16());

    response
}

//! Conversion of request failures into JSON error responses.

use std::any::Any;

use axum::{
    body::Body,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use thiserror::Error;
use tower_http::catch_panic::ResponseForPanic;
use tracing::error;

use crate::metadata::{Endpoint, ServiceMetadata};
use crate::metrics;
use crate::utils::now_timestamp;

/// Message returned for internal faults outside development.
pub const REDACTED_MESSAGE: &str = "Something went wrong";

/// Request-level failures.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No route matches the method and path.
    #[error("Route {method} {path} not found")]
    NotFound {
        /// Request method.
        method: Method,
        /// Request path.
        path: String,
    },

    /// Building the response failed.
    #[error("{detail}")]
    Internal {
        /// Raw failure text.
        detail: String,
        /// Whether `detail` may be sent to the client.
        expose: bool,
    },
}

impl ApiError {
    /// Internal fault, exposed only in development.
    pub fn internal(detail: impl Into<String>, meta: &ServiceMetadata) -> Self {
        ApiError::Internal {
            detail: detail.into(),
            expose: meta.is_development(),
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub status_code: u16,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_endpoints: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        let body = match self {
            ApiError::NotFound { .. } => ErrorBody {
                error: "Not Found",
                message,
                status_code: status.as_u16(),
                timestamp: now_timestamp(),
                available_endpoints: Some(
                    Endpoint::all().into_iter().map(Endpoint::route).collect(),
                ),
            },
            ApiError::Internal { expose, .. } => {
                error!("[App2] Error: {}", message);
                ErrorBody {
                    error: "Internal Server Error",
                    message: if expose {
                        message
                    } else {
                        REDACTED_MESSAGE.to_string()
                    },
                    status_code: status.as_u16(),
                    timestamp: now_timestamp(),
                    available_endpoints: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Fallback for unmatched paths and methods.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound {
        method,
        path: decoded_path(&uri),
    }
}

/// Percent-decoded request path. Invalid UTF-8 is replaced, not rejected.
fn decoded_path(uri: &Uri) -> String {
    percent_decode_str(uri.path())
        .decode_utf8_lossy()
        .into_owned()
}

/// Turns a handler panic into the internal fault response.
#[derive(Debug, Clone, Copy)]
pub struct PanicResponder {
    expose: bool,
}

impl PanicResponder {
    pub fn new(meta: &ServiceMetadata) -> Self {
        Self {
            expose: meta.is_development(),
        }
    }
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(
        &mut self,
        err: Box<dyn Any + Send + 'static>,
    ) -> axum::http::Response<Self::ResponseBody> {
        metrics::inc_handler_panics();

        ApiError::Internal {
            detail: panic_message(err.as_ref()),
            expose: self.expose,
        }
        .into_response()
    }
}

fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    }
}

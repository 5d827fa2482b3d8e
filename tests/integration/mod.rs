//! Integration tests for the App 2 API service.
//!
//! These drive the full router (fallback, panic conversion and response
//! stamping included) in-process through `tower::ServiceExt::oneshot`.
//! Run with: cargo test --test integration

use std::time::Duration;

use app2_api_service::api::{create_router, routes::api_routes, with_boundary, ApiError, AppState};
use app2_api_service::config::Config;
use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::DateTime;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;


fn config_for(environment: &str) -> Config {
    Config {
        flask_env: environment.to_string(),
        ..Config::default()
    }
}

/// Router with two extra routes that fail on purpose.
fn faulty_router(environment: &str) -> Router {
    let state = AppState::new(&config_for(environment));
    let routes = api_routes()
        .route(
            "/explode",
            get(|| async {
                if true {
                    panic!("secret panic detail");
                }
            }),
        )
        .route(
            "/fail",
            get(|State(state): State<AppState>| async move {
                Err::<(), _>(ApiError::internal("secret error detail", &state.meta))
            }),
        );
    with_boundary(routes, state)
}

async fn send(app: Router, method: &str, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-by", "app1")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_service_headers(response: &Response) {
    let headers = response.headers();
    assert_eq!(headers.get("x-service").unwrap(), "app2-api-service");
    assert_eq!(headers.get("x-version").unwrap(), "1.0.0");
    let elapsed = headers.get("x-response-time").unwrap().to_str().unwrap();
    assert!(elapsed.ends_with('s'), "bad response time {elapsed}");
}

fn assert_keys(body: &Value, keys: &[&str]) {
    for key in keys {
        assert!(body.get(key).is_some(), "missing key {key} in {body}");
    }
}

#[tokio::test]
async fn root_lists_four_endpoints() {
    let app = create_router(AppState::new(&Config::default()));
    let response = send(app, "GET", "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_service_headers(&response);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );

    let body = json_body(response).await;
    assert_keys(
        &body,
        &["service", "version", "message", "status", "timestamp", "endpoints", "protection"],
    );
    assert_eq!(body["status"], "running");
    assert_eq!(body["service"], "app2-api-service");
    assert_eq!(body["protection"], "Cloudflare Zero Trust Access");
    assert_eq!(body["endpoints"].as_array().unwrap().len(), 4);
    assert_eq!(body["endpoints"][1]["path"], "/status");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn status_reports_uptime() {
    let app = create_router(AppState::new(&config_for("staging")));
    let response = send(app, "GET", "/status").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_keys(
        &body,
        &["service", "status", "timestamp", "uptime_seconds", "uptime", "version", "environment"],
    );
    assert_eq!(body["service"], "app2");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "staging");
    assert_eq!(body["uptime"], "0s");
    assert!(body["uptime_seconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn uptime_tracks_elapsed_time() {
    let app = create_router(AppState::new(&Config::default()));

    let first = json_body(send(app.clone(), "GET", "/status").await).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    let second = json_body(send(app.clone(), "GET", "/health").await).await;

    let before = first["uptime_seconds"].as_f64().unwrap();
    let after = second["uptime"]["seconds"].as_f64().unwrap();
    let delta = after - before;

    assert!(after >= before);
    assert!(delta >= 0.25 && delta < 1.0, "delta was {delta}");
}

#[tokio::test]
async fn health_is_healthy_with_constant_checks() {
    let app = create_router(AppState::new(&Config::default()));
    let response = send(app, "GET", "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_service_headers(&response);

    let body = json_body(response).await;
    assert_keys(
        &body,
        &["status", "service", "version", "timestamp", "uptime", "environment", "system", "checks"],
    );
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["api_responsive"], true);
    assert_eq!(body["checks"]["can_connect"], true);
    assert_eq!(body["checks"]["environment_loaded"], true);
    assert_eq!(body["environment"]["flask_env"], "development");
    assert!(body["environment"].get("name").is_none());
    assert_eq!(body["environment"]["log_level"], "info");
    assert!(body["uptime"]["started_at"].as_str().unwrap().ends_with('Z'));
    assert!(body["system"]["working_directory"].is_string());
}

#[tokio::test]
async fn info_echoes_port_and_environment() {
    let config = Config {
        port: 6123,
        flask_env: "production".to_string(),
        ..Config::default()
    };
    let app = create_router(AppState::new(&config));
    let response = send(app, "GET", "/info").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_keys(
        &body,
        &["service_name", "version", "description", "architecture", "security", "features"],
    );
    assert_eq!(body["port"], 6123);
    assert_eq!(body["environment"], "production");
    assert_eq!(body["security"]["non_root_user"], true);
    assert_eq!(body["features"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn ping_is_idempotent_with_fresh_timestamps() {
    let app = create_router(AppState::new(&Config::default()));

    let first = json_body(send(app.clone(), "GET", "/ping").await).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = json_body(send(app, "GET", "/ping").await).await;

    assert_eq!(first["message"], "pong");
    assert_eq!(second["message"], "pong");
    assert_eq!(first["service"], "app2");

    let t1 = DateTime::parse_from_rfc3339(first["timestamp"].as_str().unwrap()).unwrap();
    let t2 = DateTime::parse_from_rfc3339(second["timestamp"].as_str().unwrap()).unwrap();
    assert!(t2 >= t1);
}

#[tokio::test]
async fn unknown_route_returns_structured_404() {
    let app = create_router(AppState::new(&Config::default()));
    let response = send(app, "GET", "/doesnotexist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_service_headers(&response);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "Route GET /doesnotexist not found");
    assert_eq!(body["status_code"], 404);
    assert_eq!(
        body["available_endpoints"],
        serde_json::json!(["GET /", "GET /status", "GET /health", "GET /info", "GET /ping"])
    );
}

#[tokio::test]
async fn not_found_message_uses_decoded_path() {
    let app = create_router(AppState::new(&Config::default()));
    let response = send(app, "GET", "/foo%20bar").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Route GET /foo bar not found");
}

#[tokio::test]
async fn unsupported_method_returns_404() {
    let app = create_router(AppState::new(&Config::default()));
    let response = send(app, "DELETE", "/status").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Route DELETE /status not found");
}

#[tokio::test]
async fn panic_is_redacted_outside_development() {
    let response = send(faulty_router("production"), "GET", "/explode").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_service_headers(&response);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal Server Error");
    assert_eq!(body["message"], "Something went wrong");
    assert_eq!(body["status_code"], 500);
    assert!(body.get("available_endpoints").is_none());
}

#[tokio::test]
async fn handler_error_is_redacted_outside_development() {
    let response = send(faulty_router("production"), "GET", "/fail").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_service_headers(&response);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Something went wrong");
}

#[tokio::test]
async fn faults_expose_detail_in_development() {
    let panicked = json_body(send(faulty_router("development"), "GET", "/explode").await).await;
    assert_eq!(panicked["message"], "secret panic detail");

    let failed = json_body(send(faulty_router("development"), "GET", "/fail").await).await;
    assert_eq!(failed["message"], "secret error detail");
}

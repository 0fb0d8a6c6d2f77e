// HTTP API
// axum router over the analysis engine

pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::any::Any;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

use crate::services::config_store::ServerConfig;
use crate::services::AnalysisEngine;

pub use error::ApiError;
pub use handlers::AppState;

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "http.request"
    );
    response
}

/// A panicking handler becomes the generic 500; the panic message is only logged.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Unexpected(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

/// Panic recovery inside, request logging outermost so recovered panics are logged as 500s.
fn with_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(log_requests))
}

pub fn make_app(engine: AnalysisEngine) -> Router {
    let state = AppState::new(engine);

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/detection/multi", post(handlers::detect_multi))
        .route(
            "/api/detection/strategy",
            get(handlers::get_strategy).post(handlers::set_strategy),
        )
        .route("/api/detection/test", post(handlers::test_api))
        .route("/api/detection/status", get(handlers::api_status))
        .with_state(state);

    with_layers(router)
}

pub async fn run_server(engine: AnalysisEngine, server: &ServerConfig) -> Result<()> {
    let app = make_app(engine);

    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(addr = %addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuntimeConfig;
    use crate::services::config_store::RuntimeConfigHandle;
    use crate::services::detection::DetectorRegistry;
    use crate::services::providers::ProviderClient;
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use serde_json::{json, Value};
    use tower::ServiceExt; // for `oneshot`

    fn offline_app(max_chars: usize) -> Router {
        let engine = AnalysisEngine::new(
            ProviderClient::default(),
            DetectorRegistry::default(),
            None,
            None,
            RuntimeConfigHandle::new(RuntimeConfig::default()),
        )
        .with_max_content_chars(max_chars);
        make_app(engine)
    }

    fn post_json(uri: &str, body: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn analyze_rejects_bad_content() {
        let app = offline_app(100);
        let bodies = [
            r#"{}"#,
            r#"{"content": ""}"#,
            r#"{"content": "   "}"#,
            r#"{"content": 42}"#,
            r#"not json"#,
            r#"{"content": "fine", "contentType": "poetry"}"#,
        ];
        for body in bodies {
            let response = app.clone().oneshot(post_json("/api/analyze", body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
            let json = body_json(response).await;
            assert_eq!(json["success"], false);
            assert!(json["error"].is_string());
        }

        let too_long = json!({ "content": "a".repeat(101) }).to_string();
        let response = app.oneshot(post_json("/api/analyze", &too_long)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analyze_returns_full_report() {
        let app = offline_app(50_000);
        let body = json!({ "content": "Lorem ipsum dolor sit amet.", "contentType": "blog" }).to_string();
        let response = app.oneshot(post_json("/api/analyze", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        let data = &json["data"];
        assert_eq!(data["originality"]["originalityScore"], 80);
        assert_eq!(data["disclosureStatement"]["style"], "blog");
        assert!(data["aiDetection"]["probability"].is_number());
        assert!(data["seoAssessment"]["score"].is_number());
        assert!(data["copyrightRisk"]["riskLevel"].is_string());
        assert!(data["timestamp"].is_string());
    }

    #[tokio::test]
    async fn multi_without_detectors_is_503() {
        let app = offline_app(50_000);
        let response = app
            .oneshot(post_json("/api/detection/multi", r#"{"content": "hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"], "No AI detection APIs are configured");
    }

    #[tokio::test]
    async fn strategy_toggle_roundtrip() {
        let app = offline_app(50_000);

        let response = app.clone().oneshot(get_req("/api/detection/strategy")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["currentConfig"]["useMultiAPI"], false);
        assert_eq!(json["strategy"]["strategy"], "fallback");

        let response = app
            .clone()
            .oneshot(post_json("/api/detection/strategy", r#"{"useMultiAPI": true}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Detection strategy updated to: Multi-API");
        assert_eq!(json["currentConfig"]["useMultiAPI"], true);

        // State is shared across requests
        let response = app.clone().oneshot(get_req("/api/detection/strategy")).await.unwrap();
        assert_eq!(body_json(response).await["currentConfig"]["useMultiAPI"], true);

        let response = app
            .oneshot(post_json("/api/detection/strategy", r#"{"useMultiAPI": "yes"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid useMultiAPI value");
    }

    #[tokio::test]
    async fn connection_test_validation_and_soft_failure() {
        let app = offline_app(50_000);

        let response = app
            .clone()
            .oneshot(post_json("/api/detection/test", r#"{"apiName": 7}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid API name");

        let response = app
            .oneshot(post_json("/api/detection/test", r#"{"apiName": "nonexistent"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["api"], "nonexistent");
        assert!(json["responseTime"].is_number());
        assert!(json["error"].as_str().unwrap().contains("Unknown API"));
    }

    #[tokio::test]
    async fn status_and_health() {
        let app = offline_app(50_000);

        let response = app.clone().oneshot(get_req("/api/detection/status")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert!(json["apiStatuses"].is_array());
        assert_eq!(json["strategy"]["recommendedStrategy"], "fallback");

        let response = app.oneshot(get_req("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    async fn explode() -> &'static str {
        panic!("handler exploded: secret detail")
    }

    #[tokio::test]
    async fn handler_panic_becomes_generic_500() {
        let app = with_layers(Router::new().route("/boom", get(explode)));

        let response = app.clone().oneshot(get_req("/boom")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Internal server error");
        assert!(!json.to_string().contains("secret detail"));

        // The service keeps answering after a panic
        let response = app.oneshot(get_req("/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

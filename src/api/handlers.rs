// HTTP Handlers
// Request validation at the boundary, then delegation to the analysis engine

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::models::{AnalysisRequest, AnalysisResult, ApiResponse, ContentType, MultiApiDetectionResult};
use crate::services::text_processor::char_len;
use crate::services::AnalysisEngine;

use super::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(engine: AnalysisEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            started_at: Instant::now(),
        }
    }
}

fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::invalid("Invalid JSON body"))
}

/// Non-blank string `content` within the configured length limit.
fn require_content(body: &Value, max_chars: usize) -> Result<String, ApiError> {
    let content = match body.get("content") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err(ApiError::invalid("Content is required and must be a non-empty string")),
    };
    if char_len(&content) > max_chars {
        return Err(ApiError::invalid(format!(
            "Content exceeds the maximum length of {} characters",
            max_chars
        )));
    }
    Ok(content)
}

fn parse_content_type(body: &Value) -> Result<Option<ContentType>, ApiError> {
    match body.get("contentType") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => ContentType::from_str(s)
            .map(Some)
            .ok_or_else(|| ApiError::invalid(format!("Invalid contentType: {}", s))),
        Some(_) => Err(ApiError::invalid("contentType must be a string")),
    }
}

pub async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<AnalysisResult>>, ApiError> {
    let body = parse_body(&body)?;
    let request = AnalysisRequest {
        content: require_content(&body, state.engine.max_content_chars())?,
        content_type: parse_content_type(&body)?,
        language: body.get("language").and_then(Value::as_str).map(str::to_string),
    };

    let result = state.engine.analyze(&request).await;
    Ok(Json(ApiResponse::ok(result)))
}

pub async fn detect_multi(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<MultiApiDetectionResult>>, ApiError> {
    let body = parse_body(&body)?;
    let content = require_content(&body, state.engine.max_content_chars())?;
    let result = state.engine.detect_multi(&content).await?;
    Ok(Json(ApiResponse::ok(result)))
}

pub async fn get_strategy(State(state): State<AppState>) -> Json<Value> {
    let strategy = state.engine.strategy_info().await;
    let current = state.engine.runtime().get().await;
    Json(json!({
        "success": true,
        "strategy": strategy,
        "currentConfig": current,
    }))
}

pub async fn set_strategy(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)?;
    let use_multi_api = body
        .get("useMultiAPI")
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::invalid("Invalid useMultiAPI value"))?;

    let current = state.engine.runtime().set_use_multi_api(use_multi_api).await;
    let strategy = state.engine.strategy_info().await;

    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Detection strategy updated to: {}",
            if use_multi_api { "Multi-API" } else { "Single API" }
        ),
        "strategy": strategy,
        "currentConfig": current,
    })))
}

pub async fn test_api(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)?;
    let api_name = match body.get("apiName") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err(ApiError::invalid("Invalid API name")),
    };

    let result = state.engine.test_connection(&api_name).await;
    Ok(Json(json!({
        "success": result.success,
        "api": api_name,
        "responseTime": result.response_time,
        "error": result.error,
    })))
}

pub async fn api_status(State(state): State<AppState>) -> Json<Value> {
    let strategy = state.engine.strategy_info().await;
    Json(json!({
        "success": true,
        "apiStatuses": state.engine.statuses(),
        "strategy": strategy,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.started_at.elapsed().as_secs(),
    }))
}

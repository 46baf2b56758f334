use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::core::types::{ErrorResponse, Outcome};
use crate::mcp::{McpCallResponse, McpContent};

pub fn missing_param(name: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: format!("Missing required parameter: {name}"),
        }),
    )
}

pub fn invalid_param(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn required_str<'a>(
    arguments: &'a Value,
    name: &str,
) -> Result<&'a str, (StatusCode, Json<ErrorResponse>)> {
    arguments
        .get(name)
        .and_then(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing_param(name))
}

pub fn sort_arg(arguments: &Value) -> &str {
    arguments
        .get("sort")
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .unwrap_or("popular")
}

pub fn limit_arg(arguments: &Value, default: usize) -> usize {
    arguments
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Map an operation outcome onto the MCP response contract: resolved outcomes
/// (including blocked and zero-count ones) are successful text content holding
/// the structured JSON; only engine faults flip `is_error`.
pub fn outcome_response<T: Serialize>(
    operation: &str,
    outcome: Outcome<T>,
) -> Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)> {
    match outcome.into_json() {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value)
                .unwrap_or_else(|e| format!(r#"{{"error": "serialization failed: {e}"}}"#));
            Ok(Json(McpCallResponse {
                content: vec![McpContent {
                    content_type: "text".to_string(),
                    text,
                }],
                is_error: false,
            }))
        }
        Err(e) => {
            error!("{} error: {}", operation, e);
            Ok(Json(McpCallResponse {
                content: vec![McpContent {
                    content_type: "text".to_string(),
                    text: format!("{operation} failed: {e}"),
                }],
                is_error: true,
            }))
        }
    }
}

use super::common::{limit_arg, outcome_response, required_str};
use crate::core::types::ErrorResponse;
use crate::core::AppState;
use crate::mcp::McpCallResponse;
use crate::tools::{self, DEFAULT_REVIEWS_LIMIT};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;
use std::sync::Arc;

pub async fn handle(
    state: Arc<AppState>,
    arguments: &Value,
) -> Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)> {
    let product_id = required_str(arguments, "product_id")?;
    let limit = limit_arg(arguments, DEFAULT_REVIEWS_LIMIT);

    let outcome = tools::reviews::reviews(&state, product_id, limit).await;
    outcome_response("get_reviews", outcome)
}

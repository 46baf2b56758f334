use super::common::{outcome_response, required_str};
use crate::core::types::ErrorResponse;
use crate::core::AppState;
use crate::mcp::McpCallResponse;
use crate::tools;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;
use std::sync::Arc;

pub async fn handle(
    state: Arc<AppState>,
    arguments: &Value,
) -> Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)> {
    let product_id = required_str(arguments, "product_id")?;

    let outcome = tools::sellers::sellers(&state, product_id).await;
    outcome_response("get_sellers", outcome)
}

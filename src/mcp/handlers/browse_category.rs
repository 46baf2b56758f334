use super::common::{limit_arg, outcome_response, required_str, sort_arg};
use crate::core::types::ErrorResponse;
use crate::core::AppState;
use crate::mcp::McpCallResponse;
use crate::tools::{self, DEFAULT_LISTING_LIMIT};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;
use std::sync::Arc;

pub async fn handle(
    state: Arc<AppState>,
    arguments: &Value,
) -> Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)> {
    let category = required_str(arguments, "category")?;
    let sort = sort_arg(arguments);
    let limit = limit_arg(arguments, DEFAULT_LISTING_LIMIT);

    let outcome = tools::category::category(&state, category, sort, limit).await;
    outcome_response("browse_category", outcome)
}

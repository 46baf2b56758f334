use super::common::{invalid_param, outcome_response, required_str};
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
    let reference = required_str(arguments, "product")?;

    // No identifier, no record: rejected before any navigation happens.
    let Some((id, url)) = tools::product::resolve_product_ref(&state.site, reference) else {
        return Err(invalid_param(format!(
            "Cannot resolve a product id from `{reference}`; pass a numeric id or a product URL"
        )));
    };

    let outcome = tools::product::product(&state, &id, &url).await;
    outcome_response("get_product", outcome)
}

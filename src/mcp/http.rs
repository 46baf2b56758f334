use super::handlers;
use super::tooling::tool_catalog;
use crate::core::types::ErrorResponse;
use crate::core::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpToolsResponse {
    pub tools: Vec<McpTool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpCallRequest {
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpCallResponse {
    pub content: Vec<McpContent>,
    pub is_error: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

pub fn list_tools_response() -> McpToolsResponse {
    let tools = tool_catalog()
        .into_iter()
        .map(|tool| McpTool {
            name: tool.name.to_string(),
            description: tool.description.to_string(),
            input_schema: tool.input_schema,
        })
        .collect();
    McpToolsResponse { tools }
}

pub async fn list_tools() -> Json<McpToolsResponse> {
    Json(list_tools_response())
}

pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Json(request): Json<McpCallRequest>,
) -> Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(
        "MCP tool call: {} with args: {:?}",
        request.name, request.arguments
    );
    dispatch(state, &request.name, &request.arguments).await
}

pub async fn dispatch(
    state: Arc<AppState>,
    name: &str,
    arguments: &serde_json::Value,
) -> Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)> {
    match name {
        "search_products" => handlers::search_products::handle(state, arguments).await,
        "get_product" => handlers::get_product::handle(state, arguments).await,
        "browse_category" => handlers::browse_category::handle(state, arguments).await,
        "get_reviews" => handlers::get_reviews::handle(state, arguments).await,
        "get_sellers" => handlers::get_sellers::handle(state, arguments).await,
        _ => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Unknown tool: {name}"),
            }),
        )),
    }
}

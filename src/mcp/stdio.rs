use super::tooling::{schema_to_object_map, tool_catalog};
use crate::core::types::ErrorResponse;
use crate::core::AppState;
use crate::mcp::McpCallResponse;
use axum::http::StatusCode;
use axum::response::Json;
use rmcp::{model::*, ServiceExt};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{info, warn};

fn status_code_to_error_code(status: StatusCode) -> ErrorCode {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorCode::INVALID_PARAMS,
        StatusCode::NOT_FOUND => ErrorCode::METHOD_NOT_FOUND,
        _ => ErrorCode::INTERNAL_ERROR,
    }
}

fn mcp_call_response_to_stdio_result(response: McpCallResponse) -> CallToolResult {
    let content = response
        .content
        .into_iter()
        .map(|item| Content::text(item.text))
        .collect();

    if response.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

fn convert_http_handler_result(
    result: Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)>,
) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(Json(response)) => Ok(mcp_call_response_to_stdio_result(response)),
        Err((status, Json(err))) => Err(ErrorData::new(
            status_code_to_error_code(status),
            err.error,
            None,
        )),
    }
}

#[derive(Clone, Debug)]
pub struct McpService {
    pub state: Arc<AppState>,
}

impl McpService {
    pub fn new() -> Self {
        // Stdout belongs to the MCP transport; logs go to stderr.
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init()
            .ok();

        let state = AppState::new();
        if state.session.is_none() {
            warn!(
                "No Chromium-family browser found; operations will return errors. \
                 Install Chrome/Chromium or set CHROME_EXECUTABLE."
            );
        }
        info!("Starting MCP service for site `{}`", state.site.name);

        Self {
            state: Arc::new(state),
        }
    }
}

impl Default for McpService {
    fn default() -> Self {
        Self::new()
    }
}

impl rmcp::ServerHandler for McpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::LATEST)
            .with_server_info(
                Implementation::from_build_env()
                    .with_title("Market Scout MCP")
                    .with_description(
                        "Structured marketplace data over a real browser: product search, \
                         details, reviews, and sellers, resilient to anti-bot interstitials.",
                    ),
            )
            .with_instructions(
                "Use these tools to look up marketplace products, their details, reviews, \
                 and sellers. A result of {\"error\": \"antibot_blocked\"} means the site's \
                 challenge did not clear; retrying later usually works.",
            )
    }

    async fn list_tools(
        &self,
        _page: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = tool_catalog()
            .into_iter()
            .map(|spec| {
                Tool::new(
                    Cow::Borrowed(spec.name),
                    Cow::Borrowed(spec.description),
                    schema_to_object_map(&spec.input_schema),
                )
                .with_title(spec.title.to_string())
            })
            .collect();

        Ok(ListToolsResult {
            tools,
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(
            "MCP tool call: {} with args: {:?}",
            request.name, request.arguments
        );

        let args_map = request.arguments.as_ref().ok_or_else(|| {
            ErrorData::new(
                ErrorCode::INVALID_PARAMS,
                "Missing required arguments object",
                None,
            )
        })?;

        // rmcp hands arguments as an object map; handlers take a
        // serde_json::Value, identical across both transports.
        let arguments = Value::Object(args_map.clone());
        convert_http_handler_result(
            crate::mcp::http::dispatch(Arc::clone(&self.state), request.name.as_ref(), &arguments)
                .await,
        )
    }
}

pub async fn run() -> anyhow::Result<()> {
    let service = McpService::new();
    let running = service.serve(rmcp::transport::stdio()).await?;
    info!("MCP stdio server initialized; waiting for client session");
    let quit_reason = running.waiting().await?;
    warn!("MCP stdio server stopped: {:?}", quit_reason);
    Ok(())
}

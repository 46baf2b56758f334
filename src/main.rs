use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use market_scout::tools::{DEFAULT_LISTING_LIMIT, DEFAULT_REVIEWS_LIMIT};
use market_scout::{category, mcp, product, reviews, search, sellers, types::*, AppState};

fn parse_port_from_args() -> Option<u16> {
    let mut args = std::env::args().peekable();
    while let Some(a) = args.next() {
        if a == "--port" {
            if let Some(v) = args.next() {
                if let Ok(p) = v.parse::<u16>() {
                    return Some(p);
                }
            }
        } else if let Some(rest) = a.strip_prefix("--port=") {
            if let Ok(p) = rest.parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

fn port_from_env() -> Option<u16> {
    for k in ["MARKET_SCOUT_PORT", "PORT"] {
        if let Ok(v) = std::env::var(k) {
            if let Ok(p) = v.trim().parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting market-scout server");

    let state = AppState::new();
    if state.session.is_none() {
        warn!(
            "No Chromium-family browser found; operations will return errors. \
             Install Chrome/Chromium or set CHROME_EXECUTABLE."
        );
    }
    let state = Arc::new(state);

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/mcp/tools", get(mcp::list_tools))
        .route("/mcp/call", post(mcp::call_tool))
        .route("/search", post(search_handler))
        .route("/product", post(product_handler))
        .route("/category", post(category_handler))
        .route("/reviews", post(reviews_handler))
        .route("/sellers", post(sellers_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let port: u16 = parse_port_from_args()
        .or_else(port_from_env)
        .unwrap_or(5000);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!(
                "Address already in use: {}. Stop the existing process or run with --port {} (or set PORT/MARKET_SCOUT_PORT).",
                bind_addr,
                port.saturating_add(1)
            )
        }
        Err(e) => return Err(e.into()),
    };
    info!("market-scout listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).ok();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                if let Some(ref mut s) = sigterm {
                    s.recv().await;
                } else {
                    futures::future::pending::<()>().await;
                }
            } => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    if let Some(session) = state.session.as_ref() {
        session.shutdown().await;
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "market-scout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Collapse an operation outcome onto the HTTP contract: structured JSON for
/// every resolved outcome, 500 only for engine faults.
fn respond<T: Serialize>(
    outcome: Outcome<T>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    outcome.into_json().map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let sort = request.sort.as_deref().unwrap_or("popular");
    let limit = request.limit.unwrap_or(DEFAULT_LISTING_LIMIT);
    respond(search::search(&state, &request.query, sort, limit).await)
}

async fn product_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let Some((id, url)) = product::resolve_product_ref(&state.site, &request.product) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!(
                    "Cannot resolve a product id from `{}`; pass a numeric id or a product URL",
                    request.product
                ),
            }),
        ));
    };
    respond(product::product(&state, &id, &url).await)
}

async fn category_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let sort = request.sort.as_deref().unwrap_or("popular");
    let limit = request.limit.unwrap_or(DEFAULT_LISTING_LIMIT);
    respond(category::category(&state, &request.category, sort, limit).await)
}

async fn reviews_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReviewsRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let limit = request.limit.unwrap_or(DEFAULT_REVIEWS_LIMIT);
    respond(reviews::reviews(&state, &request.product_id, limit).await)
}

async fn sellers_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SellersRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    respond(sellers::sellers(&state, &request.product_id).await)
}

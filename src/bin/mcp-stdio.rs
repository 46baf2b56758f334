use market_scout::stdio_service;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    // MCP hosts may probe stdio servers with `--version`/`--help` before
    // opening a JSON-RPC session; answering keeps compatibility detection
    // from cancelling the session.
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        tracing::info!("version={}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        tracing::info!("market-scout-mcp (MCP stdio server); usage: market-scout-mcp [--version|--help]");
        return Ok(());
    }
    stdio_service::run().await
}

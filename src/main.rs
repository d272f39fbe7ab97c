use std::net::SocketAddr;
use std::sync::Arc;

use transcript_search::config::{ServiceConfig, log_level_from_env};
use transcript_search::router;
use transcript_search::search::service::SearchService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(log_level_from_env())
        .init();

    let mut config = ServiceConfig::from_env();

    let args: Vec<String> = std::env::args().collect();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Usage: {} [--bind <addr:port>]", args[0]);
                    std::process::exit(1);
                };
                let addr: SocketAddr = value.parse()?;
                config.bind_addr = addr;
                i += 2;
            }
            "--help" | "-h" => {
                eprintln!("Usage: {} [--bind <addr:port>]", args[0]);
                eprintln!("Example: {} --bind 127.0.0.1:8000", args[0]);
                return Ok(());
            }
            other => {
                tracing::warn!("Ignoring unknown argument {:?}", other);
                i += 1;
            }
        }
    }

    tracing::info!(
        "Starting transcript search (partitions={}, default_limit={}, max_limit={})",
        config.partitions,
        config.default_limit,
        config.max_limit
    );

    let bind_addr = config.bind_addr;
    let service = Arc::new(SearchService::in_memory(config));
    let app = router(service);

    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing_subscriber::EnvFilter;

use homestay_finder::adapters::cache::memory_cache::MemoryCache;
use homestay_finder::adapters::source::build_source;
use homestay_finder::config::load_config;
use homestay_finder::mcp::server::HomestayMcpServer;
use homestay_finder::ports::cache::CatalogCache;

fn find_config_path() -> PathBuf {
    let candidates = [PathBuf::from("config.yaml"), exe_dir().join("config.yaml")];

    for path in &candidates {
        if path.exists() {
            return path.clone();
        }
    }

    candidates[0].clone()
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries MCP JSON-RPC, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting homestay-finder server");

    let config_path = find_config_path();
    let config = load_config(&config_path)?;

    let cache: Arc<dyn CatalogCache> = Arc::new(MemoryCache::new(config.cache.max_entries));
    let source = build_source(&config.catalog, &config.cache, cache)?;

    let server = HomestayMcpServer::new(source, config.search);

    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}

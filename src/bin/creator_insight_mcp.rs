

use creator_insight::mcp::run_server;
use creator_insight::utils::log_filter;
use tracing_subscriber::{fmt, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP protocol
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    run_server().await
}

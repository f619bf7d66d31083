//! File API Console - Entry point
//!
//! An MCP server for merging, splitting and converting files through a remote
//! file API.

use file_api_console::{run_server_with_config, ClientConfig, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "file_api_console=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting File API Console");

    run_server_with_config(ServerConfig {
        client: ClientConfig::from_env(),
    })
    .await
}

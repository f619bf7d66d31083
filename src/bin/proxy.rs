//! File API passthrough - Entry point
//!
//! Serves `POST /api/merge`, `/api/split` and `/api/convert` and forwards them
//! to the remote file API.

use file_api_console::{run_proxy, ClientConfig, ProxyConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "file_api_console=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ProxyConfig {
        client: ClientConfig::from_env(),
        ..ProxyConfig::default()
    };
    tracing::info!(addr = %config.bind_addr, "Starting File API passthrough");

    run_proxy(config).await
}

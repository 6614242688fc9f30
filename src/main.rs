use anyhow::Result;
use chat_stream_proxy::{config, llm::MODEL_ID, server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Parses a level (`debug`) or a full directive list (`chat_stream_proxy=debug,tower_http=info`).
fn log_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", directives, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing credential is a deployment error: refuse to start
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let directives =
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());
    let filter = match log_filter(&directives) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!(log_filter = %directives, "Starting chat proxy");
    info!(
        base_url = %config.inference.base_url,
        model = MODEL_ID,
        "Inference backend configured"
    );

    server::run(config).await?;

    Ok(())
}

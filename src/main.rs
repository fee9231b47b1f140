use redlens_core::{AppConfig, CoreError};

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            "redlens=debug,api_server=debug,reddit_client=debug,llm_interface=debug,tower_http=info",
        )
        .init();

    tracing::info!("Starting Redlens - Reddit User Analyzer");

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    api_server::start(config).await
}

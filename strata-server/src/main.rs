//! Strata server binary.

use tracing::info;
use tracing_subscriber::EnvFilter;

use strata_server::api;
use strata_server::state::AppState;
use strata_shard::config::ShardConfig;
use strata_shard::registry::ShardRegistry;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ShardConfig::from_env()?;
    info!(
        shards = config.shard_count,
        proxies = config.endpoints.len(),
        "configuration loaded"
    );

    let state = AppState::new(ShardRegistry::new(config));
    let app = api::router(state);

    let port: u16 = match std::env::var("PORT") {
        Ok(raw) => raw.parse()?,
        Err(_) => 3000,
    };
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "strata server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

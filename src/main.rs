use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use gmail_hub::{config::Config, db, routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gmail_hub=debug")),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::connect(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    if let Err(e) = db::seed_user(&pool).await {
        tracing::info!("user seed skipped: {e}");
    }

    // Every outbound Google call inherits this timeout; a hung remote call
    // fails the single step, not the process.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let state = AppState::new(pool, config.clone(), http);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

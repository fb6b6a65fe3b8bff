#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use gmail_hub::config::Config;
use gmail_hub::{db, AppState};

/// Single-connection in-memory pool: each sqlite :memory: connection is its
/// own database, so the pool must never open a second one.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

/// Serve a stub router on an ephemeral local port, returning its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Config with every Google endpoint pointed at the stub server.
pub fn test_config(stub_base: &str) -> Arc<Config> {
    Arc::new(Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        google_client_id: "test-client-id".to_string(),
        google_client_secret: "test-client-secret".to_string(),
        redirect_uri: "http://localhost:3030/oauth/callback".to_string(),
        google_auth_url: format!("{stub_base}/auth"),
        google_token_url: format!("{stub_base}/token"),
        google_userinfo_url: format!("{stub_base}/userinfo"),
        gmail_api_base: stub_base.to_string(),
    })
}

pub fn app_state(pool: SqlitePool, config: Arc<Config>) -> AppState {
    AppState::new(pool, config, reqwest::Client::new())
}

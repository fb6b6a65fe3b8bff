pub mod auth;
pub mod config;
pub mod db;
pub mod gmail;
pub mod models;
pub mod oauth;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::config::Config;
use crate::gmail::GmailClient;
use crate::oauth::OAuthFlow;

#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub oauth: OAuthFlow,
    pub gmail: GmailClient,
}

impl AppState {
    pub fn new(pool: sqlx::SqlitePool, config: Arc<Config>, http: reqwest::Client) -> Self {
        let gmail = GmailClient::new(http.clone(), config.gmail_api_base.clone());
        let oauth = OAuthFlow::new(http, config);
        Self { pool, oauth, gmail }
    }
}

impl axum::extract::FromRef<AppState> for sqlx::SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

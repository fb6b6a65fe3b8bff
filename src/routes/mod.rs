use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod accounts;
pub mod oauth;
pub mod sync;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/url", post(oauth::auth_url))
        .route("/oauth/callback", get(oauth::oauth_callback))
        .route("/sync", post(sync::sync_account))
        .route("/sync/all", post(sync::sync_all))
        .route("/emails", get(sync::list_emails))
        .route("/accounts", get(accounts::list_accounts))
        .route("/accounts/:id", patch(accounts::patch_account))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

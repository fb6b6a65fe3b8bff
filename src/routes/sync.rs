use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::db::queries;
use crate::services::sync_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub gmail_account_id: String,
}

/// POST /sync - Sync one of the caller's accounts
///
/// Accounts belonging to other users resolve to 404, indistinguishable from
/// missing ones.
pub async fn sync_account(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SyncRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let account = queries::get_user_account(&state.pool, &req.gmail_account_id, &user.user_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Gmail account not found".to_string()))?;

    let report = sync_service::sync_account(&state.pool, &state.oauth, &state.gmail, &account)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, format!("{e:#}")))?;

    Ok(Json(json!({
        "success": true,
        "synced": report.synced,
        "total": report.total,
    })))
}

/// POST /sync/all - Sequential sync across the caller's active accounts
pub async fn sync_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, (StatusCode, String)> {
    let outcomes =
        sync_service::sync_all_accounts(&state.pool, &state.oauth, &state.gmail, &user.user_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "results": outcomes,
    })))
}

#[derive(Debug, Deserialize)]
pub struct EmailsQuery {
    pub account_id: Option<String>,
}

/// GET /emails - Stored emails for the caller, newest first
pub async fn list_emails(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<EmailsQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let emails = queries::list_emails_for_user(
        &state.pool,
        &user.user_id,
        params.account_id.as_deref(),
        50,
    )
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({
        "count": emails.len(),
        "emails": emails,
    })))
}

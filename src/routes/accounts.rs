/// Account registry endpoints. Credentials never leave this layer; the
/// response shape carries only what the dashboard renders.
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::auth::AuthUser;
use crate::db::queries;
use crate::models::GmailAccount;

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub email_address: String,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub last_sync: Option<i64>,
    pub created_at: i64,
}

impl From<GmailAccount> for AccountResponse {
    fn from(acc: GmailAccount) -> Self {
        Self {
            id: acc.id,
            email_address: acc.email_address,
            display_name: acc.display_name,
            is_active: acc.is_active,
            last_sync: acc.last_sync,
            created_at: acc.created_at,
        }
    }
}

/// GET /accounts - The caller's linked accounts
pub async fn list_accounts(
    State(pool): State<SqlitePool>,
    user: AuthUser,
) -> Result<Json<Vec<AccountResponse>>, StatusCode> {
    match queries::list_accounts_for_user(&pool, &user.user_id).await {
        Ok(accounts) => Ok(Json(accounts.into_iter().map(Into::into).collect())),
        Err(e) => {
            tracing::error!("failed to list accounts: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PatchAccountRequest {
    pub is_active: bool,
}

/// PATCH /accounts/:id - Activate or deactivate an account
///
/// Accounts are never hard-deleted; deactivation takes them out of the
/// sync-all rotation while keeping their stored mail readable.
pub async fn patch_account(
    State(pool): State<SqlitePool>,
    user: AuthUser,
    Path(account_id): Path<String>,
    Json(req): Json<PatchAccountRequest>,
) -> Result<Json<AccountResponse>, StatusCode> {
    let updated = queries::set_account_active(&pool, &account_id, &user.user_id, req.is_active)
        .await
        .map_err(|e| {
            tracing::error!("failed to update account: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    if !updated {
        return Err(StatusCode::NOT_FOUND);
    }

    match queries::get_user_account(&pool, &account_id, &user.user_id).await {
        Ok(Some(account)) => Ok(Json(account.into())),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

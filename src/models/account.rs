use serde::{Deserialize, Serialize};

/// A linked Gmail account. At most one row per (user_id, email_address),
/// enforced by the schema and created via atomic upsert.
///
/// Token fields are written by the OAuth flow, `last_sync` by the sync
/// engine; neither is ever serialized out to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GmailAccount {
    pub id: String,
    pub user_id: String,
    pub email_address: String,
    pub display_name: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    #[serde(skip_serializing)]
    pub token_expires_at: i64,
    pub is_active: bool,
    pub last_sync: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl GmailAccount {
    pub fn token_expired(&self, now: i64) -> bool {
        self.token_expires_at <= now
    }
}

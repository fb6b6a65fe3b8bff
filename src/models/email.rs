use serde::{Deserialize, Serialize};

/// A stored email row. Rows are written once on first sight of a Gmail
/// message id and not updated afterwards (flag changes on the provider side
/// are not re-synced).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Email {
    pub id: i64,
    pub gmail_account_id: String,
    pub gmail_message_id: String,
    pub thread_id: String,
    pub subject: String,
    pub sender: String,
    pub recipient: String,
    pub body_text: String,
    pub body_html: String,
    pub body_preview: String,
    pub is_read: bool,
    pub is_starred: bool,
    pub is_important: bool,
    /// JSON array of provider label strings, as stored.
    pub labels: String,
    pub received_at: Option<i64>,
    pub synced_at: i64,
}

impl Email {
    pub fn labels(&self) -> Vec<String> {
        serde_json::from_str(&self.labels).unwrap_or_default()
    }
}

/// Normalizer output: an email ready for insertion, minus the row id and
/// owning account id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmail {
    pub gmail_message_id: String,
    pub thread_id: String,
    pub subject: String,
    pub sender: String,
    pub recipient: String,
    pub body_text: String,
    pub body_html: String,
    pub body_preview: String,
    pub is_read: bool,
    pub is_starred: bool,
    pub is_important: bool,
    pub labels: Vec<String>,
    pub received_at: Option<i64>,
}

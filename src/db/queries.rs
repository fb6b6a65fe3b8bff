use anyhow::Result;
use sqlx::SqlitePool;

use crate::db::now_epoch;
use crate::models::{Email, GmailAccount, NewEmail};

/// Resolve a bearer credential to a user id. Returns None for unknown tokens.
pub async fn find_user_by_token(pool: &SqlitePool, token: &str) -> Result<Option<String>> {
    let id = sqlx::query_scalar("SELECT id FROM users WHERE api_token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

pub async fn create_user(pool: &SqlitePool, email: &str, api_token: &str) -> Result<String> {
    let id = uuid::Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO users (id, email, api_token) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(email)
        .bind(api_token)
        .execute(pool)
        .await?;
    Ok(id)
}

/// Atomic upsert keyed on (user_id, email_address). Re-linking an already
/// linked address replaces the stored credentials and reactivates the
/// account instead of creating a second row.
pub async fn upsert_account(
    pool: &SqlitePool,
    user_id: &str,
    email_address: &str,
    display_name: Option<&str>,
    access_token: &str,
    refresh_token: &str,
    token_expires_at: i64,
) -> Result<GmailAccount> {
    let now = now_epoch();
    sqlx::query(
        r#"
        INSERT INTO gmail_accounts (
            id, user_id, email_address, display_name,
            access_token, refresh_token, token_expires_at,
            is_active, last_sync, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, 1, NULL, ?, ?)
        ON CONFLICT(user_id, email_address) DO UPDATE SET
            display_name = excluded.display_name,
            access_token = excluded.access_token,
            refresh_token = excluded.refresh_token,
            token_expires_at = excluded.token_expires_at,
            is_active = 1,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(email_address)
    .bind(display_name)
    .bind(access_token)
    .bind(refresh_token)
    .bind(token_expires_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let account = sqlx::query_as::<_, GmailAccount>(
        "SELECT * FROM gmail_accounts WHERE user_id = ? AND email_address = ?",
    )
    .bind(user_id)
    .bind(email_address)
    .fetch_one(pool)
    .await?;
    Ok(account)
}

pub async fn get_account(pool: &SqlitePool, account_id: &str) -> Result<Option<GmailAccount>> {
    let account = sqlx::query_as::<_, GmailAccount>("SELECT * FROM gmail_accounts WHERE id = ?")
        .bind(account_id)
        .fetch_optional(pool)
        .await?;
    Ok(account)
}

/// Ownership-scoped lookup: an account belonging to another user resolves to
/// None so callers cannot tell it apart from a missing one.
pub async fn get_user_account(
    pool: &SqlitePool,
    account_id: &str,
    user_id: &str,
) -> Result<Option<GmailAccount>> {
    let account = sqlx::query_as::<_, GmailAccount>(
        "SELECT * FROM gmail_accounts WHERE id = ? AND user_id = ?",
    )
    .bind(account_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(account)
}

pub async fn list_accounts_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<GmailAccount>> {
    let accounts = sqlx::query_as::<_, GmailAccount>(
        "SELECT * FROM gmail_accounts WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(accounts)
}

pub async fn update_account_tokens(
    pool: &SqlitePool,
    account_id: &str,
    access_token: &str,
    token_expires_at: i64,
) -> Result<()> {
    sqlx::query(
        "UPDATE gmail_accounts SET access_token = ?, token_expires_at = ?, updated_at = ? WHERE id = ?",
    )
    .bind(access_token)
    .bind(token_expires_at)
    .bind(now_epoch())
    .bind(account_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn touch_last_sync(pool: &SqlitePool, account_id: &str) -> Result<()> {
    sqlx::query("UPDATE gmail_accounts SET last_sync = ?, updated_at = ? WHERE id = ?")
        .bind(now_epoch())
        .bind(now_epoch())
        .bind(account_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_account_active(
    pool: &SqlitePool,
    account_id: &str,
    user_id: &str,
    active: bool,
) -> Result<bool> {
    let rows = sqlx::query(
        "UPDATE gmail_accounts SET is_active = ?, updated_at = ? WHERE id = ? AND user_id = ?",
    )
    .bind(active)
    .bind(now_epoch())
    .bind(account_id)
    .bind(user_id)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(rows > 0)
}

/// Idempotent insert: the UNIQUE(gmail_account_id, gmail_message_id)
/// constraint makes a concurrent duplicate a no-op instead of a second row.
/// Returns true only when a row was actually inserted.
pub async fn insert_email(
    pool: &SqlitePool,
    gmail_account_id: &str,
    email: &NewEmail,
) -> Result<bool> {
    let labels_json = serde_json::to_string(&email.labels)?;
    let rows = sqlx::query(
        r#"
        INSERT OR IGNORE INTO emails (
            gmail_account_id, gmail_message_id, thread_id,
            subject, sender, recipient,
            body_text, body_html, body_preview,
            is_read, is_starred, is_important, labels,
            received_at, synced_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(gmail_account_id)
    .bind(&email.gmail_message_id)
    .bind(&email.thread_id)
    .bind(&email.subject)
    .bind(&email.sender)
    .bind(&email.recipient)
    .bind(&email.body_text)
    .bind(&email.body_html)
    .bind(&email.body_preview)
    .bind(email.is_read)
    .bind(email.is_starred)
    .bind(email.is_important)
    .bind(&labels_json)
    .bind(email.received_at)
    .bind(now_epoch())
    .execute(pool)
    .await?
    .rows_affected();
    Ok(rows > 0)
}

pub async fn count_emails_for_account(pool: &SqlitePool, account_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM emails WHERE gmail_account_id = ?")
        .bind(account_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn list_emails_for_user(
    pool: &SqlitePool,
    user_id: &str,
    account_id: Option<&str>,
    limit: i64,
) -> Result<Vec<Email>> {
    let emails = match account_id {
        Some(account_id) => {
            sqlx::query_as::<_, Email>(
                r#"
                SELECT e.* FROM emails e
                JOIN gmail_accounts a ON a.id = e.gmail_account_id
                WHERE a.user_id = ? AND e.gmail_account_id = ?
                ORDER BY e.received_at DESC
                LIMIT ?
                "#,
            )
            .bind(user_id)
            .bind(account_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Email>(
                r#"
                SELECT e.* FROM emails e
                JOIN gmail_accounts a ON a.id = e.gmail_account_id
                WHERE a.user_id = ?
                ORDER BY e.received_at DESC
                LIMIT ?
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(emails)
}

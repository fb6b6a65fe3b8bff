//! Sync engine: one account per invocation, sequential message processing.
//!
//! Per-message failures are logged and skipped so a single bad message never
//! aborts the batch; the `{synced, total}` report lets callers distinguish
//! partial success from nothing-happened.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::queries;
use crate::gmail::{normalize, GmailClient, MessageRef};
use crate::models::GmailAccount;
use crate::oauth::OAuthFlow;

/// One listing page; no pagination follow-up.
pub const LIST_PAGE_SIZE: u32 = 50;
/// Throughput cap per sync call, bounding latency and API cost.
pub const MESSAGES_PER_SYNC: usize = 20;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SyncReport {
    pub synced: u32,
    pub total: u32,
}

/// Result of one account within a sync-all fan-out. Individual account
/// failures are reported inline rather than aborting the loop.
#[derive(Debug, Serialize)]
pub struct AccountSyncOutcome {
    pub account_id: String,
    pub email_address: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn sync_account(
    pool: &SqlitePool,
    oauth: &OAuthFlow,
    gmail: &GmailClient,
    account: &GmailAccount,
) -> Result<SyncReport> {
    let start = std::time::Instant::now();
    info!(account = %account.email_address, "starting inbox sync");

    let token = oauth
        .ensure_fresh_token(pool, account)
        .await
        .context("could not obtain a fresh access token")?;

    // A failed listing leaves last_sync untouched: no processing has begun.
    let listed = gmail
        .list_inbox(&token, LIST_PAGE_SIZE)
        .await
        .context("inbox listing failed")?;
    let total = listed.len() as u32;

    let mut synced = 0u32;
    for msg_ref in listed.iter().take(MESSAGES_PER_SYNC) {
        match sync_message(pool, gmail, &token, account, msg_ref).await {
            Ok(true) => synced += 1,
            Ok(false) => {}
            Err(e) => warn!(message_id = %msg_ref.id, "skipping message: {e:#}"),
        }
    }

    // Best-effort progress: last_sync advances even when some fetches failed.
    queries::touch_last_sync(pool, &account.id).await?;

    info!(
        account = %account.email_address,
        synced,
        total,
        duration_ms = start.elapsed().as_millis() as u64,
        "inbox sync finished"
    );
    Ok(SyncReport { synced, total })
}

/// Fetch, normalize, and store one message. Returns false when the message
/// was already present (the insert is idempotent).
async fn sync_message(
    pool: &SqlitePool,
    gmail: &GmailClient,
    token: &str,
    account: &GmailAccount,
    msg_ref: &MessageRef,
) -> Result<bool> {
    let message = gmail.get_message(token, &msg_ref.id).await?;
    let email = normalize::normalize(&message);
    queries::insert_email(pool, &account.id, &email).await
}

/// Sequential fan-out over a user's active accounts ("Sync All").
pub async fn sync_all_accounts(
    pool: &SqlitePool,
    oauth: &OAuthFlow,
    gmail: &GmailClient,
    user_id: &str,
) -> Result<Vec<AccountSyncOutcome>> {
    let accounts = queries::list_accounts_for_user(pool, user_id).await?;

    let mut outcomes = Vec::new();
    for account in accounts.iter().filter(|a| a.is_active) {
        let outcome = match sync_account(pool, oauth, gmail, account).await {
            Ok(report) => AccountSyncOutcome {
                account_id: account.id.clone(),
                email_address: account.email_address.clone(),
                success: true,
                synced: Some(report.synced),
                total: Some(report.total),
                error: None,
            },
            Err(e) => {
                warn!(account = %account.email_address, "sync failed: {e:#}");
                AccountSyncOutcome {
                    account_id: account.id.clone(),
                    email_address: account.email_address.clone(),
                    success: false,
                    synced: None,
                    total: None,
                    error: Some(format!("{e:#}")),
                }
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

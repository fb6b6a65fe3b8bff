//! OAuth flow controller: authorization URL construction, code exchange,
//! profile fetch, and refresh-token grants with write-through persistence.

use std::sync::Arc;

use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::db::{self, queries};
use crate::models::GmailAccount;

/// Fixed scope set: read mail, send mail, profile email.
const SCOPES: &str = "https://www.googleapis.com/auth/gmail.readonly \
                      https://www.googleapis.com/auth/gmail.send \
                      https://www.googleapis.com/auth/userinfo.email";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("token endpoint returned no access token: {0}")]
    Exchange(String),
    #[error("profile fetch failed: {0}")]
    Profile(String),
    #[error("token request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Raw token endpoint response. `access_token` absent means the grant was
/// rejected; `error_description` carries the provider's reason.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Absolute expiry, epoch seconds.
    pub expires_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct OAuthFlow {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl OAuthFlow {
    pub fn new(http: reqwest::Client, config: Arc<Config>) -> Self {
        Self { http, config }
    }

    /// Authorization endpoint URL. `prompt=consent` forces a refresh token
    /// on every authorization; `state` carries the user id and is the only
    /// binding between callback and user.
    pub fn authorization_url(&self, user_id: &str) -> Url {
        let mut url = Url::parse(&self.config.google_auth_url)
            .expect("google_auth_url is validated at startup");
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.google_client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", SCOPES)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", user_id);
        url
    }

    /// Authorization-code grant.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, OAuthError> {
        let params = [
            ("client_id", self.config.google_client_id.as_str()),
            ("client_secret", self.config.google_client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        self.request_token(&params).await
    }

    /// Refresh-token grant. Google does not re-issue the refresh token here.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError> {
        let params = [
            ("client_id", self.config.google_client_id.as_str()),
            ("client_secret", self.config.google_client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        self.request_token(&params).await
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenGrant, OAuthError> {
        let resp: TokenEndpointResponse = self
            .http
            .post(&self.config.google_token_url)
            .form(params)
            .send()
            .await?
            .json()
            .await?;

        let Some(access_token) = resp.access_token else {
            let reason = resp
                .error_description
                .or(resp.error)
                .unwrap_or_else(|| "no error detail".to_string());
            return Err(OAuthError::Exchange(reason));
        };

        Ok(TokenGrant {
            access_token,
            refresh_token: resp.refresh_token,
            expires_at: db::now_epoch() + resp.expires_in.unwrap_or(3600),
        })
    }

    /// Profile of the just-authorized account, fetched with its new token.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<Profile, OAuthError> {
        let resp = self
            .http
            .get(&self.config.google_userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(OAuthError::Profile(format!(
                "userinfo endpoint returned {}",
                resp.status()
            )));
        }
        resp.json::<Profile>()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))
    }

    /// Returns a usable access token for the account, refreshing and
    /// persisting first when the stored one has expired. The new token is
    /// written through before it is handed out, so a crash afterwards can
    /// only leave the prior token authoritative.
    pub async fn ensure_fresh_token(
        &self,
        pool: &SqlitePool,
        account: &GmailAccount,
    ) -> Result<String, OAuthError> {
        if !account.token_expired(db::now_epoch()) {
            return Ok(account.access_token.clone());
        }

        tracing::debug!(account = %account.email_address, "access token expired, refreshing");
        let grant = self.refresh_access_token(&account.refresh_token).await?;
        queries::update_account_tokens(pool, &account.id, &grant.access_token, grant.expires_at)
            .await?;
        Ok(grant.access_token)
    }
}

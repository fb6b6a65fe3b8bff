use anyhow::{Context, Result};
use std::env;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub redirect_uri: String,
    // Google endpoints are overridable so tests can point at a stub server.
    pub google_auth_url: String,
    pub google_token_url: String,
    pub google_userinfo_url: String,
    pub gmail_api_base: String,
}

impl Config {
    /// Missing Google credentials are fatal at startup; nothing downstream
    /// retries a misconfigured client id/secret.
    pub fn from_env() -> Result<Self> {
        let google_client_id =
            env::var("GOOGLE_CLIENT_ID").context("GOOGLE_CLIENT_ID must be set")?;
        let google_client_secret =
            env::var("GOOGLE_CLIENT_SECRET").context("GOOGLE_CLIENT_SECRET must be set")?;
        let redirect_uri = env::var("OAUTH_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:3030/oauth/callback".to_string());
        let google_auth_url =
            env::var("GOOGLE_AUTH_URL").unwrap_or_else(|_| GOOGLE_AUTH_URL.to_string());
        url::Url::parse(&google_auth_url).context("GOOGLE_AUTH_URL is not a valid URL")?;

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://gmail_hub.db".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3030".to_string()),
            google_client_id,
            google_client_secret,
            redirect_uri,
            google_auth_url,
            google_token_url: env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| GOOGLE_TOKEN_URL.to_string()),
            google_userinfo_url: env::var("GOOGLE_USERINFO_URL")
                .unwrap_or_else(|_| GOOGLE_USERINFO_URL.to_string()),
            gmail_api_base: env::var("GMAIL_API_BASE")
                .unwrap_or_else(|_| GMAIL_API_BASE.to_string()),
        })
    }
}

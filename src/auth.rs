//! Bearer-credential extraction. Tokens are opaque and resolved against the
//! users table per request; requests without a valid token never reach the
//! core handlers.

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use sqlx::SqlitePool;

use crate::db::queries;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    "Missing authorization header".to_string(),
                )
            })?;
        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                "Authorization header is not a bearer token".to_string(),
            )
        })?;

        let pool = SqlitePool::from_ref(state);
        match queries::find_user_by_token(&pool, token).await {
            Ok(Some(user_id)) => Ok(AuthUser { user_id }),
            Ok(None) => Err((StatusCode::UNAUTHORIZED, "Invalid token".to_string())),
            Err(e) => {
                tracing::error!("token lookup failed: {e}");
                Err((StatusCode::INTERNAL_SERVER_ERROR, "auth failure".to_string()))
            }
        }
    }
}

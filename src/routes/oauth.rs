use axum::{
    extract::{Query, State},
    response::{Html, Json},
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::auth::AuthUser;
use crate::db::queries;
use crate::oauth::{OAuthError, OAuthFlow, Profile};
use crate::AppState;

/// POST /auth/url - Authorization URL for the OAuth popup
pub async fn auth_url(State(state): State<AppState>, user: AuthUser) -> Json<Value> {
    let url = state.oauth.authorization_url(&user.user_id);
    Json(json!({ "authUrl": url.to_string() }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /oauth/callback - Browser redirect target from Google
///
/// Always answers with an HTML page whose only job is to postMessage the
/// outcome to the opener window and close itself; there is no JSON body on
/// this path.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackQuery>,
) -> Html<String> {
    if let Some(error) = params.error {
        return popup_page(json!({ "error": error }));
    }
    let (Some(code), Some(user_id)) = (params.code, params.state) else {
        return popup_page(json!({ "error": "Missing code or state" }));
    };

    match link_account(&state.pool, &state.oauth, &code, &user_id).await {
        Ok(profile) => {
            tracing::info!(email = %profile.email, "gmail account linked");
            popup_page(json!({
                "success": true,
                "email": profile.email,
                "name": profile.name,
            }))
        }
        Err(e) => {
            tracing::error!("oauth callback failed: {e}");
            popup_page(json!({ "error": e.to_string() }))
        }
    }
}

/// Exchange the code, fetch the profile, and upsert the account keyed on
/// (state user id, profile email). Re-linking an existing address updates
/// the stored credentials instead of adding a row.
async fn link_account(
    pool: &SqlitePool,
    flow: &OAuthFlow,
    code: &str,
    user_id: &str,
) -> Result<Profile, OAuthError> {
    let grant = flow.exchange_code(code).await?;
    let profile = flow.fetch_profile(&grant.access_token).await?;
    queries::upsert_account(
        pool,
        user_id,
        &profile.email,
        profile.name.as_deref(),
        &grant.access_token,
        grant.refresh_token.as_deref().unwrap_or_default(),
        grant.expires_at,
    )
    .await?;
    Ok(profile)
}

/// Self-closing popup page. The payload is embedded as JSON; `<` is escaped
/// so provider-supplied strings cannot break out of the script tag.
fn popup_page(payload: Value) -> Html<String> {
    let payload = payload.to_string().replace('<', "\\u003c");
    Html(format!(
        r#"<!DOCTYPE html>
<html>
  <body>
    <p>You can close this window.</p>
    <script>
      if (window.opener) {{
        window.opener.postMessage({payload}, '*');
      }}
      window.close();
    </script>
  </body>
</html>
"#
    ))
}

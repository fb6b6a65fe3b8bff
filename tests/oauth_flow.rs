mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use gmail_hub::db::{self, queries};
use gmail_hub::routes;

use common::{app_state, spawn_server, test_config, test_pool};

/// Stub Google: token endpoint and userinfo endpoint.
fn google_stub() -> Router {
    async fn token() -> Json<Value> {
        Json(json!({
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "expires_in": 3600
        }))
    }
    async fn userinfo() -> Json<Value> {
        Json(json!({ "email": "linked@gmail.com", "name": "Linked Account" }))
    }
    Router::new()
        .route("/token", post(token))
        .route("/userinfo", get(userinfo))
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn auth_url_requires_bearer_credential() {
    let base = spawn_server(google_stub()).await;
    let pool = test_pool().await;
    let app = routes::router(app_state(pool, test_config(&base)));

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/url")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn auth_url_carries_offline_consent_and_state() {
    let base = spawn_server(google_stub()).await;
    let pool = test_pool().await;
    let user = queries::create_user(&pool, "me@example.com", "secret").await.unwrap();
    let app = routes::router(app_state(pool, test_config(&base)));

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/url")
                .header(header::AUTHORIZATION, "Bearer secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_string(resp).await).unwrap();
    let auth_url = body["authUrl"].as_str().unwrap();
    assert!(auth_url.contains("access_type=offline"));
    assert!(auth_url.contains("prompt=consent"));
    assert!(auth_url.contains(&format!("state={user}")));
    assert!(auth_url.contains("response_type=code"));
}

#[tokio::test]
async fn callback_links_account_and_upsert_is_idempotent() {
    let base = spawn_server(google_stub()).await;
    let pool = test_pool().await;
    let user = queries::create_user(&pool, "me@example.com", "secret").await.unwrap();
    let app = routes::router(app_state(pool.clone(), test_config(&base)));

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/oauth/callback?code=abc&state={user}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("postMessage"));
    assert!(html.contains("linked@gmail.com"));
    assert!(html.contains("\"success\":true"));

    // A second authorization for the same address must not add a row.
    let resp = app
        .oneshot(
            Request::builder()
                .uri(format!("/oauth/callback?code=def&state={user}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let accounts = queries::list_accounts_for_user(&pool, &user).await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].email_address, "linked@gmail.com");
    assert_eq!(accounts[0].access_token, "at-1");
    assert!(accounts[0].token_expires_at > db::now_epoch());
}

#[tokio::test]
async fn callback_reports_provider_error_to_opener() {
    let base = spawn_server(google_stub()).await;
    let pool = test_pool().await;
    let app = routes::router(app_state(pool.clone(), test_config(&base)));

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/oauth/callback?error=access_denied")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("access_denied"));
}

#[tokio::test]
async fn callback_surfaces_rejected_code_exchange() {
    async fn reject() -> Json<Value> {
        Json(json!({ "error": "invalid_grant", "error_description": "Bad authorization code" }))
    }
    let stub = Router::new().route("/token", post(reject));
    let base = spawn_server(stub).await;
    let pool = test_pool().await;
    let user = queries::create_user(&pool, "me@example.com", "secret").await.unwrap();
    let app = routes::router(app_state(pool.clone(), test_config(&base)));

    let resp = app
        .oneshot(
            Request::builder()
                .uri(format!("/oauth/callback?code=bogus&state={user}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Bad authorization code"));
    assert!(queries::list_accounts_for_user(&pool, &user).await.unwrap().is_empty());
}

#[tokio::test]
async fn sync_does_not_reveal_other_users_accounts() {
    let base = spawn_server(google_stub()).await;
    let pool = test_pool().await;
    let alice = queries::create_user(&pool, "alice@example.com", "alice-tok").await.unwrap();
    queries::create_user(&pool, "bob@example.com", "bob-tok").await.unwrap();
    let account = queries::upsert_account(
        &pool,
        &alice,
        "a@gmail.com",
        None,
        "at",
        "rt",
        db::now_epoch() + 3600,
    )
    .await
    .unwrap();
    let app = routes::router(app_state(pool, test_config(&base)));

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sync")
                .header(header::AUTHORIZATION, "Bearer bob-tok")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "gmail_account_id": account.id }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn accounts_listing_hides_credentials() {
    let base = spawn_server(google_stub()).await;
    let pool = test_pool().await;
    let user = queries::create_user(&pool, "me@example.com", "secret").await.unwrap();
    queries::upsert_account(&pool, &user, "a@gmail.com", None, "top-secret-at", "rt", 100)
        .await
        .unwrap();
    let app = routes::router(app_state(pool, test_config(&base)));

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/accounts")
                .header(header::AUTHORIZATION, "Bearer secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("a@gmail.com"));
    assert!(!body.contains("top-secret-at"));
}

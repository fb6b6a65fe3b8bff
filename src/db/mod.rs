use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod queries;

/// Migration files are embedded so the binary and the test suites run the
/// same schema without depending on the working directory.
const MIGRATIONS: &[&str] = &[include_str!("../../migrations/0001_init.sql")];

pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(opts).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    for file in MIGRATIONS {
        // sqlx prepares one statement at a time
        for stmt in file.split(';') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            sqlx::query(stmt).execute(pool).await?;
        }
    }
    Ok(())
}

/// Seed a local user from HUB_USER_EMAIL / HUB_USER_TOKEN for development
/// setups without a separate signup flow.
pub async fn seed_user(pool: &SqlitePool) -> Result<()> {
    let email = std::env::var("HUB_USER_EMAIL")?;
    let token = std::env::var("HUB_USER_TOKEN")?;
    sqlx::query("INSERT OR IGNORE INTO users (id, email, api_token) VALUES (?, ?, ?)")
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&email)
        .bind(&token)
        .execute(pool)
        .await?;
    Ok(())
}

pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

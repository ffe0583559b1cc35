//! Database module for the SQLite-backed gateway.
//!
//! SQLite is the source of truth when the service runs with `DASHBOARD_GATEWAY=sqlite`.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Create the dashboard tables if they don't exist.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Single-row tables: the dashboard belongs to one member
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profile (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            avatar TEXT NOT NULL,
            level INTEGER NOT NULL,
            current_xp INTEGER NOT NULL,
            target_xp INTEGER NOT NULL,
            title TEXT NOT NULL,
            member_since TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS reward_points (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            current INTEGER NOT NULL,
            lifetime INTEGER NOT NULL,
            this_month INTEGER NOT NULL,
            last_month INTEGER NOT NULL,
            trend TEXT NOT NULL,
            next_milestone INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS benefits (
            id TEXT PRIMARY KEY,
            position INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            icon TEXT NOT NULL,
            value TEXT NOT NULL,
            category TEXT NOT NULL,
            claimed INTEGER NOT NULL DEFAULT 0,
            expiry_date TEXT NOT NULL,
            terms TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS claims (
            id TEXT PRIMARY KEY,
            benefit_id TEXT NOT NULL REFERENCES benefits(id),
            claimed_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_benefits_position ON benefits(position);
        CREATE INDEX IF NOT EXISTS idx_claims_benefit_id ON claims(benefit_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

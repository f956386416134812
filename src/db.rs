//! SQLite pool construction and schema migration.

use anyhow::{Context, Result};
use sqlx::{
    SqlitePool, Transaction,
    sqlite::{Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr, time::Duration};

const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// How long a connection waits for the write lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a pool against `database_url`, creating the database file and its
/// parent directory when they do not exist yet.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    if let Some(path) = database_path(database_url) {
        tracing::debug!("Interpreted SQLite path => {}", path.display());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating directory {}", parent.display()))?;
                tracing::info!("Created missing directory {:?}", parent);
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("parsing database url `{}`", database_url))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await
        .context("connecting to SQLite")
}

/// Start a transaction that holds the write lock from its first statement.
///
/// A deferred transaction that reads before it writes cannot wait for the
/// lock upgrade: SQLite fails it with `SQLITE_BUSY` straight away. Taking the
/// lock in `BEGIN IMMEDIATE` lets the busy timeout queue writers instead.
pub async fn begin_write(db: &SqlitePool) -> sqlx::Result<Transaction<'static, Sqlite>> {
    db.begin_with("BEGIN IMMEDIATE").await
}

/// Apply the embedded schema. Every statement is idempotent, so this runs on
/// each start.
pub async fn run_migrations(db: &SqlitePool) -> Result<()> {
    let statements = SCHEMA
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt)
            .execute(db)
            .await
            .with_context(|| format!("executing migration statement `{}`", stmt))?;
    }

    Ok(())
}

/// Local file path behind a SQLite URL, or `None` for in-memory databases.
fn database_path(database_url: &str) -> Option<&Path> {
    let raw = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    let raw = raw.split('?').next().unwrap_or(raw);
    if raw.is_empty() || raw.contains(":memory:") {
        None
    } else {
        Some(Path::new(raw))
    }
}

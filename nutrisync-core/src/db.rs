//! SQLite pool setup for the local cache and the remote store.
//!
//! Both stores are SQLite. The remote store accepts `sqlite:` URLs only.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Opens (creating if needed) the on-device cache database and applies its
/// migrations.
pub async fn init_cache_db(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations/cache").run(&pool).await?;

    Ok(pool)
}

/// Connects to the remote relational store and applies its schema.
///
/// Only SQLite connection URLs are accepted, e.g.
/// `sqlite:/var/lib/nutrisync/remote.db`. A `postgres:` URL fails to parse.
pub async fn init_remote_db(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations/remote").run(&pool).await?;

    Ok(pool)
}

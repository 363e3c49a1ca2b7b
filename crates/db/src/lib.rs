//! Batch record store: one SQLite file per batch directory.
//!
//! The schema is fixed for on-disk compatibility with existing batches:
//! `image_records(id, image_path, artist_file, artist_prompt, prompt_file,
//! prompt_text, combined_prompt, generation_time)`. Rows are insert-only.

use std::path::{Path, PathBuf};
use std::time::Duration;

use artgrid_core::naming::RECORD_STORE_FILENAME;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::SqlitePool;

/// Writers from several workers queue on SQLite's lock for at most this long.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Connections per batch pool. Writes serialize on the file lock regardless.
const MAX_CONNECTIONS: u32 = 4;

const CREATE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS image_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_path TEXT NOT NULL,
    artist_file TEXT NOT NULL,
    artist_prompt TEXT NOT NULL,
    prompt_file TEXT NOT NULL,
    prompt_text TEXT NOT NULL,
    combined_prompt TEXT NOT NULL,
    generation_time TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// Path of the record store inside a batch directory.
pub fn record_store_path(batch_dir: &Path) -> PathBuf {
    batch_dir.join(RECORD_STORE_FILENAME)
}

fn connect_options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .busy_timeout(BUSY_TIMEOUT)
}

/// Open (creating if missing) the record store of `batch_dir` and ensure its
/// schema exists. Idempotent.
pub async fn open_record_store(batch_dir: &Path) -> Result<DbPool, sqlx::Error> {
    let path = record_store_path(batch_dir);
    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(
            connect_options(&path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Delete),
        )
        .await?;

    sqlx::query(CREATE_SCHEMA).execute(&pool).await?;
    tracing::debug!(path = %path.display(), "Record store opened");
    Ok(pool)
}

/// Open an existing record store without write access.
///
/// Returns `Ok(None)` when the batch has no record store.
pub async fn open_existing(batch_dir: &Path) -> Result<Option<DbPool>, sqlx::Error> {
    let path = record_store_path(batch_dir);
    if !path.is_file() {
        return Ok(None);
    }
    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(connect_options(&path).read_only(true))
        .await?;
    Ok(Some(pool))
}

/// Verify the store answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

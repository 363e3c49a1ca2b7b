//! Repository for the `image_records` table.

use artgrid_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::image_record::{CreateImageRecord, ImageRecord};

/// Column list for image_records queries.
const COLUMNS: &str = "id, image_path, artist_file, artist_prompt, prompt_file, \
    prompt_text, combined_prompt, generation_time";

/// The two axes of the style × prompt grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAxis {
    Artist,
    Prompt,
}

impl RecordAxis {
    fn column(self) -> &'static str {
        match self {
            Self::Artist => "artist_prompt",
            Self::Prompt => "prompt_text",
        }
    }
}

/// Insert and read operations for generation records. Records are never updated.
pub struct ImageRecordRepo;

impl ImageRecordRepo {
    /// Append a record, returning the assigned id. A single INSERT is atomic.
    pub async fn create(pool: &SqlitePool, input: &CreateImageRecord) -> Result<DbId, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO image_records
                (image_path, artist_file, artist_prompt, prompt_file, prompt_text, combined_prompt)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.image_path)
        .bind(&input.artist_file)
        .bind(&input.artist_prompt)
        .bind(&input.prompt_file)
        .bind(&input.prompt_text)
        .bind(&input.combined_prompt)
        .execute(pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Find a record by its primary key.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<ImageRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM image_records WHERE id = ?");
        sqlx::query_as::<_, ImageRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All records in insertion order.
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<ImageRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM image_records ORDER BY id");
        sqlx::query_as::<_, ImageRecord>(&query).fetch_all(pool).await
    }

    /// Stored image paths in insertion order, optionally limited to the first `limit`.
    pub async fn list_image_paths(
        pool: &SqlitePool,
        limit: Option<i64>,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = match limit {
            Some(limit) => {
                sqlx::query_as("SELECT image_path FROM image_records ORDER BY id LIMIT ?")
                    .bind(limit)
                    .fetch_all(pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT image_path FROM image_records ORDER BY id")
                    .fetch_all(pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(|(path,)| path).collect())
    }

    /// Distinct values of one grid axis, descending.
    pub async fn distinct(pool: &SqlitePool, axis: RecordAxis) -> Result<Vec<String>, sqlx::Error> {
        let column = axis.column();
        let query = format!("SELECT DISTINCT {column} FROM image_records ORDER BY {column} DESC");
        let rows: Vec<(String,)> = sqlx::query_as(&query).fetch_all(pool).await?;
        Ok(rows.into_iter().map(|(value,)| value).collect())
    }

    /// Image path of the cell `(artist, prompt)`; the earliest record wins
    /// if a cell was written more than once.
    pub async fn find_cell(
        pool: &SqlitePool,
        artist: &str,
        prompt: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT image_path FROM image_records
             WHERE artist_prompt = ? AND prompt_text = ?
             ORDER BY id
             LIMIT 1",
        )
        .bind(artist)
        .bind(prompt)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(path,)| path))
    }

    /// Number of records in the batch.
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM image_records")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

//! Generation record model and insert DTO.

use artgrid_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An immutable row from `image_records`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImageRecord {
    pub id: DbId,
    /// File name relative to the batch directory.
    pub image_path: String,
    /// Identifier of the style list the style came from.
    pub artist_file: String,
    pub artist_prompt: String,
    /// Identifier of the prompt list the prompt came from.
    pub prompt_file: String,
    pub prompt_text: String,
    pub combined_prompt: String,
    pub generation_time: Option<Timestamp>,
}

/// Input for appending a record. `id` and `generation_time` are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateImageRecord {
    pub image_path: String,
    pub artist_file: String,
    pub artist_prompt: String,
    pub prompt_file: String,
    pub prompt_text: String,
    pub combined_prompt: String,
}

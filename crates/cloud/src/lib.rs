//! Upload step: push a batch's images to S3-compatible object storage and
//! record where each one landed in the batch's remap table.

pub mod config;
pub mod object_store;
pub mod uploader;

pub use config::R2Config;
pub use object_store::{content_type_for, ObjectStore, S3ObjectStore};
pub use uploader::{upload_batch, FailedUpload, UploadMode, UploadReport};

use artgrid_core::error::CoreError;

/// Errors from the upload step.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Configuration, filesystem, or remap-table errors.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The batch's record store could not be read.
    #[error("Record store error: {0}")]
    Store(#[from] sqlx::Error),

    /// The batch has no record store at all.
    #[error("No record store in batch directory {0}")]
    MissingRecordStore(String),

    /// A single object upload failed.
    #[error("Upload of '{key}' failed: {message}")]
    Put { key: String, message: String },
}

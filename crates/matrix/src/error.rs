use artgrid_core::error::CoreError;

/// Errors surfaced by matrix resolution.
///
/// A corrupt or unreadable cache is never one of them: it is a miss.
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    /// The batch directory has no record store.
    #[error("Batch '{0}' not found")]
    BatchNotFound(String),

    #[error("Record store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

use std::fmt;

use artgrid_core::error::CoreError;

/// Which step of a task failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStep {
    /// The remote render call.
    Render,
    /// Decoding and writing the image into the batch directory.
    Save,
}

impl fmt::Display for GenerationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render => f.write_str("render"),
            Self::Save => f.write_str("save"),
        }
    }
}

/// Errors that end a generation run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Configuration, input, or local filesystem errors.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A task failed and the run's policy is to abort.
    #[error(
        "Generation failed for task {index} (style '{style}', prompt '{prompt}') \
         during {step}: {reason}"
    )]
    Generation {
        index: usize,
        style: String,
        prompt: String,
        step: GenerationStep,
        reason: String,
    },

    /// The record store could not be opened or written.
    #[error("Record store error: {0}")]
    Store(#[from] sqlx::Error),
}

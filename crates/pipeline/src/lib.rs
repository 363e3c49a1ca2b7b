//! Batch generation pipeline.
//!
//! Enumerates style × prompt combinations, renders each through an
//! [`generator::ImageGenerator`], saves the image into a fresh batch
//! directory, and appends one provenance record per saved image.

pub mod error;
pub mod generator;
pub mod image_store;
pub mod runner;

pub use error::{GenerationStep, PipelineError};
pub use runner::{BatchReport, BatchRunner, FailurePolicy, RunOptions};

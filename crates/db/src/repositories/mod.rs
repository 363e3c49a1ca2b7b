//! Repository layer: one zero-sized struct per table with async query methods.

pub mod image_record_repo;

pub use image_record_repo::{ImageRecordRepo, RecordAxis};

//! Output file naming inside a batch directory.
//!
//! Convention: `image_{HHMMSS}_{index}.{ext}` where `index` is the task's
//! position in the enumeration, so two renders finishing in the same second
//! never share a filename.

use chrono::NaiveTime;

/// Extension of every image saved into a batch.
pub const IMAGE_SAVE_FORMAT: &str = "webp";

/// Filename of the per-batch record store.
pub const RECORD_STORE_FILENAME: &str = "image_generation.db";

/// Production remap table written by a full upload.
pub const REMAP_FILENAME: &str = "r2_url_mapping.json";

/// Test remap table written by a trial upload; takes precedence when present.
pub const REMAP_TEST_FILENAME: &str = "r2_url_mapping_test.json";

/// Generate the relative filename for a rendered image.
///
/// ```
/// use chrono::NaiveTime;
/// use artgrid_core::naming::image_filename;
///
/// let t = NaiveTime::from_hms_opt(1, 45, 51).unwrap();
/// assert_eq!(image_filename(t, 3), "image_014551_3.webp");
/// ```
pub fn image_filename(finished_at: NaiveTime, index: usize) -> String {
    format!(
        "image_{}_{index}.{IMAGE_SAVE_FORMAT}",
        finished_at.format("%H%M%S")
    )
}

/// Object-storage key for an uploaded image: `{batch}/{file_name}`.
pub fn object_key(batch: &str, file_name: &str) -> String {
    format!("{batch}/{file_name}")
}

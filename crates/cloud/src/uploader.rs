//! Batch upload: push every recorded image and write the remap table once.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use artgrid_core::batch_name::BatchName;
use artgrid_core::naming::object_key;
use artgrid_core::remap::{RemapSource, RemapTable};
use artgrid_db::repositories::ImageRecordRepo;
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::object_store::ObjectStore;
use crate::UploadError;

/// Which images to upload and which remap table receives the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// Every record of the batch, into the production table.
    Full,
    /// Only the first `limit` records, into the test table.
    Test { limit: usize },
}

impl UploadMode {
    pub fn remap_source(self) -> RemapSource {
        match self {
            Self::Full => RemapSource::Production,
            Self::Test { .. } => RemapSource::Test,
        }
    }

    fn limit(self) -> Option<i64> {
        match self {
            Self::Full => None,
            Self::Test { limit } => Some(limit as i64),
        }
    }
}

/// A single object that could not be uploaded.
#[derive(Debug, Clone, Serialize)]
pub struct FailedUpload {
    pub file_name: String,
    pub reason: String,
}

/// Summary of one batch upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub batch: BatchName,
    /// Records selected for upload.
    pub attempted: usize,
    /// Remap entries written, keyed by file name.
    pub uploaded: BTreeMap<String, String>,
    pub failed: Vec<FailedUpload>,
    /// Records whose image file is not on disk.
    pub missing_files: Vec<String>,
    /// Where the remap table was written, if anything was uploaded.
    pub table_path: Option<PathBuf>,
}

/// Upload the images of one batch and record their public URLs.
///
/// At most `concurrency` uploads are in flight. Individual failures are
/// logged and reported but do not stop the batch. The remap table is
/// replaced in a single atomic write after all uploads settle, and only if
/// at least one upload succeeded.
pub async fn upload_batch(
    store: &dyn ObjectStore,
    batch_dir: &Path,
    batch: &BatchName,
    mode: UploadMode,
    concurrency: usize,
) -> Result<UploadReport, UploadError> {
    let pool = artgrid_db::open_existing(batch_dir)
        .await?
        .ok_or_else(|| UploadError::MissingRecordStore(batch_dir.display().to_string()))?;
    let image_paths = ImageRecordRepo::list_image_paths(&pool, mode.limit()).await?;
    pool.close().await;

    let mut report = UploadReport {
        batch: batch.clone(),
        attempted: image_paths.len(),
        uploaded: BTreeMap::new(),
        failed: Vec::new(),
        missing_files: Vec::new(),
        table_path: None,
    };

    let mut pending = Vec::with_capacity(image_paths.len());
    for image_path in image_paths {
        let local = batch_dir.join(&image_path);
        if !tokio::fs::try_exists(&local).await.unwrap_or(false) {
            tracing::warn!(batch = %batch, file = %image_path, "Image file missing, skipping");
            report.missing_files.push(image_path);
            continue;
        }
        let file_name = Path::new(&image_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&image_path)
            .to_string();
        pending.push((file_name, local));
    }

    let workers = concurrency.max(1).min(pending.len().max(1));
    tracing::info!(
        batch = %batch,
        files = pending.len(),
        workers,
        mode = ?mode,
        "Uploading batch"
    );

    let mut results = stream::iter(pending)
        .map(|(file_name, local)| async move {
            let key = object_key(batch.as_str(), &file_name);
            let result = store.put_object(&local, &key).await;
            (file_name, result)
        })
        .buffer_unordered(workers);

    while let Some((file_name, result)) = results.next().await {
        match result {
            Ok(url) => {
                tracing::debug!(file = %file_name, url = %url, "Uploaded");
                report.uploaded.insert(file_name, url);
            }
            Err(e) => {
                tracing::error!(file = %file_name, error = %e, "Upload failed");
                report.failed.push(FailedUpload {
                    file_name,
                    reason: e.to_string(),
                });
            }
        }
    }

    if !report.uploaded.is_empty() {
        let source = mode.remap_source();
        RemapTable::write(batch_dir, source, &report.uploaded).await?;
        report.table_path = Some(batch_dir.join(source.file_name()));
    }

    tracing::info!(
        batch = %batch,
        uploaded = report.uploaded.len(),
        failed = report.failed.len(),
        missing = report.missing_files.len(),
        "Batch upload complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_map_to_tables() {
        assert_eq!(UploadMode::Full.remap_source(), RemapSource::Production);
        assert_eq!(
            UploadMode::Test { limit: 10 }.remap_source(),
            RemapSource::Test
        );
        assert_eq!(UploadMode::Test { limit: 10 }.limit(), Some(10));
        assert_eq!(UploadMode::Full.limit(), None);
    }
}

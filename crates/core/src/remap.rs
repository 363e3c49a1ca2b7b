//! Remap layer: per-batch tables translating a stored image path into a
//! publicly reachable URL.
//!
//! Tables are produced out-of-band by the upload step and are read-only to
//! everything else. A batch can carry a production table, a test table, or
//! both; the test table wins when both exist. A table may be partial.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::batch_dir::write_file_atomic;
use crate::error::CoreError;
use crate::naming::{REMAP_FILENAME, REMAP_TEST_FILENAME};

/// Which remap file a table was loaded from (or is destined for).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemapSource {
    Test,
    Production,
}

impl RemapSource {
    /// Candidates in precedence order.
    pub const PRECEDENCE: [RemapSource; 2] = [RemapSource::Test, RemapSource::Production];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Test => REMAP_TEST_FILENAME,
            Self::Production => REMAP_FILENAME,
        }
    }
}

/// A loaded remap table. `source` is `None` when the batch has no table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
    pub source: Option<RemapSource>,
    pub entries: BTreeMap<String, String>,
}

impl RemapTable {
    /// Load the highest-precedence remap table present in `batch_dir`.
    ///
    /// Returns an empty table (with `source: None`) when no table exists.
    /// A table that cannot be parsed is logged and skipped like a missing
    /// one, so a broken test table falls through to the production table.
    pub async fn load(batch_dir: &Path) -> Result<Self, CoreError> {
        for source in RemapSource::PRECEDENCE {
            let path = batch_dir.join(source.file_name());
            let raw = match tokio::fs::read(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(CoreError::io(&path, e)),
            };
            let entries: BTreeMap<String, String> = match serde_json::from_slice(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Malformed remap table, skipping");
                    continue;
                }
            };
            return Ok(Self {
                source: Some(source),
                entries,
            });
        }
        Ok(Self::default())
    }

    /// Whether any remap file was found.
    pub fn is_present(&self) -> bool {
        self.source.is_some()
    }

    /// Resolve a stored image path to its URL.
    ///
    /// Looks up the full relative path first, then the bare file name.
    pub fn resolve(&self, image_path: &str) -> Option<&str> {
        if let Some(url) = self.entries.get(image_path) {
            return Some(url);
        }
        let file_name = Path::new(image_path).file_name()?.to_str()?;
        self.entries.get(file_name).map(String::as_str)
    }

    /// Replace the `source` table in `batch_dir` with `entries`.
    ///
    /// The file is written whole and swapped in atomically, so readers never
    /// observe a half-written table.
    pub async fn write(
        batch_dir: &Path,
        source: RemapSource,
        entries: &BTreeMap<String, String>,
    ) -> Result<(), CoreError> {
        let path = batch_dir.join(source.file_name());
        let body = serde_json::to_vec_pretty(entries).map_err(|e| CoreError::json(&path, e))?;
        write_file_atomic(&path, &body).await
    }
}

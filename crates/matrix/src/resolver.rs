//! Cached matrix resolution per batch.
//!
//! A lookup fingerprints the batch's record store and remap tables, serves
//! the cache entry if [`CachePolicy::check`] accepts it, and otherwise
//! rebuilds the grid and overwrites the entry whole. Rebuilds happen on the
//! reader's request. Two readers racing on a stale entry both rebuild from
//! the same snapshot and write identical grids.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use artgrid_core::batch_dir::BatchDirs;
use artgrid_core::batch_name::BatchName;
use artgrid_core::cache::{
    fingerprint_files, read_entry, unix_secs, write_entry, CacheEntry, CachePayload, CachePolicy,
    Freshness, DEFAULT_CACHE_TTL_SECS,
};
use artgrid_core::naming::{RECORD_STORE_FILENAME, REMAP_FILENAME, REMAP_TEST_FILENAME};
use artgrid_core::remap::{RemapSource, RemapTable};
use artgrid_db::repositories::ImageRecordRepo;
use serde::{Deserialize, Serialize};

use crate::error::MatrixError;
use crate::grid::{build_matrix, MatrixPayload};

/// Schema version of the on-disk matrix cache.
pub const CACHE_VERSION: u32 = 3;

/// Files whose modification times a matrix cache entry depends on.
const SOURCE_FILES: [&str; 3] = [RECORD_STORE_FILENAME, REMAP_FILENAME, REMAP_TEST_FILENAME];

/// A resolved grid as handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixData {
    pub batch: BatchName,
    #[serde(flatten)]
    pub payload: MatrixPayload,
    /// Which remap table the URLs came from, if any.
    pub remap_source: Option<RemapSource>,
    /// False until an upload step has produced a remap table.
    pub presentable: bool,
    /// Whether this came from the cache rather than a rebuild.
    pub cached: bool,
    /// Derivation time, seconds since the Unix epoch.
    pub generated_at: f64,
}

/// On-disk cache payload: the grid plus the remap table it was joined with.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedMatrix {
    #[serde(flatten)]
    grid: MatrixPayload,
    #[serde(default)]
    remap_source: Option<RemapSource>,
}

impl CachePayload for CachedMatrix {
    fn has_resolved_link(&self) -> bool {
        self.grid.has_resolved_link()
    }
}

/// Resolves matrices for batches under the presentation root.
#[derive(Debug, Clone)]
pub struct MatrixResolver {
    batches: BatchDirs,
    cache_dir: PathBuf,
    policy: CachePolicy,
}

impl MatrixResolver {
    pub fn new(batches: BatchDirs, cache_dir: impl Into<PathBuf>) -> Self {
        Self::with_ttl(
            batches,
            cache_dir,
            Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        )
    }

    pub fn with_ttl(batches: BatchDirs, cache_dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            batches,
            cache_dir: cache_dir.into(),
            policy: CachePolicy {
                version: CACHE_VERSION,
                ttl,
            },
        }
    }

    pub fn batches(&self) -> &BatchDirs {
        &self.batches
    }

    /// `<cache_dir>/<batch>_matrix_v<version>.json`
    pub fn cache_path(&self, batch: &BatchName) -> PathBuf {
        self.cache_dir
            .join(format!("{batch}_matrix_v{}.json", self.policy.version))
    }

    /// Batch names under the presentation root, newest first.
    pub async fn list_batches(&self) -> Result<Vec<BatchName>, MatrixError> {
        Ok(self.batches.list_batches().await?)
    }

    /// Sync from `source` (when given), then resolve the newest batch.
    ///
    /// Returns `Ok(None)` when there are no batches at all.
    pub async fn latest_matrix(
        &self,
        source: Option<&BatchDirs>,
    ) -> Result<Option<MatrixData>, MatrixError> {
        if let Some(source) = source {
            let report = self.batches.sync_from(source).await?;
            if !report.copied.is_empty() {
                tracing::info!(copied = report.copied.len(), "Synced new batches");
            }
        }
        match self.batches.latest_batch().await? {
            Some(batch) => Ok(Some(self.get_matrix(&batch).await?)),
            None => Ok(None),
        }
    }

    /// Resolve the grid of one batch, from cache when fresh.
    pub async fn get_matrix(&self, batch: &BatchName) -> Result<MatrixData, MatrixError> {
        let batch_dir = self.batches.batch_path(batch);
        let sources = fingerprint_files(&batch_dir, &SOURCE_FILES).await?;
        if sources.get(RECORD_STORE_FILENAME).copied().flatten().is_none() {
            return Err(MatrixError::BatchNotFound(batch.to_string()));
        }

        let cache_path = self.cache_path(batch);
        let stale = match read_entry::<CachedMatrix>(&cache_path).await {
            Ok(entry) => match self.policy.check(
                &entry,
                &sources,
                entry.payload.remap_source.is_some(),
                SystemTime::now(),
            ) {
                Freshness::Fresh => {
                    tracing::debug!(batch = %batch, "Matrix cache hit");
                    let CachedMatrix { grid, remap_source } = entry.payload;
                    return Ok(MatrixData {
                        batch: batch.clone(),
                        payload: grid,
                        remap_source,
                        presentable: remap_source.is_some(),
                        cached: true,
                        generated_at: entry.timestamp,
                    });
                }
                Freshness::Stale(reason) => reason,
            },
            Err(reason) => reason,
        };
        tracing::info!(batch = %batch, reason = ?stale, "Rebuilding matrix");

        let timestamp = unix_secs(SystemTime::now());
        let (grid, remap_source) = self.rebuild(batch, &batch_dir).await?;

        let entry = CacheEntry {
            version: self.policy.version,
            timestamp,
            sources,
            payload: CachedMatrix { grid, remap_source },
        };
        if let Err(e) = write_entry(&cache_path, &entry).await {
            tracing::warn!(batch = %batch, error = %e, "Failed to write matrix cache");
        }

        Ok(MatrixData {
            batch: batch.clone(),
            payload: entry.payload.grid,
            remap_source,
            presentable: remap_source.is_some(),
            cached: false,
            generated_at: timestamp,
        })
    }

    /// One bulk read of the record store joined against the remap table.
    async fn rebuild(
        &self,
        batch: &BatchName,
        batch_dir: &Path,
    ) -> Result<(MatrixPayload, Option<RemapSource>), MatrixError> {
        let pool = artgrid_db::open_existing(batch_dir)
            .await?
            .ok_or_else(|| MatrixError::BatchNotFound(batch.to_string()))?;
        let records = ImageRecordRepo::list_all(&pool).await;
        pool.close().await;
        let records = records?;

        let remap = match RemapTable::load(batch_dir).await {
            Ok(remap) => remap,
            Err(e) => {
                tracing::warn!(batch = %batch, error = %e, "Unreadable remap table, treating as absent");
                RemapTable::default()
            }
        };
        if !remap.is_present() {
            tracing::info!(batch = %batch, "No remap table yet, every cell is missing");
        }

        let payload = build_matrix(&records, &remap);
        tracing::debug!(
            batch = %batch,
            records = records.len(),
            artists = payload.artists.len(),
            prompts = payload.prompts.len(),
            resolved = payload.resolved_cells(),
            "Matrix rebuilt"
        );
        Ok((payload, remap.source))
    }
}

//! Batch directory management: allocation, listing, and one-way sync of
//! batch trees between the generation root and the presentation root.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::batch_name::BatchName;
use crate::error::CoreError;

/// Disambiguates temp files from concurrent writers in one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A batch root directory (`generate_images/batch`, `static/generate_images/batch`).
#[derive(Debug, Clone)]
pub struct BatchDirs {
    root: PathBuf,
}

/// Outcome of [`BatchDirs::sync_from`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Batches copied into the target.
    pub copied: Vec<BatchName>,
    /// Batches already present in the target and left untouched.
    pub skipped: Vec<BatchName>,
    /// Whether the source root existed at all.
    pub source_found: bool,
}

impl BatchDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a named batch (may not exist).
    pub fn batch_path(&self, name: &BatchName) -> PathBuf {
        self.root.join(name.as_str())
    }

    /// Allocate a directory for a batch starting now.
    ///
    /// Two runs starting in the same second share a directory; that
    /// collision is accepted.
    pub async fn create_batch(&self) -> Result<(BatchName, PathBuf), CoreError> {
        self.create_named(BatchName::now()).await
    }

    /// Allocate (or reuse) the directory for `name`.
    pub async fn create_named(&self, name: BatchName) -> Result<(BatchName, PathBuf), CoreError> {
        let path = self.batch_path(&name);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| CoreError::io(&path, e))?;
        tracing::debug!(batch = %name, path = %path.display(), "Batch directory ready");
        Ok((name, path))
    }

    /// All batches under the root, newest first.
    ///
    /// Directories whose names are not valid batch names are ignored. A
    /// missing root yields an empty list.
    pub async fn list_batches(&self) -> Result<Vec<BatchName>, CoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::io(&self.root, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoreError::io(&self.root, e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| CoreError::io(entry.path(), e))?
                .is_dir();
            if !is_dir {
                continue;
            }
            let raw = entry.file_name();
            match BatchName::parse(&raw.to_string_lossy()) {
                Ok(name) => names.push(name),
                Err(_) => {
                    tracing::debug!(dir = %raw.to_string_lossy(), "Skipping non-batch directory");
                }
            }
        }

        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// The newest batch, if any.
    pub async fn latest_batch(&self) -> Result<Option<BatchName>, CoreError> {
        Ok(self.list_batches().await?.into_iter().next())
    }

    /// Copy every batch present in `source` but absent here.
    ///
    /// Existing target batches are never touched, so state added after an
    /// earlier sync (remap tables, partial uploads) is never clobbered.
    pub async fn sync_from(&self, source: &BatchDirs) -> Result<SyncReport, CoreError> {
        let mut report = SyncReport::default();
        if !tokio::fs::try_exists(&source.root)
            .await
            .map_err(|e| CoreError::io(&source.root, e))?
        {
            return Ok(report);
        }
        report.source_found = true;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CoreError::io(&self.root, e))?;

        for name in source.list_batches().await? {
            let target = self.batch_path(&name);
            if tokio::fs::try_exists(&target)
                .await
                .map_err(|e| CoreError::io(&target, e))?
            {
                report.skipped.push(name);
                continue;
            }
            copy_dir_recursive(&source.batch_path(&name), &target).await?;
            tracing::info!(batch = %name, "Synced batch into presentation tree");
            report.copied.push(name);
        }
        Ok(report)
    }
}

/// Copy a directory tree. `to` must not exist.
async fn copy_dir_recursive(from: &Path, to: &Path) -> Result<(), CoreError> {
    let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];

    while let Some((src, dst)) = pending.pop() {
        tokio::fs::create_dir_all(&dst)
            .await
            .map_err(|e| CoreError::io(&dst, e))?;

        let mut entries = tokio::fs::read_dir(&src)
            .await
            .map_err(|e| CoreError::io(&src, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoreError::io(&src, e))?
        {
            let src_path = entry.path();
            let dst_path = dst.join(entry.file_name());
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| CoreError::io(&src_path, e))?;
            if file_type.is_dir() {
                pending.push((src_path, dst_path));
            } else {
                tokio::fs::copy(&src_path, &dst_path)
                    .await
                    .map_err(|e| CoreError::io(&src_path, e))?;
            }
        }
    }
    Ok(())
}

/// Replace `path` with `contents` in one step (write a sibling temp file,
/// then rename over the target).
pub async fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<(), CoreError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| CoreError::io(parent, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = parent.join(format!(
        ".{file_name}.{}.{}.tmp",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| CoreError::io(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(CoreError::io(path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> BatchName {
        BatchName::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn create_batch_makes_directory() {
        let root = tempfile::tempdir().unwrap();
        let dirs = BatchDirs::new(root.path());
        let (batch, path) = dirs.create_batch().await.unwrap();
        assert!(path.is_dir());
        assert_eq!(path, root.path().join(batch.as_str()));
    }

    #[tokio::test]
    async fn list_is_reverse_sorted_and_skips_foreign_dirs() {
        let root = tempfile::tempdir().unwrap();
        for d in ["20250101-000000", "20250102-014551", "20241231-235959", "misc"] {
            std::fs::create_dir(root.path().join(d)).unwrap();
        }
        std::fs::write(root.path().join("20250103-000000"), "file, not dir").unwrap();

        let dirs = BatchDirs::new(root.path());
        let listed = dirs.list_batches().await.unwrap();
        assert_eq!(
            listed,
            vec![
                name("20250102-014551"),
                name("20250101-000000"),
                name("20241231-235959"),
            ]
        );
        assert_eq!(
            dirs.latest_batch().await.unwrap(),
            Some(name("20250102-014551"))
        );
    }

    #[tokio::test]
    async fn missing_root_lists_nothing() {
        let root = tempfile::tempdir().unwrap();
        let dirs = BatchDirs::new(root.path().join("absent"));
        assert!(dirs.list_batches().await.unwrap().is_empty());
        assert_eq!(dirs.latest_batch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn sync_copies_new_batches_and_never_overwrites() {
        let src_root = tempfile::tempdir().unwrap();
        let dst_root = tempfile::tempdir().unwrap();

        let fresh = src_root.path().join("20250102-014551");
        std::fs::create_dir_all(fresh.join("nested")).unwrap();
        std::fs::write(fresh.join("image_1_0.webp"), b"img").unwrap();
        std::fs::write(fresh.join("nested/extra.txt"), b"x").unwrap();

        let existing_src = src_root.path().join("20250101-000000");
        std::fs::create_dir_all(&existing_src).unwrap();
        std::fs::write(existing_src.join("image_2_0.webp"), b"new bytes").unwrap();

        let existing_dst = dst_root.path().join("20250101-000000");
        std::fs::create_dir_all(&existing_dst).unwrap();
        std::fs::write(existing_dst.join("image_2_0.webp"), b"old bytes").unwrap();

        let source = BatchDirs::new(src_root.path());
        let target = BatchDirs::new(dst_root.path());
        let report = target.sync_from(&source).await.unwrap();

        assert!(report.source_found);
        assert_eq!(report.copied, vec![name("20250102-014551")]);
        assert_eq!(report.skipped, vec![name("20250101-000000")]);
        assert_eq!(
            std::fs::read(dst_root.path().join("20250102-014551/image_1_0.webp")).unwrap(),
            b"img"
        );
        assert!(dst_root
            .path()
            .join("20250102-014551/nested/extra.txt")
            .is_file());
        assert_eq!(
            std::fs::read(existing_dst.join("image_2_0.webp")).unwrap(),
            b"old bytes"
        );
    }

    #[tokio::test]
    async fn sync_without_source_is_noop() {
        let dst_root = tempfile::tempdir().unwrap();
        let source = BatchDirs::new(dst_root.path().join("nope"));
        let target = BatchDirs::new(dst_root.path().join("target"));
        let report = target.sync_from(&source).await.unwrap();
        assert!(!report.source_found);
        assert!(!dst_root.path().join("target").exists());
    }

    #[tokio::test]
    async fn atomic_write_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        write_file_atomic(&path, b"first version, long").await.unwrap();
        write_file_atomic(&path, b"second").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}

//! Derived-data cache entries with explicit source fingerprints.
//!
//! A [`CacheEntry`] records the schema version it was built with, when it
//! was derived, and a fingerprint (modification time) of every upstream
//! file it was derived from. [`CachePolicy::check`] is the single freshness
//! predicate: an entry is served only if every condition holds, otherwise it
//! is rebuilt and overwritten whole.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::batch_dir::write_file_atomic;
use crate::error::CoreError;

/// Default expiry window for derived caches (24 hours).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Modification time of each upstream file, keyed by file name.
///
/// `None` means the file was absent when fingerprinted. Times are
/// nanoseconds since the Unix epoch.
pub type SourceFingerprints = BTreeMap<String, Option<u64>>;

/// Payloads that can say whether they contain at least one resolved link.
pub trait CachePayload {
    fn has_resolved_link(&self) -> bool;
}

/// A versioned, fingerprinted cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<P> {
    pub version: u32,
    /// Derivation time, seconds since the Unix epoch.
    pub timestamp: f64,
    pub sources: SourceFingerprints,
    #[serde(flatten)]
    pub payload: P,
}

/// Why an entry cannot be served.
#[derive(Debug, Clone, PartialEq)]
pub enum StaleReason {
    Missing,
    Corrupt,
    VersionMismatch { found: u32, expected: u32 },
    SourceChanged { source: String },
    OlderThanSource { source: String },
    NoResolvedLinks,
    Expired { age_secs: f64 },
}

/// Result of a freshness check.
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness {
    Fresh,
    Stale(StaleReason),
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh)
    }
}

/// Versioning and expiry rules for one kind of cache.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub version: u32,
    pub ttl: Duration,
}

impl CachePolicy {
    /// Decide whether `entry` may be served.
    ///
    /// Fresh iff the version matches, every fingerprint is unchanged, the
    /// derivation time is not older than any present source, the payload
    /// holds a resolved link whenever `expect_links` is set, and the entry is
    /// younger than the TTL.
    pub fn check<P: CachePayload>(
        &self,
        entry: &CacheEntry<P>,
        current: &SourceFingerprints,
        expect_links: bool,
        now: SystemTime,
    ) -> Freshness {
        if entry.version != self.version {
            return Freshness::Stale(StaleReason::VersionMismatch {
                found: entry.version,
                expected: self.version,
            });
        }

        for (source, mtime) in current {
            if entry.sources.get(source) != Some(mtime) {
                return Freshness::Stale(StaleReason::SourceChanged {
                    source: source.clone(),
                });
            }
        }
        if let Some(extra) = entry.sources.keys().find(|k| !current.contains_key(*k)) {
            return Freshness::Stale(StaleReason::SourceChanged {
                source: extra.clone(),
            });
        }

        for (source, mtime) in current {
            if let Some(ns) = mtime {
                if entry.timestamp < *ns as f64 / 1e9 {
                    return Freshness::Stale(StaleReason::OlderThanSource {
                        source: source.clone(),
                    });
                }
            }
        }

        if expect_links && !entry.payload.has_resolved_link() {
            return Freshness::Stale(StaleReason::NoResolvedLinks);
        }

        let age_secs = unix_secs(now) - entry.timestamp;
        if age_secs > self.ttl.as_secs_f64() {
            return Freshness::Stale(StaleReason::Expired { age_secs });
        }

        Freshness::Fresh
    }
}

/// Seconds since the Unix epoch as a float.
pub fn unix_secs(at: SystemTime) -> f64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Fingerprint the named files inside `dir`.
pub async fn fingerprint_files(
    dir: &Path,
    names: &[&str],
) -> Result<SourceFingerprints, CoreError> {
    let mut fingerprints = SourceFingerprints::new();
    for name in names {
        let path = dir.join(name);
        let mtime = match tokio::fs::metadata(&path).await {
            Ok(meta) => {
                let modified = meta.modified().map_err(|e| CoreError::io(&path, e))?;
                Some(
                    modified
                        .duration_since(UNIX_EPOCH)
                        .map(|d| d.as_nanos() as u64)
                        .unwrap_or(0),
                )
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(CoreError::io(&path, e)),
        };
        fingerprints.insert((*name).to_string(), mtime);
    }
    Ok(fingerprints)
}

/// Read a cache entry.
///
/// Returns `Err(StaleReason)` when the file is missing or unreadable; a
/// corrupt cache is never an error for the caller, only a miss.
pub async fn read_entry<P: DeserializeOwned>(path: &Path) -> Result<CacheEntry<P>, StaleReason> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(StaleReason::Missing),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable cache file");
            return Err(StaleReason::Corrupt);
        }
    };
    serde_json::from_slice(&raw).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Malformed cache file");
        StaleReason::Corrupt
    })
}

/// Overwrite a cache entry atomically.
pub async fn write_entry<P: Serialize>(path: &Path, entry: &CacheEntry<P>) -> Result<(), CoreError> {
    let body = serde_json::to_vec(entry).map_err(|e| CoreError::json(path, e))?;
    write_file_atomic(path, &body).await
}

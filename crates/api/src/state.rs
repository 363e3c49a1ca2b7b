use std::sync::Arc;
use std::time::Duration;

use artgrid_core::batch_dir::BatchDirs;
use artgrid_matrix::MatrixResolver;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<MatrixResolver>,
    /// Generation tree synced into the presentation tree before "latest" lookups.
    pub generation: Arc<BatchDirs>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn from_config(config: ServerConfig) -> Self {
        let resolver = MatrixResolver::with_ttl(
            BatchDirs::new(&config.static_root),
            &config.cache_dir,
            Duration::from_secs(config.cache_ttl_secs),
        );
        Self {
            resolver: Arc::new(resolver),
            generation: Arc::new(BatchDirs::new(&config.generate_root)),
            config: Arc::new(config),
        }
    }
}

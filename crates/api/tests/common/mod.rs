#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use artgrid_api::config::ServerConfig;
use artgrid_api::router::build_app_router;
use artgrid_api::state::AppState;
use artgrid_core::batch_dir::BatchDirs;
use artgrid_core::batch_name::BatchName;
use artgrid_core::remap::{RemapSource, RemapTable};
use artgrid_db::models::image_record::CreateImageRecord;
use artgrid_db::repositories::ImageRecordRepo;

/// Temporary generation and presentation trees plus a matching config.
pub struct TestEnv {
    pub dir: TempDir,
    pub config: ServerConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: 30,
            generate_root: dir.path().join("generate"),
            static_root: dir.path().join("static/batch"),
            cache_dir: dir.path().join("static/cache"),
            cache_ttl_secs: 3600,
        };
        Self { dir, config }
    }

    /// Build the full application router with all middleware layers.
    pub fn app(&self) -> Router {
        build_app_router(AppState::from_config(self.config.clone()), &self.config)
    }

    /// Create a batch under `root` with one record per `(file, artist, prompt)`.
    pub async fn seed_batch(
        &self,
        root: &Path,
        name: &str,
        cells: &[(&str, &str, &str)],
    ) -> PathBuf {
        let (_, batch_dir) = BatchDirs::new(root)
            .create_named(BatchName::parse(name).unwrap())
            .await
            .unwrap();
        let pool = artgrid_db::open_record_store(&batch_dir).await.unwrap();
        for (file, artist, prompt) in cells {
            ImageRecordRepo::create(
                &pool,
                &CreateImageRecord {
                    image_path: file.to_string(),
                    artist_file: "artists.csv".into(),
                    artist_prompt: artist.to_string(),
                    prompt_file: "prompts.csv".into(),
                    prompt_text: prompt.to_string(),
                    combined_prompt: format!("q,{artist},{prompt}"),
                },
            )
            .await
            .unwrap();
        }
        pool.close().await;
        batch_dir
    }
}

/// Write a production remap table mapping each file to `https://cdn.test/<file>`.
pub async fn map_all(batch_dir: &Path, files: &[&str]) {
    let entries: BTreeMap<String, String> = files
        .iter()
        .map(|f| (f.to_string(), format!("https://cdn.test/{f}")))
        .collect();
    RemapTable::write(batch_dir, RemapSource::Production, &entries)
        .await
        .unwrap();
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

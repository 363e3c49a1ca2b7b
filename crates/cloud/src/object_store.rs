//! Object storage seam and its S3-compatible implementation.

use std::path::Path;

use artgrid_core::error::CoreError;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use crate::config::R2Config;
use crate::UploadError;

/// "Upload a file under a key, get its public URL."
///
/// Uploads overwrite existing objects, so retrying a key is safe.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, local_path: &Path, key: &str) -> Result<String, UploadError>;
}

/// MIME type derived from a file's extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("webp") => "image/webp",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// S3-compatible store (Cloudflare R2 in production).
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    config: R2Config,
}

impl S3ObjectStore {
    /// Build a client for the configured endpoint with static credentials.
    pub fn new(config: R2Config) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "artgrid-env",
        );
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_config::BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new("auto"))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            config,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, local_path: &Path, key: &str) -> Result<String, UploadError> {
        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            CoreError::io(
                local_path,
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            )
        })?;

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type_for(local_path))
            .body(body)
            .send()
            .await
            .map_err(|e| UploadError::Put {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(self.config.public_url(key))
    }
}

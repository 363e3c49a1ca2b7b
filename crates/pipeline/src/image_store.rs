//! Writing rendered images into a batch directory.

use std::path::{Path, PathBuf};

use image::ImageFormat;

/// Errors from decoding or writing a rendered image.
#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("Image save task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Decode `bytes` and save them as WebP at `batch_dir/file_name`.
///
/// Runs on the blocking pool; re-encoding a full-size render is CPU-bound.
pub async fn save_as_webp(
    batch_dir: &Path,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<PathBuf, ImageStoreError> {
    let path = batch_dir.join(file_name);
    let target = path.clone();
    tokio::task::spawn_blocking(move || -> Result<(), image::ImageError> {
        let decoded = image::load_from_memory(&bytes)?;
        decoded.save_with_format(&target, ImageFormat::WebP)
    })
    .await??;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 10, 10]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn saves_png_as_webp() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_as_webp(dir.path(), "image_000000_0.webp", tiny_png())
            .await
            .unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(&written[0..4], b"RIFF");
        assert_eq!(&written[8..12], b"WEBP");
    }

    #[tokio::test]
    async fn garbage_bytes_are_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_as_webp(dir.path(), "x.webp", b"not an image".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, ImageStoreError::Codec(_)));
        assert!(!dir.path().join("x.webp").exists());
    }
}

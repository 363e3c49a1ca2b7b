//! The seam between the pipeline and the remote renderer.

use artgrid_core::prompt::GenerationSettings;
use artgrid_sdwebui::api::{RenderedImage, Txt2ImgApi, Txt2ImgError};

/// Anything that can turn a composed prompt into one encoded image.
#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        negative_prompt: Option<&str>,
        settings: &GenerationSettings,
    ) -> Result<RenderedImage, Txt2ImgError>;
}

#[async_trait::async_trait]
impl ImageGenerator for Txt2ImgApi {
    async fn generate(
        &self,
        prompt: &str,
        negative_prompt: Option<&str>,
        settings: &GenerationSettings,
    ) -> Result<RenderedImage, Txt2ImgError> {
        Txt2ImgApi::generate(self, prompt, negative_prompt, settings).await
    }
}

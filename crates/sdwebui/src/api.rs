//! REST client for the WebUI `txt2img` endpoint.
//!
//! One call is one synchronous render on the remote server. No retry is
//! attempted here: a failure goes straight back to the caller, which decides
//! whether to abort the batch or skip the task.

use artgrid_core::prompt::GenerationSettings;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

use crate::config::SdApiConfig;

/// HTTP client for a single WebUI instance.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Clone)]
pub struct Txt2ImgApi {
    client: reqwest::Client,
    api_url: String,
}

/// Request body for `POST /sdapi/v1/txt2img`.
#[derive(Debug, Clone, Serialize)]
pub struct Txt2ImgRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub seed: i64,
    pub steps: u32,
    pub cfg_scale: f64,
    pub width: u32,
    pub height: u32,
    pub sampler_name: String,
    pub batch_size: u32,
}

impl Txt2ImgRequest {
    /// Build a request from the fixed sampling settings.
    ///
    /// `negative_prompt` overrides the settings' default when given.
    pub fn new(
        prompt: &str,
        negative_prompt: Option<&str>,
        settings: &GenerationSettings,
        seed: i64,
    ) -> Self {
        Self {
            prompt: prompt.to_string(),
            negative_prompt: negative_prompt
                .unwrap_or(&settings.negative_prompt)
                .to_string(),
            seed,
            steps: settings.steps,
            cfg_scale: settings.cfg_scale,
            width: settings.width,
            height: settings.height,
            sampler_name: settings.sampler_name.clone(),
            batch_size: 1,
        }
    }
}

/// Response body of `txt2img`. Images are base64-encoded PNGs.
#[derive(Debug, Deserialize)]
pub struct Txt2ImgResponse {
    #[serde(default)]
    pub images: Vec<String>,
}

/// The first image of a successful render.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    /// Encoded image bytes as returned by the server (PNG).
    pub bytes: Vec<u8>,
    /// Seed the render was requested with.
    pub seed: i64,
}

/// Errors from the WebUI REST layer.
#[derive(Debug, thiserror::Error)]
pub enum Txt2ImgError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("WebUI API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The server answered 2xx but returned no image.
    #[error("WebUI returned no images")]
    NoImages,

    /// The returned image payload was not valid base64.
    #[error("Invalid image payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl Txt2ImgApi {
    /// Create a client for the configured server.
    pub fn new(config: &SdApiConfig) -> Result<Self, Txt2ImgError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.base_url()))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Render one image with a fresh random seed.
    pub async fn generate(
        &self,
        prompt: &str,
        negative_prompt: Option<&str>,
        settings: &GenerationSettings,
    ) -> Result<RenderedImage, Txt2ImgError> {
        let seed = i64::from(rand::random::<u32>());
        let request = Txt2ImgRequest::new(prompt, negative_prompt, settings, seed);

        tracing::debug!(
            seed,
            steps = request.steps,
            cfg_scale = request.cfg_scale,
            width = request.width,
            height = request.height,
            sampler = %request.sampler_name,
            "Submitting txt2img request"
        );

        let response = self.txt2img(&request).await?;
        let bytes = decode_first_image(&response)?;
        Ok(RenderedImage { bytes, seed })
    }

    /// Send a raw `txt2img` request.
    pub async fn txt2img(&self, request: &Txt2ImgRequest) -> Result<Txt2ImgResponse, Txt2ImgError> {
        let response = self
            .client
            .post(format!("{}/sdapi/v1/txt2img", self.api_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(Txt2ImgError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Txt2ImgResponse>().await?)
    }
}

/// Decode the first image of a response.
///
/// Tolerates a `data:image/png;base64,` prefix.
pub fn decode_first_image(response: &Txt2ImgResponse) -> Result<Vec<u8>, Txt2ImgError> {
    let first = response.images.first().ok_or(Txt2ImgError::NoImages)?;
    let payload = match first.split_once(";base64,") {
        Some((_, data)) => data,
        None => first.as_str(),
    };
    Ok(general_purpose::STANDARD.decode(payload.trim())?)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn request_uses_settings_and_default_negative() {
        let settings = GenerationSettings::default();
        let req = Txt2ImgRequest::new("q,Monet,a cat", None, &settings, 42);
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["prompt"], "q,Monet,a cat");
        assert_eq!(json["negative_prompt"], settings.negative_prompt.as_str());
        assert_eq!(json["seed"], 42);
        assert_eq!(json["steps"], 20);
        assert_eq!(json["cfg_scale"], 4.5);
        assert_eq!(json["width"], 832);
        assert_eq!(json["height"], 1216);
        assert_eq!(json["sampler_name"], "Euler");
    }

    #[test]
    fn negative_prompt_override() {
        let req = Txt2ImgRequest::new("p", Some("blurry"), &GenerationSettings::default(), 1);
        assert_eq!(req.negative_prompt, "blurry");
    }

    #[test]
    fn decodes_plain_and_data_url_payloads() {
        let encoded = general_purpose::STANDARD.encode(b"\x89PNG fake");
        let plain = Txt2ImgResponse {
            images: vec![encoded.clone()],
        };
        assert_eq!(decode_first_image(&plain).unwrap(), b"\x89PNG fake");

        let data_url = Txt2ImgResponse {
            images: vec![format!("data:image/png;base64,{encoded}")],
        };
        assert_eq!(decode_first_image(&data_url).unwrap(), b"\x89PNG fake");
    }

    #[test]
    fn empty_response_is_no_images() {
        let resp = Txt2ImgResponse { images: vec![] };
        assert_matches!(decode_first_image(&resp), Err(Txt2ImgError::NoImages));
    }

    #[test]
    fn bad_base64_is_decode_error() {
        let resp = Txt2ImgResponse {
            images: vec!["@@not base64@@".into()],
        };
        assert_matches!(decode_first_image(&resp), Err(Txt2ImgError::Decode(_)));
    }

    #[test]
    fn api_error_display() {
        let err = Txt2ImgError::ApiError {
            status: 500,
            body: "CUDA out of memory".into(),
        };
        assert_eq!(err.to_string(), "WebUI API error (500): CUDA out of memory");
    }
}

//! Sampling defaults and prompt composition.

use serde::{Deserialize, Serialize};

/// Fixed quality prefix prepended to every composed prompt.
pub const DEFAULT_QUALITY_PROMPT: &str =
    "very awa,masterpiece,best quality,year 2024,newest,highres,absurdres,";

/// Negative prompt applied unless a call overrides it.
pub const DEFAULT_NEGATIVE_PROMPT: &str = "text,watermark,bad anatomy,bad proportions,extra limbs,\
extra digit,extra legs,extra legs and arms,disfigured,missing arms,too many fingers,fused fingers,\
missing fingers,unclear eyes,watermark,username,logo,artist logo,patreon logo,weibo logo,\
arknights logo,";

pub const DEFAULT_STEPS: u32 = 20;
pub const DEFAULT_CFG_SCALE: f64 = 4.5;
pub const DEFAULT_WIDTH: u32 = 832;
pub const DEFAULT_HEIGHT: u32 = 1216;
pub const DEFAULT_SAMPLER: &str = "Euler";

/// Flat, fully specified sampling configuration sent with every call.
///
/// The seed is not part of the settings: the client draws a fresh one per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub steps: u32,
    pub cfg_scale: f64,
    pub width: u32,
    pub height: u32,
    pub sampler_name: String,
    pub negative_prompt: String,
    pub quality_prefix: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            cfg_scale: DEFAULT_CFG_SCALE,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            sampler_name: DEFAULT_SAMPLER.to_string(),
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            quality_prefix: DEFAULT_QUALITY_PROMPT.to_string(),
        }
    }
}

/// Build the text sent to the generator: `{quality_prefix}{style},{prompt}`.
pub fn compose_prompt(quality_prefix: &str, style: &str, prompt: &str) -> String {
    format!("{quality_prefix}{style},{prompt}")
}

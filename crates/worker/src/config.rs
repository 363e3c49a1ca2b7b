use std::path::PathBuf;

use artgrid_core::error::CoreError;
use artgrid_pipeline::FailurePolicy;
use artgrid_sdwebui::config::SdApiConfig;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub sd_api: SdApiConfig,
    /// Where new batches are written.
    pub generate_root: PathBuf,
    /// Presentation tree; uploads and listings operate here.
    pub static_root: PathBuf,
    pub artists_dir: PathBuf,
    pub prompts_dir: PathBuf,
    pub failure_policy: FailurePolicy,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var          | Default                         |
    /// |------------------|---------------------------------|
    /// | `GENERATE_ROOT`  | `generate_images/batch`         |
    /// | `STATIC_ROOT`    | `static/generate_images/batch`  |
    /// | `ARTISTS_DIR`    | `prompts/artists_folder`        |
    /// | `PROMPTS_DIR`    | `prompts/prompts_folder`        |
    /// | `FAILURE_POLICY` | `abort`                         |
    ///
    /// Generation-server settings come from [`SdApiConfig::from_env`].
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok(), SdApiConfig::from_env()?)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        sd_api: SdApiConfig,
    ) -> Result<Self, CoreError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            sd_api,
            generate_root: var("GENERATE_ROOT", "generate_images/batch").into(),
            static_root: var("STATIC_ROOT", "static/generate_images/batch").into(),
            artists_dir: var("ARTISTS_DIR", "prompts/artists_folder").into(),
            prompts_dir: var("PROMPTS_DIR", "prompts/prompts_folder").into(),
            failure_policy: var("FAILURE_POLICY", "abort").parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults() {
        let config = WorkerConfig::from_lookup(|_| None, SdApiConfig::default()).unwrap();
        assert_eq!(config.generate_root, PathBuf::from("generate_images/batch"));
        assert_eq!(config.artists_dir, PathBuf::from("prompts/artists_folder"));
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn skip_policy_from_env() {
        let config = WorkerConfig::from_lookup(
            |k| (k == "FAILURE_POLICY").then(|| "skip".to_string()),
            SdApiConfig::default(),
        )
        .unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result = WorkerConfig::from_lookup(
            |k| (k == "FAILURE_POLICY").then(|| "retry".to_string()),
            SdApiConfig::default(),
        );
        assert_matches!(result, Err(CoreError::Configuration(_)));
    }
}

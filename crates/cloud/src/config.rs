use artgrid_core::error::CoreError;

/// Default public domain fronting the bucket.
pub const DEFAULT_CUSTOM_DOMAIN: &str = "noobai-images.wall-breaker-no4.xyz";

/// Upper bound on concurrent uploads.
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 32;

/// Object storage credentials and endpoint, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct R2Config {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: String,
    pub bucket: String,
    /// Host serving uploaded objects publicly.
    pub custom_domain: String,
    pub upload_concurrency: usize,
}

impl R2Config {
    /// Load configuration from the environment.
    ///
    /// `R2_ACCESS_KEY_ID`, `R2_SECRET_ACCESS_KEY`, `R2_ENDPOINT` and
    /// `R2_BUCKET_NAME` are required; all missing ones are reported together
    /// before any upload starts. `R2_CUSTOM_DOMAIN` and `UPLOAD_CONCURRENCY`
    /// are optional.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let required = [
            "R2_ACCESS_KEY_ID",
            "R2_SECRET_ACCESS_KEY",
            "R2_ENDPOINT",
            "R2_BUCKET_NAME",
        ];
        let values: Vec<Option<String>> = required
            .iter()
            .map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
            .collect();
        let missing: Vec<&str> = required
            .iter()
            .zip(&values)
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| *k)
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::Configuration(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }
        let mut values = values.into_iter().flatten();
        let mut next = || values.next().unwrap_or_default();

        let upload_concurrency = match lookup("UPLOAD_CONCURRENCY") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                CoreError::Configuration(format!("UPLOAD_CONCURRENCY has invalid value '{raw}'"))
            })?,
            None => DEFAULT_UPLOAD_CONCURRENCY,
        };

        Ok(Self {
            access_key_id: next(),
            secret_access_key: next(),
            endpoint: next(),
            bucket: next(),
            custom_domain: lookup("R2_CUSTOM_DOMAIN")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CUSTOM_DOMAIN.to_string()),
            upload_concurrency: upload_concurrency.max(1),
        })
    }

    /// Public URL of an object key.
    pub fn public_url(&self, key: &str) -> String {
        format!("https://{}/{key}", self.custom_domain)
    }
}

use std::time::Duration;

/// Connection settings for the WebUI server, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SdApiConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on one render round-trip.
    pub request_timeout: Duration,
}

impl SdApiConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default     |
    /// |---------------------------|-------------|
    /// | `SD_API_HOST`             | `127.0.0.1` |
    /// | `SD_API_PORT`             | `6006`      |
    /// | `SD_REQUEST_TIMEOUT_SECS` | `600`       |
    pub fn from_env() -> Result<Self, artgrid_core::error::CoreError> {
        let host = std::env::var("SD_API_HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = parse_env("SD_API_PORT", 6006u16)?;
        let timeout_secs = parse_env("SD_REQUEST_TIMEOUT_SECS", 600u64)?;

        Ok(Self {
            host,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Base HTTP URL, e.g. `http://127.0.0.1:6006`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for SdApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 6006,
            request_timeout: Duration::from_secs(600),
        }
    }
}

fn parse_env<T: std::str::FromStr>(
    key: &str,
    default: T,
) -> Result<T, artgrid_core::error::CoreError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            artgrid_core::error::CoreError::Configuration(format!("{key} has invalid value '{raw}'"))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_joins_host_and_port() {
        let config = SdApiConfig {
            host: "100.71.15.9".into(),
            port: 7860,
            ..SdApiConfig::default()
        };
        assert_eq!(config.base_url(), "http://100.71.15.9:7860");
    }
}

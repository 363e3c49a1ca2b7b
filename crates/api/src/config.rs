use std::path::PathBuf;
use std::str::FromStr;

use artgrid_core::cache::DEFAULT_CACHE_TTL_SECS;
use artgrid_core::error::CoreError;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// Where the generator writes new batches; synced from on "latest" lookups.
    pub generate_root: PathBuf,
    /// Presentation copy of the batch tree.
    pub static_root: PathBuf,
    /// Matrix cache directory.
    pub cache_dir: PathBuf,
    pub cache_ttl_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                         |
    /// |------------------------|---------------------------------|
    /// | `HOST`                 | `0.0.0.0`                       |
    /// | `PORT`                 | `8080`                          |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                           |
    /// | `GENERATE_ROOT`        | `generate_images/batch`         |
    /// | `STATIC_ROOT`          | `static/generate_images/batch`  |
    /// | `CACHE_DIR`            | `static/cache`                  |
    /// | `CACHE_TTL_SECS`       | `86400`                         |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse_var("PORT", &var("PORT", "8080"))?,
            cors_origins,
            request_timeout_secs: parse_var(
                "REQUEST_TIMEOUT_SECS",
                &var("REQUEST_TIMEOUT_SECS", "120"),
            )?,
            generate_root: var("GENERATE_ROOT", "generate_images/batch").into(),
            static_root: var("STATIC_ROOT", "static/generate_images/batch").into(),
            cache_dir: var("CACHE_DIR", "static/cache").into(),
            cache_ttl_secs: parse_var(
                "CACHE_TTL_SECS",
                &var("CACHE_TTL_SECS", &DEFAULT_CACHE_TTL_SECS.to_string()),
            )?,
        })
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T, CoreError> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::Configuration(format!("{key} has invalid value '{raw}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.cache_dir, PathBuf::from("static/cache"));
        assert_eq!(config.cache_ttl_secs, 86_400);
    }

    #[test]
    fn overrides_and_origin_list() {
        let env: HashMap<&str, &str> = [
            ("PORT", "9000"),
            ("CORS_ORIGINS", "http://a.test, ,http://b.test"),
            ("STATIC_ROOT", "/srv/batch"),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.static_root, PathBuf::from("/srv/batch"));
    }

    #[test]
    fn bad_port_is_configuration_error() {
        let result = ServerConfig::from_lookup(|k| (k == "PORT").then(|| "eighty".to_string()));
        assert_matches!(result, Err(CoreError::Configuration(msg)) if msg.contains("PORT"));
    }
}

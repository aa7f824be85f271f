//! Runtime configuration.
//!
//! All settings come from environment variables read once at startup; a
//! `.env` file in the working directory is honoured for local development.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use reqwest::Url;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_UPSTREAM_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Base URL of the upstream service, without a trailing slash.
    pub upstream_api_url: String,
    /// The only origin the CORS policy admits.
    pub cors_allowed_origin: HeaderValue,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_address_str =
            var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let upstream_api_url =
            var("UPSTREAM_API_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_API_URL.to_string());
        let upstream = Url::parse(&upstream_api_url).map_err(|e| {
            ConfigError::InvalidValue("UPSTREAM_API_URL".to_string(), e.to_string())
        })?;
        if !matches!(upstream.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(
                "UPSTREAM_API_URL".to_string(),
                format!("unsupported scheme '{}'", upstream.scheme()),
            ));
        }

        let origin = var("CORS_ALLOWED_ORIGIN")
            .unwrap_or_else(|| upstream.origin().ascii_serialization());
        let cors_allowed_origin = origin.parse::<HeaderValue>().map_err(|e| {
            ConfigError::InvalidValue("CORS_ALLOWED_ORIGIN".to_string(), e.to_string())
        })?;

        let max_upload_mb = match var("MAX_UPLOAD_MB") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue(
                    "MAX_UPLOAD_MB".to_string(),
                    format!("'{raw}' is not a whole number of megabytes"),
                )
            })?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };

        Ok(Self {
            bind_address,
            upstream_api_url: upstream_api_url.trim_end_matches('/').to_string(),
            cors_allowed_origin,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.upstream_api_url, "http://127.0.0.1:8000");
        assert_eq!(config.cors_allowed_origin, "http://127.0.0.1:8000");
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn cors_origin_follows_upstream_unless_set() {
        let config = load(&[("UPSTREAM_API_URL", "https://api.example.com/base/")]).unwrap();
        assert_eq!(config.upstream_api_url, "https://api.example.com/base");
        assert_eq!(config.cors_allowed_origin, "https://api.example.com");

        let config = load(&[("CORS_ALLOWED_ORIGIN", "http://localhost:5173")]).unwrap();
        assert_eq!(config.cors_allowed_origin, "http://localhost:5173");
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[("BIND_ADDRESS", "nowhere")]).unwrap_err();
        assert!(err.to_string().contains("BIND_ADDRESS"));

        let err = load(&[("UPSTREAM_API_URL", "ftp://files")]).unwrap_err();
        assert!(err.to_string().contains("UPSTREAM_API_URL"));

        let err = load(&[("MAX_UPLOAD_MB", "lots")]).unwrap_err();
        assert!(err.to_string().contains("MAX_UPLOAD_MB"));
    }

    #[test]
    fn env_example_admits_the_frontend_origin() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/.env.example");
        let vars: HashMap<String, String> = dotenvy::from_path_iter(path)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        assert_eq!(config.cors_allowed_origin, "http://127.0.0.1:8080");
        assert_ne!(config.cors_allowed_origin, "http://127.0.0.1:8000");
        assert_eq!(config.bind_address.port(), 3000);
    }
}

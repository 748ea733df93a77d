use std::path::Path;

use secrecy::SecretString;

use crate::config::schema::{
    ClientConfig, API_KEY_ENV, CREDBUZZ_API_URL_ENV, DEFAULT_BASE_URL, TRENDSAGE_API_URL_ENV,
};
use crate::error::ConfigError;

const MAX_TIMEOUT_SECS: u64 = 120;
const MAX_PAGE_SIZE: u32 = 100;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<ClientConfig, ConfigError> {
    let mut config: ClientConfig = serde_json::from_str(content)?;

    if let Some(var_name) = config.api_key_env_var.clone() {
        config.api_key = read_env(&var_name)?.map(SecretString::from);
        if config.api_key.is_none() {
            log::warn!("API key variable '{}' is not set", var_name);
        }
    }

    validate_config(&config)?;

    Ok(config)
}

impl ClientConfig {
    /// Builds a config from the process environment.
    ///
    /// The base URL comes from the first non-blank of
    /// `NEXT_PUBLIC_TRENDSAGE_API_URL`, `NEXT_PUBLIC_CREDBUZZ_API_URL`,
    /// falling back to the production backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        let trendsage = read_env(TRENDSAGE_API_URL_ENV)?;
        let credbuzz = read_env(CREDBUZZ_API_URL_ENV)?;
        let api_key = read_env(API_KEY_ENV)?;

        let config = ClientConfig {
            base_url: resolve_base_url(trendsage.as_deref(), credbuzz.as_deref()),
            api_key: api_key.map(SecretString::from),
            ..Default::default()
        };

        validate_config(&config)?;
        Ok(config)
    }
}

/// Picks the base URL by fallback order, ignoring blank values.
pub fn resolve_base_url(trendsage: Option<&str>, credbuzz: Option<&str>) -> String {
    [trendsage, credbuzz]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .to_string()
}

/// Reads an environment variable, treating blank values as unset.
fn read_env(name: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::EnvVarNotUnicode {
            name: name.to_string(),
        }),
    }
}

fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    let url = config.trimmed_base_url();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Validation {
            message: format!("Base URL must be http(s): '{}'", config.base_url),
        });
    }
    if reqwest::Url::parse(url).is_err() {
        return Err(ConfigError::Validation {
            message: format!("Base URL is not a valid URL: '{}'", config.base_url),
        });
    }

    for (name, secs) in [
        ("connectTimeoutSecs", config.connect_timeout_secs),
        ("requestTimeoutSecs", config.request_timeout_secs),
    ] {
        if secs == 0 || secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation {
                message: format!("{} must be between 1 and {}", name, MAX_TIMEOUT_SECS),
            });
        }
    }

    if config.poll_interval_secs == 0 {
        return Err(ConfigError::Validation {
            message: "pollIntervalSecs must be at least 1".to_string(),
        });
    }

    if config.page_size == 0 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation {
            message: format!("pageSize must be between 1 and {}", MAX_PAGE_SIZE),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_url_prefers_trendsage() {
        assert_eq!(
            resolve_base_url(Some("https://a.example"), Some("https://b.example")),
            "https://a.example"
        );
    }

    #[test]
    fn test_resolve_base_url_falls_back_to_credbuzz() {
        assert_eq!(
            resolve_base_url(None, Some("https://b.example")),
            "https://b.example"
        );
        assert_eq!(
            resolve_base_url(Some("   "), Some("https://b.example")),
            "https://b.example"
        );
    }

    #[test]
    fn test_resolve_base_url_default() {
        assert_eq!(resolve_base_url(None, None), DEFAULT_BASE_URL);
        assert_eq!(resolve_base_url(Some(""), Some("")), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = load_config_from_str(r#"{ "baseUrl": "ftp://api.cred.buzz" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let err = load_config_from_str(r#"{ "pollIntervalSecs": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("pollIntervalSecs"));
    }

    #[test]
    fn test_rejects_oversized_page() {
        let err = load_config_from_str(r#"{ "pageSize": 500 }"#).unwrap_err();
        assert!(err.to_string().contains("pageSize"));
    }

    #[test]
    fn test_rejects_excessive_timeout() {
        let err = load_config_from_str(r#"{ "requestTimeoutSecs": 600 }"#).unwrap_err();
        assert!(err.to_string().contains("requestTimeoutSecs"));
    }

    #[test]
    fn test_invalid_json() {
        let err = load_config_from_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson(_)));
    }
}

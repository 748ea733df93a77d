use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendsageError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Preference error: {0}")]
    Preference(#[from] PreferenceError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

/// Errors observed while talking to the matchmaking backend.
///
/// A 404 on job lookup is not represented here; lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The client-enforced timeout elapsed.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection refused, DNS failure, reset, etc.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is the backend `detail`/`error` field when present.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Response had neither a `data` nor a `result` payload.
    #[error("Response envelope is missing both 'data' and 'result'")]
    MissingEnvelope,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// Maps a transport-level reqwest error onto the client taxonomy.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidUrl(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No job is loaded for project '{0}'")]
    NoJob(String),

    #[error("Job {job_id} cannot be retried")]
    NotRetryable { job_id: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("Failed to read preferences '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write preferences '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt preferences file '{path}': {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not determine a preferences directory")]
    NoDirectory,
}

pub type Result<T> = std::result::Result<T, TrendsageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_displays_backend_message() {
        let err = ApiError::Http {
            status: 422,
            message: "project_id is required".to_string(),
        };
        assert_eq!(err.to_string(), "project_id is required");
        assert_eq!(err.status(), Some(422));
        assert_eq!(ApiError::Timeout("slow".into()).status(), None);
    }

    #[test]
    fn test_session_error_is_transparent_over_api() {
        let err: SessionError = ApiError::Network("connection refused".into()).into();
        assert_eq!(err.to_string(), "Network error: connection refused");
    }
}

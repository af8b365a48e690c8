//! Error types for release upload operations.
//!
//! Every failure the `after-emit` hook can hit funnels through [`UploaderError`]
//! so it can be classified (suppressed or reported) in one place.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sentry_release_uploader operations
pub type Result<T> = std::result::Result<T, UploaderError>;

/// Main error type for all sentry_release_uploader operations
#[derive(Error, Debug)]
pub enum UploaderError {
    /// A required option was not configured
    #[error("{0}")]
    MissingOption(#[from] RequiredOption),

    /// The Sentry API answered with a non-success status
    #[error("{method} {url} failed with status {status}: {body}")]
    Api {
        /// HTTP method of the failed request
        method: String,
        /// Full request URL
        url: String,
        /// Response status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// Transport-level HTTP failures (DNS, TLS, connection reset, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Removing a build output file failed
    #[error("Failed to delete {path}: {source}")]
    Cleanup {
        /// File that could not be removed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid asset pattern
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration file errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Required options, in the order they are validated
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredOption {
    /// Organization slug
    #[error("Must provide organization")]
    Organization,
    /// At least one project slug
    #[error("Must provide project")]
    Project,
    /// API key / auth token
    #[error("Must provide api key")]
    ApiKey,
    /// Release version (literal or derived)
    #[error("Must provide release version")]
    ReleaseVersion,
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path of the config file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unknown keys
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Path of the config file
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// Base URL cannot be used to build endpoint URLs
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Offending URL
        url: String,
        /// Reason for the error
        reason: String,
    },
}

impl UploaderError {
    /// HTTP status code carried by this error, if it came from the API
    pub fn status_code(&self) -> Option<u16> {
        match self {
            UploaderError::Api { status, .. } => Some(*status),
            UploaderError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the remote service rejected the request because the resource exists
    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(409)
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            UploaderError::MissingOption(RequiredOption::ApiKey) => vec![
                "Set SENTRY_AUTH_TOKEN or pass --api-key".to_string(),
                "Create a token with project:releases scope in Sentry settings".to_string(),
            ],
            UploaderError::MissingOption(RequiredOption::ReleaseVersion) => vec![
                "Set `release` in the config file, SENTRY_RELEASE, or pass --release".to_string(),
            ],
            UploaderError::MissingOption(option) => {
                vec![format!("Add the missing option: {}", option)]
            }
            UploaderError::Api { status: 401 | 403, .. } => vec![
                "Verify the API key is valid and has project:releases scope".to_string(),
            ],
            UploaderError::Api { status: 409, .. } => vec![
                "The release already exists; set suppressConflictError to downgrade this to a warning"
                    .to_string(),
                "Use shouldOverwrite to replace the existing artifacts".to_string(),
            ],
            UploaderError::Cleanup { path, .. } => vec![format!(
                "Check permissions on {} or disable deleteAfterCompile",
                path.display()
            )],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

//! Error types for the wpdeploy workspace

use thiserror::Error;

/// Top-level error for operations that go beyond loading a declaration
#[derive(Error, Debug)]
pub enum DeployError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering a configuration or resolved view failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Refusing to clobber an existing file
    #[error("File already exists: {path}")]
    AlreadyExists { path: String },
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Parse error
    #[error("Configuration parse error: {0}")]
    ParseError(String),

    /// Missing required field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Path breaks the trailing-separator or relative/absolute convention
    #[error("Invalid path for {field}: '{path}' ({reason})")]
    InvalidPath {
        field: String,
        path: String,
        reason: String,
    },

    /// Target tag outside dev/staging/live
    #[error("Unknown environment '{name}', expected one of: dev, staging, live")]
    UnknownEnvironment { name: String },

    /// Target is a valid tag but the declaration does not describe it
    #[error("Environment '{environment}' is not configured (set remote.staging_path to enable it)")]
    EnvironmentNotConfigured { environment: String },
}

impl ConfigError {
    /// Dotted name of the offending field, when the error refers to one
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { field } | ConfigError::InvalidPath { field, .. } => {
                Some(field.as_str())
            }
            _ => None,
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        ConfigError::MissingField {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_path(field: &str, path: &str, reason: &str) -> Self {
        ConfigError::InvalidPath {
            field: field.to_string(),
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for DeployError {
    fn from(err: serde_yaml::Error) -> Self {
        DeployError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DeployError {
    fn from(err: serde_json::Error) -> Self {
        DeployError::Serialization(err.to_string())
    }
}

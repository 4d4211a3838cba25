//! Error types and handling for the `GeoAPI` service

use thiserror::Error;

/// Main error type for the `GeoAPI` service
#[derive(Error, Debug)]
pub enum GeoApiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Provider responded with a body we could not understand
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Requested entity does not exist locally or upstream
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Persistent store errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl GeoApiError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GeoApiError::Config { .. } => {
                "Service is misconfigured. Please contact the administrator.".to_string()
            }
            GeoApiError::Api { .. } => {
                "An upstream data provider returned an unexpected response.".to_string()
            }
            GeoApiError::Validation { message } => format!("Invalid input: {message}"),
            GeoApiError::NotFound { message } => message.clone(),
            GeoApiError::Storage { .. } | GeoApiError::Io { .. } => {
                "Local storage is unavailable. Please try again later.".to_string()
            }
            GeoApiError::Cache { .. } => "Cache operation failed.".to_string(),
        }
    }
}

impl From<fjall::Error> for GeoApiError {
    fn from(err: fjall::Error) -> Self {
        GeoApiError::storage(err.to_string())
    }
}

impl From<postcard::Error> for GeoApiError {
    fn from(err: postcard::Error) -> Self {
        GeoApiError::storage(format!("record encoding failed: {err}"))
    }
}

impl From<tokio::task::JoinError> for GeoApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        GeoApiError::storage(format!("storage task failed: {err}"))
    }
}

impl From<anyhow::Error> for GeoApiError {
    fn from(err: anyhow::Error) -> Self {
        GeoApiError::cache(err.to_string())
    }
}

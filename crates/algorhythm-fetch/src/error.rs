//! Error types for the concrete providers.

use std::path::PathBuf;

use thiserror::Error;

use algorhythm_core::ProviderError;

/// Errors raised while loading a catalog or talking to a feature service.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feature service answered with a failing status.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: String,
        message: String,
    },

    /// The feature service answered 429.
    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    /// A response body could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// A catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A catalog document is malformed.
    #[error("invalid catalog: {0}")]
    Catalog(#[from] serde_json::Error),
}

impl FetchError {
    /// Returns `true` when the request may succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } | Self::RateLimited { .. } => true,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<FetchError> for ProviderError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Http {
                source_name,
                message,
            } => Self::Http {
                source_name,
                message,
            },
            FetchError::RateLimited { source_name } => Self::RateLimited { source_name },
            FetchError::Parse {
                source_name,
                message,
            } => Self::Parse {
                source_name,
                message,
            },
            FetchError::Request(e) => Self::Http {
                source_name: "features".to_string(),
                message: e.to_string(),
            },
            other @ (FetchError::Io { .. } | FetchError::Catalog(_)) => Self::Parse {
                source_name: "catalog".to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Convenience alias for provider results in this crate.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

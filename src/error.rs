// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

/// Everything that can abort an export run. Nothing here is retried.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A required environment value is absent or empty. Whitespace-only
    /// values count as present and are left to the parser.
    #[error("missing {0} environment variable")]
    Configuration(&'static str),

    /// Command-line value out of range.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// The credentials blob is not a service-account JSON object.
    #[error("malformed credentials")]
    Parse(#[source] serde_json::Error),

    /// Token acquisition against the OAuth endpoint failed.
    #[error("authentication failed")]
    Auth(#[from] google_cloud_auth::error::Error),

    #[error("request to {url} failed")]
    Remote {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid request url")]
    Url(#[from] url::ParseError),

    #[error("writing {path:?}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serializing {path:?}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ExportError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::FileSystem {
            path: path.into(),
            source,
        }
    }
}

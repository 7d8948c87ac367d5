//! Error taxonomy shared by the weather pipeline and the history store.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied data failed validation before any I/O happened.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Geocoding returned no match for the query.
    #[error("No location found for '{0}'")]
    NotFound(String),

    #[error("{context}: {source}")]
    Upstream {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Provider responded with status {status}: {body}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The provider answered, but not in the shape we rely on.
    #[error("Malformed provider payload: {0}")]
    MalformedPayload(String),

    #[error("History file {} is not valid JSON: {source}", path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn upstream(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Upstream { context: context.into(), source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// True for every failure caused by the provider rather than the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. } | Self::UpstreamStatus { .. } | Self::MalformedPayload(_)
        )
    }

    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => format!("Invalid request: {msg}"),
            Self::NotFound(_) => "City cannot be found".to_string(),
            Self::Upstream { .. } | Self::UpstreamStatus { .. } | Self::MalformedPayload(_) => {
                "Weather data is unavailable for this city".to_string()
            }
            Self::CorruptStore { path, .. } => {
                format!("Search history at {} is corrupt", path.display())
            }
            Self::Io { .. } => "Search history could not be accessed".to_string(),
        }
    }
}

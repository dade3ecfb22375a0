//! Error types for backend calls and client configuration.

use shared::error::ApiException;
use thiserror::Error;

/// Wording used when a failure carries no backend detail and no transport text.
pub const GENERIC_FAILURE: &str = "The analysis service could not be reached";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Api(#[from] ApiException),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid endpoint url: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("unexpected response from backend: {0}")]
    Decode(String),
    #[error("failed to read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("backend call was interrupted before it settled")]
    Interrupted,
}

impl BackendError {
    /// Text shown to the user for this failure.
    ///
    /// A backend-supplied `detail` wins; otherwise the generic description of
    /// the failure is used.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Api(api) => match &api.detail {
                Some(detail) => detail.clone(),
                None => format!("Request failed with status code {}", api.status),
            },
            other => other.to_string(),
        };
        if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid api base url '{raw}': {source}")]
    InvalidUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("api base url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

//! Error type shared by the remote clients.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AtlasError>;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{service} responded with {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response from {service}: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown view mode '{0}' (expected on-market or off-market)")]
    InvalidViewMode(String),
}

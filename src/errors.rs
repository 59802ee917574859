// src/errors.rs

use std::time::Duration;
use thiserror::Error;

/// Failure of a single call against the recommendation service.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The operation's timeout elapsed before a response was read.
    #[error("request to {url} timed out after {}s", .timeout.as_secs_f64())]
    Timeout { url: String, timeout: Duration },

    /// No response was received (connection refused, DNS, TLS, ...).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A response arrived with a non-success status code.
    #[error("{status} {status_text} {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body parsed as JSON but could not be coerced into the canonical schema.
    #[error(
        "unexpected response shape from {url} (schema v{}): {reason}",
        crate::schema::SCHEMA_VERSION
    )]
    Schema { url: String, reason: String },

    #[error("invalid request url: {0}")]
    InvalidUrl(String),

    #[error("conversation has no user message to send")]
    NoUserMessage,
}

impl RequestError {
    pub fn schema(url: impl Into<String>, reason: impl Into<String>) -> Self {
        RequestError::Schema {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Status code of an HTTP failure, `None` for every other kind.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RequestError::Timeout { .. })
    }
}

#[derive(Debug, Error)]
pub enum IkarusError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl IkarusError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        IkarusError::Config(msg.into())
    }
}

pub type IkarusResult<T> = Result<T, IkarusError>;

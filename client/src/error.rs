//! Client errors
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid configuration value
    #[error("Invalid {key}: {message}")]
    Config { key: &'static str, message: String },

    /// Request could not be sent or its body not read
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    /// Response body is not the expected JSON
    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Whether the server was reached and refused the request
    pub fn is_status(&self) -> bool {
        matches!(self, ClientError::Status { .. })
    }
}

//! Error types for supaorm

use thiserror::Error;

/// The main error type for supaorm operations
#[derive(Error, Debug)]
pub enum Error {
    /// Network, DNS or TLS failure reported by the HTTP transport
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// JSON encoding or decoding error
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// HTTP method outside GET, POST, PATCH and DELETE
    #[error("Unsupported HTTP method: {method}")]
    UnsupportedMethod { method: String },

    /// Invalid query configuration
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// Header name or value that cannot be sent over HTTP
    #[error("Invalid header: {name}")]
    InvalidHeader { name: String },

    /// Missing or malformed client configuration
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Convenience Result type for supaorm operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new API error from a status code and raw response body
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Create a new unsupported method error
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create a new invalid query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a new invalid header error
    pub fn invalid_header(name: impl Into<String>) -> Self {
        Self::InvalidHeader { name: name.into() }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status of an API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

//! Error types for the RouterOS DNS provider
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the RouterOS DNS provider
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (bad `<host>:<port>`, bad regex, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A composite target (MX, SRV) did not split into the expected number of fields
    #[error("malformed {record_type} record {target}")]
    MalformedTarget {
        /// Lowercase record type, e.g. "mx"
        record_type: String,
        /// The offending target value
        target: String,
    },

    /// The record type has no native field layout
    #[error("unsupported record type {0}")]
    UnsupportedRecordType(String),

    /// A TTL duration string could not be parsed
    #[error("invalid ttl {0:?}")]
    InvalidTtl(String),

    /// Ownership metadata could not be serialized
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    /// Router unreachable or command rejected
    #[error("Transport error: {0}")]
    Transport(String),

    /// Health check failed; the original cause is kept as the source
    #[error("client health check failed: {source}")]
    HealthCheck {
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// One or more items of a change batch failed
    #[error("failed to update {failed} records")]
    ApplyFailed {
        /// Number of failed sub-operations
        failed: usize,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a malformed target error
    pub fn malformed(record_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self::MalformedTarget {
            record_type: record_type.into(),
            target: target.into(),
        }
    }

    /// Create an unsupported record type error
    pub fn unsupported(record_type: impl Into<String>) -> Self {
        Self::UnsupportedRecordType(record_type.into())
    }

    /// Wrap a failure as a health check failure
    pub fn health_check(source: Error) -> Self {
        Self::HealthCheck {
            source: Box::new(source),
        }
    }
}

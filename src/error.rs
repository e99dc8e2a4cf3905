//! Error types for the proxy-rotator crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced while fetching, parsing or selecting proxies.
#[derive(Debug, Error)]
pub enum RotatorError {
    /// The provisioning source answered with something other than 200.
    #[error("proxy provider returned HTTP {status}")]
    ProviderRequestFailed { status: StatusCode },

    /// A raw provider record could not be turned into a descriptor. Only the
    /// address part of the record is kept; credential fields are redacted.
    #[error("malformed proxy record {record:?}: {reason}")]
    MalformedRecord { record: String, reason: &'static str },

    /// A selection was attempted before any fetch cycle completed.
    #[error("proxy pool is not initialized, fetch proxies first")]
    NotInitialized,

    /// The pool is initialized but holds no proxies.
    #[error("no proxy available in pool")]
    EmptyPool,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown proxy protocol: {0}")]
    UnknownProtocol(String),

    /// A descriptor could not be turned into a proxy URL.
    #[error("cannot build proxy URL for {0}")]
    InvalidProxyUrl(String),

    #[error("invalid provider endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Connection, decoding or client construction failure in reqwest.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RotatorError>;

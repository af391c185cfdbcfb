//! Typed errors at the net-crate boundaries: config loading and the
//! broker's socket lifecycle.

use std::net::AddrParseError;

use thiserror::Error;

/// Errors loading `ServerSettings` from its JSON document.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document could not be read from its source.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The document was not valid JSON, or didn't match the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required field was missing or left at its zero value.
    #[error("invalid config: {0}")]
    InvalidField(String),

    /// One of `TrustedClientIPs` was not a parseable IP address.
    #[error("invalid trusted IP entry: {0}")]
    BadTrustedIp(#[from] AddrParseError),
}

/// Errors from the broker's socket lifecycle. None of these are fatal to
/// the process; a bind failure is the one variant `main` treats as fatal
/// by propagating it out rather than logging and continuing.
#[derive(Error, Debug)]
pub enum BrokerError {
    /// The control or mirror listener failed to bind.
    #[error("failed to bind {what} listener on {addr}: {source}")]
    BindFailed {
        /// Which listener failed ("control" or "mirror").
        what: &'static str,
        /// The address it tried to bind.
        addr: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

//! Fetch Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source URL is not a valid HTTP(S) URL.
    #[display("invalid source URL: {_0}")]
    InvalidSource(#[error(not(source))] String),
    /// The HTTP client could not be constructed.
    #[display("could not build HTTP client")]
    Client,
    /// Connecting to, or talking to, the upstream server failed.
    #[display("request to upstream failed")]
    Request,
    /// The upstream server did not answer within the fetch timeout.
    #[display("request to upstream timed out")]
    Timeout,
    /// The upstream server answered with a non-success status.
    #[display("upstream responded with HTTP {_0}")]
    Status(#[error(not(source))] u16),
    /// The response body could not be read or decoded as text.
    #[display("unreadable response body")]
    Body,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request | Self::Timeout => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::InvalidSource(_) | Self::Client | Self::Body => false,
        }
    }
}

//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use winboxget_extract::models::ResourceKey;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The download page could not be retrieved.
    #[display("failed to fetch the download page")]
    FetchFailed,
    /// The download page was retrieved but could not be read as HTML.
    #[display("failed to parse the download page")]
    ParseFailed,
    /// The cache had no usable value and refreshing it failed.
    #[display("failed to resolve download link")]
    ResolveFailed,
    /// The download page was read, but it does not list this build.
    #[display("{_0} is not currently available")]
    KeyNotAvailable(#[error(not(source))] ResourceKey),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Upstream may come back, or start listing the build again on the
        // next refresh; a broken page stays broken until the vendor fixes it.
        !matches!(self, Self::ParseFailed)
    }
}

//! Version numbers derived from download URLs.
//!
//! The vendor publishes every build under a versioned directory, so the
//! version is never stored separately; it is read back out of the URL on
//! demand.

use exn::OptionExt;

use crate::consts::VERSION_SEGMENT;
use crate::error::{ErrorKind, Result};

/// Returns the version segment of a download URL.
///
/// The URL is split on `/` and the segment at a fixed position is returned,
/// so `https://mikrotik.com/routeros/winbox/4.0.1/winbox_windows64.exe`
/// yields `4.0.1`.
///
/// # Errors
///
/// Returns [`ErrorKind::MalformedUrl`] if the URL has too few segments or the
/// version segment is empty.
pub fn version(url: &str) -> Result<&str> {
    url.split('/')
        .nth(VERSION_SEGMENT)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .ok_or_raise(|| ErrorKind::MalformedUrl(url.to_string()))
}

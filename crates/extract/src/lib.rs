//! Download link extraction for the WinBox download page.
//!
//! The vendor lists every WinBox build as a plain anchor on one HTML page.
//! [`Extractor`] walks those anchors and sorts them into the fixed set of
//! [`ResourceKey`](models::ResourceKey)s this service redirects to. Nothing
//! here touches the network; see `winboxget-fetch` for that.

mod consts;
pub mod error;
mod extract;
pub mod models;

use tracing::instrument;

pub use crate::extract::Extractor;
use crate::models::ResourceMap;
pub use crate::models::version::version;

/// Easy, top-level entrypoint for the extraction of a [`ResourceMap`] from an
/// HTML document, storing every matched `href` verbatim.
///
/// Extraction never fails: an unparseable or unrelated document simply
/// produces an empty map.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn extract(html: &str) -> ResourceMap {
    Extractor::from_html(html).resources()
}

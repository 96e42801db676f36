//! In-memory cache of the current WinBox download links.
//!
//! The cache is not the source of truth; the vendor's download page is. It
//! only exists so that every redirect doesn't cost an upstream request.
//!
//! # Architecture
//! - [`ResourceCache`] holds the last-known [`ResourceMap`] and a single
//!   expiry for the whole map. Refreshes *merge* into it, so a link that
//!   briefly disappears upstream is never forgotten.
//! - [`Resolver`] is the entry point used by request handlers: it answers
//!   from the cache while it is fresh, and refreshes it through a
//!   [`Fetcher`](winboxget_fetch::Fetcher) when it isn't.
//!
//! The network request and the HTML parse never run under the cache's lock.
//! Concurrent callers that all find the cache stale each perform their own
//! refresh; the merges are idempotent, so the only cost is the redundant
//! requests.

mod cache;
pub mod error;
mod resolver;

pub use crate::cache::{FRESHNESS_WINDOW, ResourceCache};
pub use crate::resolver::Resolver;
pub use winboxget_extract::models::{ResourceKey, ResourceMap};

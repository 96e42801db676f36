//! Main extraction logic for the WinBox download page.

use std::convert::Infallible;
use std::str::FromStr;

use scraper::Html;
use tracing::instrument;
use url::Url;

use crate::consts;
use crate::models::{ResourceKey, ResourceMap};

/// Sorts the download links of a parsed HTML document into a [`ResourceMap`].
///
/// Without a base URL, matched `href`s are stored exactly as they appear in
/// the document. With one (see [`with_base`](Self::with_base)), relative
/// links are resolved against it so that only absolute URLs are produced.
#[derive(Debug)]
pub struct Extractor {
    document: Html,
    base: Option<Url>,
}
impl Extractor {
    pub fn from_document(document: Html) -> Self {
        Self { document, base: None }
    }

    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        Self::from_document(document)
    }

    /// Resolve relative links against `base`.
    pub fn with_base(mut self, base: impl Into<Option<Url>>) -> Self {
        self.base = base.into();
        self
    }

    /// Extracts every recognised download link.
    ///
    /// Never fails: a document without any matching links (or one so broken
    /// that the parser recovered nothing) produces an empty map. When several
    /// links classify as the same key, the last one in document order wins.
    #[instrument(skip(self), fields(base = self.base.as_ref().map(Url::as_str)))]
    pub fn resources(&self) -> ResourceMap {
        let mut resources = ResourceMap::new();
        for (key, href) in self.links() {
            let url = self.absolute(href);
            if let Some(previous) = resources.insert(key, url) {
                tracing::debug!(%key, %previous, "duplicate download link; keeping the later one");
            }
        }
        tracing::debug!(found = resources.len(), missing = ?resources.missing(), "extracted download links");
        resources
    }

    /// Classified, non-empty link targets in document order.
    fn links(&self) -> impl Iterator<Item = (ResourceKey, &str)> {
        self.document
            .select(&consts::ANCHOR_SELECTOR)
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter(|href| !href.is_empty())
            .filter_map(|href| ResourceKey::from_link(href).map(|key| (key, href)))
    }

    fn absolute(&self, href: &str) -> String {
        let Some(base) = &self.base else {
            return href.to_string();
        };
        match base.join(href) {
            Ok(url) => url.into(),
            Err(error) => {
                tracing::warn!(%href, %error, "could not resolve download link; storing it verbatim");
                href.to_string()
            },
        }
    }
}
impl FromStr for Extractor {
    type Err = Infallible;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_html(s))
    }
}
impl From<Html> for Extractor {
    fn from(document: Html) -> Self {
        Self::from_document(document)
    }
}
impl From<Extractor> for ResourceMap {
    fn from(extractor: Extractor) -> Self {
        extractor.resources()
    }
}

//! The landing page listing every download route with its current version.
//!
//! Template variables:
//!
//! | Variable        | Type     | Description                                  |
//! |-----------------|----------|----------------------------------------------|
//! | `title`         | `String` | Page title                                   |
//! | `links`         | `List`   | One entry per download, in route order       |
//! | `link.route`    | `String` | Redirect path, e.g. `/winbox4/mac`           |
//! | `link.label`    | `String` | Human readable name                          |
//! | `link.version`  | `String` | Version segment of the URL, or `unknown`     |
//!
//! Versions are scraped from a third-party page; templates should print them
//! through the `html` formatter (`{{ link.version|html }}`).

use crate::assets::Templates;
use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};
use winboxget_extract::models::{ResourceKey, ResourceMap};

/// Shown in place of a version that cannot be derived from the cached URL.
pub const UNKNOWN_VERSION: &str = "unknown";
const TITLE: &str = "Winboxget";
const TEMPLATE: &str = "index.html";

/// Compiled index page template. Compile once, render per request.
pub struct IndexPage {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl IndexPage {
    /// Compile the builtin index page template.
    pub fn new() -> Result<Self> {
        Templates::load(TEMPLATE)?.parse()
    }

    #[instrument(skip_all, fields(known = resources.len()))]
    pub fn render(&self, resources: &ResourceMap) -> Result<String> {
        self.template
            .render(&self.engine, Self::parameters(resources))
            .to_string()
            .or_raise(|| ErrorKind::Template)
    }

    fn parameters(resources: &ResourceMap) -> upon::Value {
        let links = ResourceKey::ALL
            .iter()
            .map(|&key| {
                let version = resources
                    .get(key)
                    .and_then(|url| winboxget_extract::version(url).ok())
                    .unwrap_or(UNKNOWN_VERSION);
                upon::value! {
                    route: key.route(),
                    label: key.label(),
                    version: version,
                }
            })
            .collect::<Vec<_>>();
        upon::value! {
            title: TITLE,
            links: upon::Value::List(links),
        }
    }
}
impl FromStr for IndexPage {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        engine.add_formatter("html", upon::fmt::escape_html);
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}

//! Layered configuration for the winboxget server.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A TOML file: the path given explicitly, otherwise `config.toml` in the
//!    platform config directory (e.g. `~/.config/winboxget/config.toml`) when
//!    it exists.
//! 3. Environment variables prefixed with `WINBOXGET_`, e.g.
//!    `WINBOXGET_LISTEN=127.0.0.1:9000`.
//!
//! Command line flags are applied on top by the binary.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::instrument;
use winboxget_fetch::DEFAULT_SOURCE_URL;

pub const ENV_PREFIX: &str = "WINBOXGET_";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub listen: SocketAddr,
    /// Page scraped for download links.
    pub source_url: String,
    /// Where the visit counter is persisted.
    pub counter_file: PathBuf,
    /// Keep redirecting to the last known link when the download page can't
    /// be refreshed.
    pub serve_stale: bool,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            counter_file: PathBuf::from("/data/counter.txt"),
            serve_stale: true,
        }
    }
}
impl Config {
    /// Load configuration from all sources.
    ///
    /// An explicit `path` must exist; the default location is skipped
    /// silently when it doesn't.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::figment(path).extract().or_raise(|| ErrorKind::Load)
    }

    fn figment(path: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match path.map(Path::to_path_buf).or_else(default_path) {
            Some(file) if path.is_some() => figment.merge(Toml::file_exact(file)),
            Some(file) => {
                tracing::debug!(file = %file.display(), "looking for configuration file");
                figment.merge(Toml::file(file))
            },
            None => figment,
        };
        figment.merge(Env::prefixed(ENV_PREFIX))
    }
}

/// `config.toml` inside the platform's per-user config directory.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "winboxget").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use winboxget_config::Config;

/// Stable "latest version" redirects for WinBox downloads.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file (TOML). Defaults to `config.toml` in the user's
    /// config directory, if present.
    #[arg(short, long, env = "WINBOXGET_CONFIG")]
    pub config: Option<PathBuf>,
    /// Address to listen on.
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,
    /// File the visit counter is persisted to.
    #[arg(long)]
    pub counter_file: Option<PathBuf>,
    /// Log everything at debug level, ignoring `RUST_LOG`.
    #[arg(short, long)]
    pub verbose: bool,
}
impl Cli {
    /// Apply command line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(counter_file) = &self.counter_file {
            config.counter_file = counter_file.clone();
        }
    }
}

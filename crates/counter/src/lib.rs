//! Visit counter with best-effort persistence to a plain text file.
//!
//! The file holds a single decimal number. It is replaced atomically (written
//! to a sibling temporary file, then renamed over the target) so a crash
//! mid-write never leaves a truncated value behind.

pub mod error;

use crate::error::{ErrorKind, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::instrument;

pub struct VisitCounter {
    visits: AtomicU64,
    path: Option<PathBuf>,
    // Serialises writers so an older value is never renamed over a newer one.
    write: Mutex<()>,
}
impl VisitCounter {
    /// A counter that starts at zero and is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            visits: AtomicU64::new(0),
            path: None,
            write: Mutex::new(()),
        }
    }

    /// Load the counter from `path`.
    ///
    /// Never fails: a missing, unreadable or unparseable file starts the
    /// counter at zero. The file is (re)written on the next increment.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let visits = match fs::read_to_string(&path).await {
            Ok(contents) => contents.trim().parse::<u64>().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "ignoring unparseable visit counter");
                0
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no visit counter yet; starting at zero");
                0
            },
            Err(err) => {
                tracing::warn!(error = %err, "could not read visit counter; starting at zero");
                0
            },
        };
        tracing::info!(visits, "loaded visit counter");
        Self {
            visits: AtomicU64::new(visits),
            path: Some(path),
            write: Mutex::new(()),
        }
    }

    pub fn current(&self) -> u64 {
        self.visits.load(Ordering::SeqCst)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Count one visit and return the new total.
    ///
    /// Persisting happens before returning, but a failure to persist is only
    /// logged: the in-memory count is authoritative.
    pub async fn increment(&self) -> u64 {
        let visits = self.visits.fetch_add(1, Ordering::SeqCst) + 1;
        if let Err(err) = self.persist().await {
            let cause: &ErrorKind = &err;
            tracing::warn!(error = %cause, "could not persist visit counter");
        }
        visits
    }

    /// Write the current total to disk. A no-op for in-memory counters.
    pub async fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let _guard = self.write.lock().await;
        // Read under the lock: whoever writes last writes the highest value.
        let visits = self.current();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|source| io(parent, source))?;
        }
        let temp = temp_path(path);
        fs::write(&temp, visits.to_string()).await.map_err(|source| io(&temp, source))?;
        fs::rename(&temp, path).await.map_err(|source| io(path, source))?;
        Ok(())
    }
}

fn io(path: &Path, source: std::io::Error) -> ErrorKind {
    ErrorKind::Io { path: path.to_path_buf(), source }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_else(|| OsString::from("counter"));
    name.push(".tmp");
    path.with_file_name(name)
}

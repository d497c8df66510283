//! Destinations for report snapshots.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub trait ResultSink {
    fn write(&self, name: &str, payload: &str) -> Result<()>;
}

/// Writes each snapshot to `<dir>/<name>.json`.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        FileSink {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl ResultSink for FileSink {
    fn write(&self, name: &str, payload: &str) -> Result<()> {
        let path = self.path_for(name);
        fs::write(&path, payload)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
        info!("Saved snapshot to {}", path.display());
        Ok(())
    }
}

/// Hands `payload` to `sink`. Failures are logged and swallowed; a snapshot
/// never decides whether the report itself succeeded.
pub fn persist_result(sink: &dyn ResultSink, name: &str, payload: &str) {
    if let Err(e) = sink.write(name, payload) {
        error!(error = %e, snapshot = name, "Failed to persist report snapshot");
    }
}

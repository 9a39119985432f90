//! Incremental-run state file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// What the last successful run recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecRunState {
    /// Source directory of the recorded run.
    pub source: PathBuf,
    /// Start of the recorded run, seconds since the Unix epoch.
    pub started_at_unix: u64,
}

impl SpecRunState {
    pub fn new(source: &Path, started_at: SystemTime) -> Self {
        let started_at_unix = started_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            source: source.to_path_buf(),
            started_at_unix,
        }
    }

    pub fn started_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.started_at_unix)
    }
}

/// Read the state file. A missing file means no previous run.
pub fn load_state(path: &Path) -> Result<Option<SpecRunState>> {
    let txt = match fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read state file {}", path.display()));
        }
    };
    let spec_state: SpecRunState = toml::from_str(&txt)
        .with_context(|| format!("Failed to parse state file {}", path.display()))?;
    Ok(Some(spec_state))
}

pub fn save_state(path: &Path, spec_state: &SpecRunState) -> Result<()> {
    let txt = toml::to_string(spec_state).context("Failed to serialize run state")?;
    if let Some(path_parent) = path.parent()
        && !path_parent.as_os_str().is_empty()
    {
        fs::create_dir_all(path_parent)
            .with_context(|| format!("Failed to create {}", path_parent.display()))?;
    }
    fs::write(path, txt).with_context(|| format!("Failed to write state file {}", path.display()))
}

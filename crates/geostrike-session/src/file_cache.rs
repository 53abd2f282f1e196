//! JSON-file vitals cache, so the fast path survives app restarts.

use std::fs;
use std::path::{Path, PathBuf};

use geostrike_core::error::CacheError;
use geostrike_core::types::PlayerVitalState;
use geostrike_engine::collaborators::VitalsCache;

/// Stores `PlayerVitalState` as pretty JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct FileVitalsCache {
    path: PathBuf,
}

impl FileVitalsCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache file `vitals.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("vitals.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VitalsCache for FileVitalsCache {
    fn load(&mut self) -> Result<Option<PlayerVitalState>, CacheError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn store(&mut self, vitals: &PlayerVitalState) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(vitals)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

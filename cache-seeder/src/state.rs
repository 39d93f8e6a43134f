use crate::types::{Result, ResultSet, SeederError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Durable home of a run's result set.
///
/// Every save replaces the file in one step (write a sibling temp file, then
/// rename), so a reader never sees a half-written snapshot.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    /// Prepares `path` for writing and stores `initial` there right away, so an
    /// unusable destination is reported before any work starts.
    pub fn open(path: impl Into<PathBuf>, initial: &ResultSet) -> Result<Self> {
        let store = Self { path: path.into() };
        if let Some(parent) = store.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| store.failure(e))?;
            }
        }
        store.save(initial)?;
        info!("Writing results to {} ({} prior records)", store.path.display(), initial.len());
        Ok(store)
    }

    /// Reads a snapshot written by a previous run.
    pub fn load(path: &Path) -> Result<ResultSet> {
        let raw = fs::read(path).map_err(|e| SeederError::Persistence {
            path: path.to_path_buf(),
            reason: format!("failed reading prior results: {}", e),
        })?;
        let results: ResultSet = serde_json::from_slice(&raw).map_err(|e| SeederError::Persistence {
            path: path.to_path_buf(),
            reason: format!("failed decoding prior results: {}", e),
        })?;
        info!("Loaded {} prior results from {}", results.len(), path.display());
        Ok(results)
    }

    pub fn save(&self, results: &ResultSet) -> Result<()> {
        let raw = serde_json::to_vec(results)?;
        let tmp_path = self.path.with_extension("json.tmp");
        write_synced(&tmp_path, &raw).map_err(|e| self.failure(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.failure(e))?;
        debug!("Saved {} results to {}", results.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn failure(&self, e: std::io::Error) -> SeederError {
        SeederError::Persistence {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}

/// Contents are on stable storage before this returns; `save` renames only after.
fn write_synced(path: &Path, raw: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(raw)?;
    file.sync_all()
}

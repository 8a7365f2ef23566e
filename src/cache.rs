//! Memoized load + derive keyed on the data directory's fingerprint.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::loader::{load_datasets, DATA_FILES};
use crate::pipeline::{build_unified, UnifiedSet};

/// Size and modification time of one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    pub name: &'static str,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

pub type Fingerprint = Vec<FileStamp>;

/// Stamp every input file under `dir`
pub fn fingerprint(dir: &Path) -> Result<Fingerprint> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingDirectory(dir.to_path_buf()));
    }
    DATA_FILES
        .iter()
        .map(|&name| {
            let meta = fs::metadata(dir.join(name)).map_err(|e| match e.kind() {
                ErrorKind::NotFound => PipelineError::MissingFile(name.to_string()),
                _ => PipelineError::Io(e),
            })?;
            Ok(FileStamp {
                name,
                len: meta.len(),
                modified: meta.modified().ok(),
            })
        })
        .collect()
}

pub struct DatasetCache {
    dir: PathBuf,
    fingerprint: Option<Fingerprint>,
    snapshot: Option<Arc<UnifiedSet>>,
}

impl DatasetCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            fingerprint: None,
            snapshot: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current unified set, rebuilt only when the input files changed
    pub fn snapshot(&mut self) -> Result<Arc<UnifiedSet>> {
        let current = fingerprint(&self.dir)?;

        if self.fingerprint.as_ref() == Some(&current) {
            if let Some(snapshot) = &self.snapshot {
                debug!("Using cached snapshot for {:?}", self.dir);
                return Ok(Arc::clone(snapshot));
            }
        }

        info!("Building snapshot for {:?}", self.dir);
        let datasets = load_datasets(&self.dir)?;
        let snapshot = Arc::new(build_unified(&datasets)?);

        self.fingerprint = Some(current);
        self.snapshot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    pub fn invalidate(&mut self) {
        self.fingerprint = None;
        self.snapshot = None;
    }
}

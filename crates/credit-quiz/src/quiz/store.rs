use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use super::dashboard::DashboardState;
use super::history::HistoryEntry;

/// Persistence boundary for the live dashboard document.
pub trait DashboardStore: Send + Sync {
    fn load(&self) -> Result<DashboardState, StoreError>;
    fn save(&self, state: &DashboardState) -> Result<(), StoreError>;
}

/// Append-only scoring log. Reads never fail: a missing or unreadable log is empty.
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Vec<HistoryEntry>;
    fn append(&self, entry: HistoryEntry) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unable to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("document at {path} is malformed: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Dashboard persisted as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileDashboardStore {
    path: PathBuf,
}

impl JsonFileDashboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DashboardStore for JsonFileDashboardStore {
    fn load(&self) -> Result<DashboardState, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn save(&self, state: &DashboardState) -> Result<(), StoreError> {
        write_document(&self.path, state)
    }
}

/// History persisted as a JSON array of timestamped results.
#[derive(Debug, Clone)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn load(&self) -> Vec<HistoryEntry> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "history unreadable; treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "history malformed; treating as empty");
                Vec::new()
            }
        }
    }

    fn append(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut entries = self.load();
        entries.push(entry);
        write_document(&self.path, &entries)
    }

    fn clear(&self) -> Result<(), StoreError> {
        write_document(&self.path, &Vec::<HistoryEntry>::new())
    }
}

/// Write through a sibling temp file and rename so readers never see a partial document.
fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let payload = serde_json::to_vec_pretty(value)?;
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let mut file = fs::File::create(&tmp_path).map_err(io_error)?;
    file.write_all(&payload).map_err(io_error)?;
    file.sync_all().map_err(io_error)?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(io_error)
}

//! Persistence of [`NotificationState`] between runs.
//!
//! Each account and resource owns its own state file at
//! `<state_dir>/<account>/<resource>.json`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::state::NotificationState;
use crate::error::StoreError;

/// Load/save boundary for dedup memory
pub trait StateStore {
    /// Load the last saved state; a store that was never written yields an
    /// empty state
    fn load(&self) -> Result<NotificationState, StoreError>;

    /// Persist the state so that a crash can never leave a half-written copy
    fn save(&self, state: &NotificationState) -> Result<(), StoreError>;
}

/// JSON file store with atomic replace
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store for `account`/`resource` under `state_dir`.
    ///
    /// Both ids become path components, so only alphanumeric characters,
    /// `-` and `_` are accepted.
    pub fn new(state_dir: &Path, account: &str, resource: &str) -> Result<Self, StoreError> {
        validate_id(account)?;
        validate_id(resource)?;
        Ok(Self {
            path: state_dir.join(account).join(format!("{}.json", resource)),
        })
    }

    /// Use an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<NotificationState, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "no saved notification state, starting fresh");
                return Ok(NotificationState::new());
            }
            Err(e) => return Err(self.io_error(&self.path, e)),
        };

        let mut state: NotificationState =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        state.normalize();
        Ok(state)
    }

    /// Write to a temp file created with O_CREAT|O_EXCL, sync, then rename
    /// over the target
    fn save(&self, state: &NotificationState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_error(dir, e))?;
        }

        let temp_path = self.path.with_extension("tmp");
        // Leftover from a previous failed write
        let _ = fs::remove_file(&temp_path);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(|e| self.io_error(&temp_path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| self.io_error(&temp_path, e))?;
        file.sync_all().map_err(|e| self.io_error(&temp_path, e))?;

        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(&self.path, e))?;
        debug!(path = ?self.path, "notification state saved");
        Ok(())
    }
}

/// In-process store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<Option<NotificationState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a copy of state read elsewhere, so saves never reach the
    /// original location
    pub fn with_state(state: NotificationState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<NotificationState, StoreError> {
        let guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone().unwrap_or_default())
    }

    fn save(&self, state: &NotificationState) -> Result<(), StoreError> {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(state.clone());
        Ok(())
    }
}

fn validate_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(StoreError::InvalidId { id: id.to_string() });
    }
    Ok(())
}

//! JSON file persistence for the monitor state.
//!
//! The state file is tiny and read/written once per invocation, so this
//! is plain synchronous `std::fs`. Loading never fails: a missing or
//! corrupt file reads as the zero state, which makes the next evaluation
//! run and notify immediately. Saving writes to a sibling temp file and
//! renames it over the target so a crash mid-write cannot leave a
//! half-written file behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use trafficwatch_core::state::MonitorState;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Minimal persistence seam for [`MonitorState`].
pub trait StateStore {
    /// Load persisted state. Missing or unreadable data yields the zero
    /// state rather than an error.
    fn load(&self) -> MonitorState;

    /// Persist the state for the next invocation.
    fn save(&self, state: &MonitorState) -> Result<(), StateError>;
}

/// File-backed store at a well-known path.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> MonitorState {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return MonitorState::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Unreadable state file, starting from zero state");
                return MonitorState::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Corrupt state file, starting from zero state");
                MonitorState::default()
            }
        }
    }

    fn save(&self, state: &MonitorState) -> Result<(), StateError> {
        let json = serde_json::to_string(state)?;
        let temp = self.temp_path();
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

#![forbid(unsafe_code)]

//! "Don't show again" storage.
//!
//! The tour only consults a [`DismissalStore`] when it is about to start and
//! when the user dismisses it; nothing is read or written while stepping.
//! Storage failures never reach the tour: a store that cannot be read
//! reports "not dismissed", and a failed write is logged and dropped.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Persistent dismissal flag.
pub trait DismissalStore {
    fn is_dismissed(&self) -> bool;
    /// Remember that the user does not want the tour again.
    fn dismiss(&mut self);
    /// Forget a previous dismissal.
    fn reset(&mut self);
}

impl<T: DismissalStore + ?Sized> DismissalStore for &mut T {
    fn is_dismissed(&self) -> bool {
        (**self).is_dismissed()
    }

    fn dismiss(&mut self) {
        (**self).dismiss();
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// Volatile store; forgets everything when dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStore {
    dismissed: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn dismissed() -> Self {
        Self { dismissed: true }
    }
}

impl DismissalStore for MemoryStore {
    fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    fn dismiss(&mut self) {
        self.dismissed = true;
    }

    fn reset(&mut self) {
        self.dismissed = false;
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DismissalRecord {
    #[serde(default)]
    dismissed: bool,
}

/// JSON file holding the dismissal flag.
///
/// A missing file means "not dismissed". [`reset`](DismissalStore::reset)
/// deletes the file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the flag, surfacing storage errors.
    pub fn load(&self) -> Result<bool, PersistenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(PersistenceError::Io(e)),
        };
        let record: DismissalRecord =
            serde_json::from_str(&content).map_err(PersistenceError::Json)?;
        Ok(record.dismissed)
    }

    /// Write the flag, surfacing storage errors.
    pub fn store(&self, dismissed: bool) -> Result<(), PersistenceError> {
        let body =
            serde_json::to_string(&DismissalRecord { dismissed }).map_err(PersistenceError::Json)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(PersistenceError::Io)?;
            }
        }
        std::fs::write(&self.path, body).map_err(PersistenceError::Io)
    }

    /// Delete the file, surfacing storage errors other than "already gone".
    pub fn remove(&self) -> Result<(), PersistenceError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::Io(e)),
        }
    }
}

impl DismissalStore for FileStore {
    fn is_dismissed(&self) -> bool {
        match self.load() {
            Ok(dismissed) => dismissed,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "dismissal flag unreadable, treating as not dismissed");
                false
            }
        }
    }

    fn dismiss(&mut self) {
        if let Err(err) = self.store(true) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to persist tour dismissal");
        }
    }

    fn reset(&mut self) {
        if let Err(err) = self.remove() {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to reset tour dismissal");
        }
    }
}

/// Storage failures from [`FileStore`].
#[derive(Debug)]
pub enum PersistenceError {
    Io(io::Error),
    /// The file exists but is not a valid dismissal record.
    Json(serde_json::Error),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "dismissal store I/O error: {e}"),
            Self::Json(e) => write!(f, "dismissal store is corrupt: {e}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

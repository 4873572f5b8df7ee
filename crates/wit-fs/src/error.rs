//! Error types for the filesystem backend.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use wit_core::{CoreError, WorkItemId};

/// Result type alias for filesystem operations.
pub type Result<T> = std::result::Result<T, FsError>;

/// Errors that can occur in filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    /// Workspace not found at the specified path.
    #[error("workspace not found at '{0}'")]
    WorkspaceNotFound(PathBuf),

    /// Workspace already exists.
    #[error("workspace already exists at '{0}'")]
    WorkspaceExists(PathBuf),

    /// Work item not found (or not in the requested space).
    #[error("work item not found: {0}")]
    ItemNotFound(WorkItemId),

    /// Tracker item not found.
    #[error("tracker item not found: {0}")]
    TrackerItemNotFound(String),

    /// The caller saved from a stale version.
    #[error("version conflict on work item {id}: expected {expected}, stored {actual}")]
    VersionConflict {
        id: WorkItemId,
        expected: u64,
        actual: u64,
    },

    /// A lock could not be acquired in time.
    #[error("lock timed out after {waited:?} at '{path}'")]
    LockTimeout { path: PathBuf, waited: Duration },

    /// Event log operation failed.
    #[error("event log {operation} failed for work item {work_item_id}: {source}")]
    EventLog {
        work_item_id: WorkItemId,
        operation: &'static str,
        #[source]
        source: Box<FsError>,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Coarse error classes callers act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Re-read and retry.
    VersionConflict,
    NotFound,
    /// Malformed input; not retryable.
    BadInput,
    /// Infrastructure fault; retry with backoff.
    Storage,
}

impl ErrorKind {
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::VersionConflict | Self::Storage)
    }
}

impl FsError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VersionConflict { .. } => ErrorKind::VersionConflict,
            Self::WorkspaceNotFound(_) | Self::ItemNotFound(_) | Self::TrackerItemNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Core(_) => ErrorKind::BadInput,
            Self::EventLog { source, .. } => source.kind(),
            Self::WorkspaceExists(_)
            | Self::LockTimeout { .. }
            | Self::Io(_)
            | Self::Yaml(_)
            | Self::Json(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn event_log(work_item_id: WorkItemId, operation: &'static str, source: Self) -> Self {
        Self::EventLog {
            work_item_id,
            operation,
            source: Box::new(source),
        }
    }
}

//! Filesystem backend for wit work item storage.
//!
//! Each work item is a directory under `work/items/<id>/` with:
//! - `meta.yml`: current version of the item, replaced atomically on save
//! - `events.ndjson`: append-only event log
//! - `meta.lock`, `events.lock`: advisory locks for writers

mod atomic;
pub mod config;
pub mod error;
pub mod event_log;
mod lock;
pub mod repository;
pub mod tracker;
pub mod workspace;

pub use config::WorkspaceConfig;
pub use error::{ErrorKind, FsError, Result};
pub use event_log::EventLog;
pub use repository::{EventRepository, SaveOutcome, WorkItemRepository};
pub use tracker::TrackerStore;
pub use workspace::Workspace;

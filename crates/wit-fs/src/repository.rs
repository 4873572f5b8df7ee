//! Storage contracts for work items and their event log.

use crate::error::Result;
use wit_core::{Event, Fields, NewEvent, SpaceId, WorkItem, WorkItemId};

/// Append-only, per-work-item event log.
pub trait EventRepository {
    /// Append an event, assigning its id (if absent), sequence and creation time.
    ///
    /// # Errors
    /// Fails with a storage-class error when the log cannot be written.
    fn create(&self, event: NewEvent) -> Result<Event>;

    /// All events of a work item in creation order; empty when there are none.
    ///
    /// # Errors
    /// Fails with a storage-class error when the log cannot be read.
    fn list(&self, work_item_id: &WorkItemId) -> Result<Vec<Event>>;
}

/// Result of a committed save.
#[derive(Debug)]
pub struct SaveOutcome {
    /// The item as stored, with its new version.
    pub item: WorkItem,
    /// Snapshot the save replaced.
    pub previous: Fields,
    /// Events appended for this save.
    pub events: Vec<Event>,
    /// Set when the save committed but its events could not be appended.
    pub audit_failure: Option<crate::FsError>,
}

/// Versioned work item storage.
pub trait WorkItemRepository {
    /// Store a new item at version 0. No events are recorded.
    ///
    /// # Errors
    /// `BadInput` for malformed fields, storage errors otherwise.
    fn create(&self, space_id: SpaceId, fields: Fields, actor: &str) -> Result<WorkItem>;

    /// Load an item of a space.
    ///
    /// # Errors
    /// `NotFound` when the item does not exist in that space.
    fn load(&self, space_id: SpaceId, id: WorkItemId) -> Result<WorkItem>;

    /// All items of a space, most recently updated first.
    ///
    /// # Errors
    /// Storage errors only.
    fn list(&self, space_id: SpaceId) -> Result<Vec<WorkItem>>;

    /// Commit `item.fields` if `item.version` matches the stored version, then
    /// record the resulting events.
    ///
    /// # Errors
    /// `VersionConflict`, `NotFound`, `BadInput` or storage errors. A failure to
    /// record events does not fail the save; see [`SaveOutcome::audit_failure`].
    fn save(&self, space_id: SpaceId, item: &WorkItem, actor: &str) -> Result<SaveOutcome>;
}

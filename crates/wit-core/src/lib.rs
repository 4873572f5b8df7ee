//! wit-core: Domain models and change derivation for work item tracking.
//!
//! This crate provides:
//! - `WorkItem`: versioned work item with a typed field snapshot
//! - `derive_changes`: the diff between two snapshots over the tracked fields
//! - `Event` / `NewEvent`: append-only audit records for those changes
//! - `FieldAssignment`: `name=value` parsing for updates

pub mod assign;
pub mod derive;
pub mod error;
pub mod event;
pub mod field;
pub mod ids;
pub mod item;
pub mod tracked;
pub mod tracker;
pub mod validate;

pub use assign::FieldAssignment;
pub use derive::{FieldChange, derive_changes};
pub use error::{CoreError, Result};
pub use event::{Event, EventName, NewEvent};
pub use field::{FieldKind, FieldValue, Fields, State};
pub use ids::{EventId, SpaceId, WorkItemId};
pub use item::WorkItem;
pub use tracked::{TRACKED_FIELDS, TrackedField};
pub use tracker::TrackerItem;
pub use validate::validate_fields;

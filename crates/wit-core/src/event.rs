//! Work item events: one record per tracked field change.

use crate::derive::FieldChange;
use crate::ids::{EventId, WorkItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a recorded change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventName {
    /// The assignee list changed.
    Assignees,
    /// The workflow state changed.
    State,
    /// The label list changed.
    Labels,
}

impl EventName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assignees => "assignees",
            Self::State => "state",
            Self::Labels => "labels",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event that has not been appended to a log yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Preassigned identity. The log generates one when absent.
    pub id: Option<EventId>,
    pub work_item_id: WorkItemId,
    pub name: EventName,
    pub old: String,
    pub new: String,
    /// Identity that performed the save.
    pub actor: Option<String>,
}

impl NewEvent {
    /// Build an event for a derived change.
    #[must_use]
    pub fn from_change(work_item_id: WorkItemId, change: FieldChange) -> Self {
        Self {
            id: None,
            work_item_id,
            name: change.name,
            old: change.old,
            new: change.new,
            actor: None,
        }
    }

    /// Set the acting identity.
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Stamp storage-assigned fields, producing the persisted form.
    #[must_use]
    pub fn into_event(self, sequence: u64, created_at: DateTime<Utc>) -> Event {
        Event {
            id: self.id.unwrap_or_else(EventId::generate),
            sequence,
            work_item_id: self.work_item_id,
            name: self.name,
            old: self.old,
            new: self.new,
            actor: self.actor,
            created_at,
        }
    }
}

/// A persisted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,

    /// 1-based position within the work item's log.
    pub sequence: u64,

    pub work_item_id: WorkItemId,

    pub name: EventName,

    /// Canonical value before the change; empty when absent.
    pub old: String,

    /// Canonical value after the change; empty when absent.
    pub new: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// Set by the storage layer when the event is appended.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change() -> FieldChange {
        FieldChange {
            name: EventName::State,
            old: "new".into(),
            new: "open".into(),
        }
    }

    #[test]
    fn test_into_event_generates_id() {
        let id = WorkItemId::new();
        let event = NewEvent::from_change(id, change())
            .with_actor("alice")
            .into_event(3, Utc::now());

        assert!(event.id.as_str().starts_with("evt_"));
        assert_eq!(event.sequence, 3);
        assert_eq!(event.work_item_id, id);
        assert_eq!(event.actor.as_deref(), Some("alice"));
    }

    #[test]
    fn test_into_event_keeps_preassigned_id() {
        let mut new_event = NewEvent::from_change(WorkItemId::new(), change());
        new_event.id = Some(EventId::from("evt_fixed"));
        let event = new_event.into_event(1, Utc::now());
        assert_eq!(event.id.as_str(), "evt_fixed");
    }

    #[test]
    fn test_event_serialization() {
        let event = NewEvent::from_change(WorkItemId::new(), change()).into_event(1, Utc::now());
        let json = serde_json::to_string(&event).unwrap();

        assert!(json.contains(r#""name":"state""#));
        assert!(json.contains(r#""old":"new""#));
        assert!(json.contains(r#""new":"open""#));
        assert!(!json.contains("actor"));
    }
}

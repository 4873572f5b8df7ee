//! Work item model.

use crate::field::{
    FieldValue, Fields, State, SYSTEM_ASSIGNEES, SYSTEM_LABELS, SYSTEM_STATE, SYSTEM_TITLE,
};
use crate::ids::{SpaceId, WorkItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trackable unit of work with versioned field state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkItem {
    /// Unique identifier.
    pub id: WorkItemId,

    /// Space the item belongs to.
    pub space_id: SpaceId,

    /// Optimistic concurrency token. Each successful save increments it by one.
    pub version: u64,

    /// Current field values.
    #[serde(default)]
    pub fields: Fields,

    /// Creation timestamp (ISO 8601 UTC).
    pub created_at: DateTime<Utc>,

    /// Last update timestamp (ISO 8601 UTC).
    pub updated_at: DateTime<Utc>,
}

impl WorkItem {
    /// Create a new, unsaved work item at version 0.
    #[must_use]
    pub fn new(space_id: SpaceId) -> Self {
        let now = Utc::now();
        Self {
            id: WorkItemId::new(),
            space_id,
            version: 0,
            fields: Fields::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set a field value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.with_field(SYSTEM_TITLE, FieldValue::Text(title.into()))
    }

    #[must_use]
    pub fn with_state(self, state: State) -> Self {
        self.with_field(SYSTEM_STATE, state)
    }

    #[must_use]
    pub fn with_assignees(self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.with_field(SYSTEM_ASSIGNEES, FieldValue::identities(ids))
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.fields.get(SYSTEM_TITLE).and_then(FieldValue::as_text)
    }

    #[must_use]
    pub fn state(&self) -> Option<State> {
        self.fields.get(SYSTEM_STATE).and_then(FieldValue::as_state)
    }

    /// Assigned identities; empty when the field is absent.
    #[must_use]
    pub fn assignees(&self) -> &[String] {
        self.fields
            .get(SYSTEM_ASSIGNEES)
            .and_then(FieldValue::as_list)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        self.fields
            .get(SYSTEM_LABELS)
            .and_then(FieldValue::as_list)
            .unwrap_or_default()
    }

    /// Touch the `updated_at` timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

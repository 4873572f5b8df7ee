//! The allowlist of fields whose changes are recorded as events.

use crate::event::EventName;
use crate::field::{FieldKind, FieldValue, SYSTEM_ASSIGNEES, SYSTEM_LABELS, SYSTEM_STATE};

/// A field whose changes produce events.
#[derive(Debug, Clone, Copy)]
pub struct TrackedField {
    /// Field name in the snapshot.
    pub field: &'static str,
    /// Event name emitted when the field changes.
    pub event: EventName,
    /// Kind every value of this field must have.
    pub kind: FieldKind,
    /// Canonical string form. Returns `None` when the value has another kind.
    pub serialize: fn(&FieldValue) -> Option<String>,
}

/// Tracked fields in the order they are compared.
pub const TRACKED_FIELDS: &[TrackedField] = &[
    TrackedField {
        field: SYSTEM_ASSIGNEES,
        event: EventName::Assignees,
        kind: FieldKind::Identities,
        serialize: serialize_identities,
    },
    TrackedField {
        field: SYSTEM_STATE,
        event: EventName::State,
        kind: FieldKind::State,
        serialize: serialize_state,
    },
    TrackedField {
        field: SYSTEM_LABELS,
        event: EventName::Labels,
        kind: FieldKind::Labels,
        serialize: serialize_labels,
    },
];

/// Find the tracked entry for a field name.
#[must_use]
pub fn lookup(field: &str) -> Option<&'static TrackedField> {
    TRACKED_FIELDS.iter().find(|tracked| tracked.field == field)
}

impl TrackedField {
    /// Canonical form of an optional value; absent is the empty string.
    ///
    /// # Panics
    /// Panics if the value's kind differs from the table entry.
    #[must_use]
    pub fn canonical(&self, value: Option<&FieldValue>) -> String {
        let Some(value) = value else {
            return String::new();
        };
        (self.serialize)(value).unwrap_or_else(|| {
            panic!(
                "tracked field '{}' holds a {} value, expected {}",
                self.field,
                value.kind(),
                self.kind
            )
        })
    }
}

fn serialize_identities(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Identities(ids) => Some(ids.join(",")),
        _ => None,
    }
}

fn serialize_labels(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Labels(labels) => Some(labels.join(",")),
        _ => None,
    }
}

fn serialize_state(value: &FieldValue) -> Option<String> {
    value.as_state().map(|state| state.as_str().to_owned())
}

//! Change derivation between two consecutive snapshots of a work item.

use crate::event::EventName;
use crate::field::Fields;
use crate::tracked::TRACKED_FIELDS;

/// One tracked field whose canonical form differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub name: EventName,
    pub old: String,
    pub new: String,
}

/// Compare two snapshots and return one change per differing tracked field.
///
/// Output follows the order of [`TRACKED_FIELDS`], not map iteration order.
/// Untracked fields are ignored. A field absent from both snapshots is not a
/// change; absent and empty lists compare equal.
///
/// # Panics
/// Panics if a tracked field holds a value of the wrong kind. Snapshots are
/// validated before they are committed, so this indicates a bug.
#[must_use]
pub fn derive_changes(old: &Fields, new: &Fields) -> Vec<FieldChange> {
    TRACKED_FIELDS
        .iter()
        .filter_map(|tracked| {
            let before = tracked.canonical(old.get(tracked.field));
            let after = tracked.canonical(new.get(tracked.field));
            (before != after).then(|| FieldChange {
                name: tracked.event,
                old: before,
                new: after,
            })
        })
        .collect()
}

//! Shape validation for field snapshots.

use crate::error::{CoreError, Result};
use crate::field::{FieldValue, Fields};
use crate::tracked;

/// Check that a snapshot can be committed and diffed.
///
/// # Errors
/// Returns `CoreError::Validation` when a field name is blank or padded, a
/// tracked field has the wrong kind, or a list entry is empty or contains the
/// list separator.
pub fn validate_fields(fields: &Fields) -> Result<()> {
    for (name, value) in fields {
        if name.is_empty() || name.trim() != name {
            return Err(CoreError::Validation(format!("invalid field name '{name}'")));
        }

        if let Some(entry) = tracked::lookup(name)
            && value.kind() != entry.kind
        {
            return Err(CoreError::Validation(format!(
                "field '{name}' must be {}, got {}",
                entry.kind,
                value.kind()
            )));
        }

        if let FieldValue::Identities(entries) | FieldValue::Labels(entries) = value {
            for entry in entries {
                if entry.trim().is_empty() {
                    return Err(CoreError::Validation(format!(
                        "field '{name}' contains an empty entry"
                    )));
                }
                if entry.contains(',') {
                    return Err(CoreError::Validation(format!(
                        "field '{name}' entry '{entry}' must not contain ','"
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{State, SYSTEM_ASSIGNEES, SYSTEM_STATE};

    fn single(name: &str, value: FieldValue) -> Fields {
        Fields::from([(name.to_string(), value)])
    }

    #[test]
    fn test_valid_snapshot() {
        let mut fields = single(SYSTEM_STATE, State::Open.into());
        fields.insert(SYSTEM_ASSIGNEES.into(), FieldValue::identities(["a", "b"]));
        fields.insert("points".into(), FieldValue::Integer(3));
        assert!(validate_fields(&fields).is_ok());
    }

    #[test]
    fn test_wrong_tracked_kind() {
        let fields = single(SYSTEM_STATE, FieldValue::from("resolved"));
        assert!(matches!(validate_fields(&fields), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_bad_list_entries() {
        let fields = single(SYSTEM_ASSIGNEES, FieldValue::identities(["a,b"]));
        assert!(validate_fields(&fields).is_err());

        let fields = single(SYSTEM_ASSIGNEES, FieldValue::identities([" "]));
        assert!(validate_fields(&fields).is_err());
    }

    #[test]
    fn test_bad_field_name() {
        let fields = single(" padded", FieldValue::from("x"));
        assert!(validate_fields(&fields).is_err());
        let fields = single("", FieldValue::from("x"));
        assert!(validate_fields(&fields).is_err());
    }
}

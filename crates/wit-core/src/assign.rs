//! `name=value` field assignments.
//!
//! Values are interpreted by field name:
//! - `system.assignees`, `system.labels`: comma-separated list (empty = empty list)
//! - `system.state`: a state token such as `resolved` or `in progress`
//! - `system.title`, `system.description`: text
//! - anything else: boolean, integer or float if it parses as one, text otherwise
//!
//! The value `-` removes the field.

use crate::error::{CoreError, Result};
use crate::field::{
    FieldValue, Fields, State, SYSTEM_ASSIGNEES, SYSTEM_DESCRIPTION, SYSTEM_LABELS, SYSTEM_STATE,
    SYSTEM_TITLE,
};
use serde_json::Value;

/// Marker value that removes a field.
pub const REMOVE_MARKER: &str = "-";

/// A single field assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAssignment {
    /// Field name (e.g. `system.state`).
    pub name: String,
    /// New value, or `None` to remove the field.
    pub value: Option<FieldValue>,
}

impl FieldAssignment {
    /// Create an assignment that sets a value.
    #[must_use]
    pub fn set(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Create an assignment that removes a field.
    #[must_use]
    pub fn remove(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Parse a `name=value` string.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidAssignment` if the format is invalid, or
    /// `CoreError::Validation` if a state token is unknown.
    pub fn parse(input: &str) -> Result<Self> {
        let (name, value) = input.split_once('=').ok_or_else(|| {
            CoreError::InvalidAssignment(format!("expected 'name=value', got '{input}'"))
        })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidAssignment(format!(
                "missing field name in '{input}'"
            )));
        }

        let value = value.trim();
        if value == REMOVE_MARKER {
            return Ok(Self::remove(name));
        }

        Ok(Self {
            name: name.to_string(),
            value: Some(parse_value(name, value)?),
        })
    }

    /// Apply the assignment to a snapshot, returning the previous value.
    pub fn apply(&self, fields: &mut Fields) -> Option<FieldValue> {
        match &self.value {
            Some(value) => fields.insert(self.name.clone(), value.clone()),
            None => fields.remove(&self.name),
        }
    }
}

fn parse_value(name: &str, raw: &str) -> Result<FieldValue> {
    let value = match name {
        SYSTEM_ASSIGNEES => FieldValue::Identities(split_list(raw)),
        SYSTEM_LABELS => FieldValue::Labels(split_list(raw)),
        SYSTEM_STATE => FieldValue::State(raw.parse::<State>()?),
        SYSTEM_TITLE | SYSTEM_DESCRIPTION => FieldValue::Text(raw.to_string()),
        _ => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Bool(b)) => FieldValue::Boolean(b),
            Ok(Value::Number(n)) => n
                .as_i64()
                .map(FieldValue::Integer)
                .or_else(|| n.as_f64().map(FieldValue::Float))
                .unwrap_or_else(|| FieldValue::Text(raw.to_string())),
            _ => FieldValue::Text(raw.to_string()),
        },
    };
    Ok(value)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_system_fields() {
        let op = FieldAssignment::parse("system.state=resolved").unwrap();
        assert_eq!(op.value, Some(FieldValue::State(State::Resolved)));

        let op = FieldAssignment::parse("system.assignees= a , b,").unwrap();
        assert_eq!(op.value, Some(FieldValue::identities(["a", "b"])));

        let op = FieldAssignment::parse("system.assignees=").unwrap();
        assert_eq!(op.value, Some(FieldValue::Identities(vec![])));

        let op = FieldAssignment::parse("system.title=42").unwrap();
        assert_eq!(op.value, Some(FieldValue::Text("42".into())));
    }

    #[test]
    fn test_parse_custom_scalars() {
        let op = FieldAssignment::parse("priority=3").unwrap();
        assert_eq!(op.value, Some(FieldValue::Integer(3)));

        let op = FieldAssignment::parse("estimate=1.5").unwrap();
        assert_eq!(op.value, Some(FieldValue::Float(1.5)));

        let op = FieldAssignment::parse("blocked=true").unwrap();
        assert_eq!(op.value, Some(FieldValue::Boolean(true)));

        let op = FieldAssignment::parse("team=platform").unwrap();
        assert_eq!(op.value, Some(FieldValue::Text("platform".into())));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            FieldAssignment::parse("no-equals"),
            Err(CoreError::InvalidAssignment(_))
        ));
        assert!(matches!(
            FieldAssignment::parse("=value"),
            Err(CoreError::InvalidAssignment(_))
        ));
        assert!(matches!(
            FieldAssignment::parse("system.state=done"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_apply_and_remove() {
        let mut fields = Fields::new();

        let old = FieldAssignment::parse("system.state=open")
            .unwrap()
            .apply(&mut fields);
        assert!(old.is_none());

        let old = FieldAssignment::parse("system.state=-")
            .unwrap()
            .apply(&mut fields);
        assert_eq!(old, Some(FieldValue::State(State::Open)));
        assert!(fields.is_empty());
    }
}

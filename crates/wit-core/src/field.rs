//! Field values and snapshots.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Title of the work item.
pub const SYSTEM_TITLE: &str = "system.title";
/// Workflow state.
pub const SYSTEM_STATE: &str = "system.state";
/// Assigned identities.
pub const SYSTEM_ASSIGNEES: &str = "system.assignees";
/// Categorization labels.
pub const SYSTEM_LABELS: &str = "system.labels";
/// Free-form description.
pub const SYSTEM_DESCRIPTION: &str = "system.description";

/// A complete field mapping of a work item at one point in time.
pub type Fields = BTreeMap<String, FieldValue>;

/// Workflow state of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum State {
    #[default]
    #[serde(rename = "new")]
    New,
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "resolved")]
    Resolved,
    #[serde(rename = "closed")]
    Closed,
}

impl State {
    /// All states in workflow order.
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Open,
        Self::InProgress,
        Self::Resolved,
        Self::Closed,
    ];

    /// The token stored in snapshots and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Open => "open",
            Self::InProgress => "in progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| CoreError::Validation(format!("unknown state '{s}'")))
    }
}

/// The kind of a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Identities,
    State,
    Labels,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Identities => "identities",
            Self::State => "state",
            Self::Labels => "labels",
        };
        f.write_str(name)
    }
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Ordered list of identity references.
    Identities(Vec<String>),
    State(State),
    Labels(Vec<String>),
}

impl FieldValue {
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Integer(_) => FieldKind::Integer,
            Self::Float(_) => FieldKind::Float,
            Self::Boolean(_) => FieldKind::Boolean,
            Self::Identities(_) => FieldKind::Identities,
            Self::State(_) => FieldKind::State,
            Self::Labels(_) => FieldKind::Labels,
        }
    }

    /// Build an identity list value.
    #[must_use]
    pub fn identities(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Identities(ids.into_iter().map(Into::into).collect())
    }

    /// Build a label list value.
    #[must_use]
    pub fn labels(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Labels(labels.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_state(&self) -> Option<State> {
        match self {
            Self::State(state) => Some(*state),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Identities(list) | Self::Labels(list) => Some(list),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Identities(list) | Self::Labels(list) => f.write_str(&list.join(",")),
            Self::State(state) => fmt::Display::fmt(state, f),
        }
    }
}

impl From<State> for FieldValue {
    fn from(value: State) -> Self {
        Self::State(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

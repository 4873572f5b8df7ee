//! Output formatting for the CLI.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;
use wit_core::{Event, TrackerItem, WorkItem};
use wit_fs::SaveOutcome;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Print output in the specified format.
pub fn print<T: Serialize + HumanDisplay>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => println!("{}", value.human_display()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

/// Print a list in the specified format.
pub fn print_list<T: Serialize + HumanDisplay>(values: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            for value in values {
                println!("{}", value.human_display());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(values)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(values)?),
    }
    Ok(())
}

/// Print a list of work item summaries with dynamic column widths.
pub fn print_item_list(items: &[WorkItemSummary], format: OutputFormat) -> Result<()> {
    if !matches!(format, OutputFormat::Human) {
        return print_list(items, format);
    }

    if items.is_empty() {
        println!("No work items found.");
        return Ok(());
    }

    let state_width = items.iter().map(|i| i.state.len()).max().unwrap_or(5).max(5);
    let assignee_width = items
        .iter()
        .map(|i| i.assignees.len())
        .max()
        .unwrap_or(1)
        .max(9);

    println!(
        "{:<36}  {:>3}  {:<state_w$}  {:<assignee_w$}  TITLE",
        "ID",
        "VER",
        "STATE",
        "ASSIGNEES",
        state_w = state_width,
        assignee_w = assignee_width
    );
    println!("{}", "-".repeat(36 + 3 + state_width + assignee_width + 20));

    for item in items {
        let assignees = if item.assignees.is_empty() {
            "-"
        } else {
            item.assignees.as_str()
        };
        println!(
            "{:<36}  {:>3}  {:<state_w$}  {:<assignee_w$}  {}",
            item.id,
            item.version,
            item.state,
            assignees,
            item.title,
            state_w = state_width,
            assignee_w = assignee_width
        );
    }
    Ok(())
}

/// Status document for a success message.
fn success_document(message: &str) -> serde_json::Value {
    serde_json::json!({ "status": "ok", "message": message })
}

/// Print a success message.
pub fn print_success(message: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => println!("{message}"),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&success_document(message))?);
        }
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&success_document(message))?),
    }
    Ok(())
}

/// Result of `wit set`.
#[derive(Debug, Serialize)]
pub struct SaveReport<'a> {
    pub item: &'a WorkItem,
    pub events: &'a [Event],
    /// Set when the item was saved but its history was not recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_failure: Option<String>,
}

impl<'a> From<&'a SaveOutcome> for SaveReport<'a> {
    fn from(outcome: &'a SaveOutcome) -> Self {
        Self {
            item: &outcome.item,
            events: &outcome.events,
            audit_failure: outcome.audit_failure.as_ref().map(ToString::to_string),
        }
    }
}

impl SaveReport<'_> {
    /// Warning line for stderr when the history could not be recorded.
    #[must_use]
    pub fn audit_warning(&self) -> Option<String> {
        self.audit_failure
            .as_ref()
            .map(|failure| format!("warning: item saved, but its history was not recorded: {failure}"))
    }
}

/// Print a save result. An audit failure always goes to stderr as well.
pub fn print_save(report: &SaveReport<'_>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            println!("{}", report.item.human_display());
            for event in report.events {
                println!("{}", event.human_display());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(report)?),
    }
    if let Some(warning) = report.audit_warning() {
        eprintln!("{warning}");
    }
    Ok(())
}

/// Trait for human-readable display.
pub trait HumanDisplay {
    fn human_display(&self) -> String;
}

impl HumanDisplay for WorkItem {
    fn human_display(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}  {}", self.id, self.title().unwrap_or("(untitled)"));
        let _ = writeln!(out, "  space:   {}", self.space_id);
        let _ = writeln!(out, "  version: {}", self.version);
        let _ = writeln!(
            out,
            "  updated: {}",
            self.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
        for (name, value) in &self.fields {
            let _ = writeln!(out, "  {name}: {value}");
        }
        out.trim_end().to_string()
    }
}

impl HumanDisplay for Event {
    fn human_display(&self) -> String {
        let old = if self.old.is_empty() { "∅" } else { self.old.as_str() };
        let new = if self.new.is_empty() { "∅" } else { self.new.as_str() };
        let actor = self.actor.as_deref().unwrap_or("-");
        format!(
            "#{:<3} {}  {:<9} {} -> {}  ({actor})",
            self.sequence,
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
            self.name,
            old,
            new
        )
    }
}

impl HumanDisplay for TrackerItem {
    fn human_display(&self) -> String {
        format!(
            "{:>4}  tracker {}  {}\n      {}",
            self.id, self.tracker_id, self.remote_item_id, self.item
        )
    }
}

/// One line of `wit list`.
#[derive(Debug, Serialize)]
pub struct WorkItemSummary {
    pub id: String,
    pub version: u64,
    pub state: String,
    pub assignees: String,
    pub title: String,
}

impl From<&WorkItem> for WorkItemSummary {
    fn from(item: &WorkItem) -> Self {
        Self {
            id: item.id.to_string(),
            version: item.version,
            state: item.state().map(|s| s.to_string()).unwrap_or_default(),
            assignees: item.assignees().join(","),
            title: item.title().unwrap_or_default().to_string(),
        }
    }
}

impl HumanDisplay for WorkItemSummary {
    fn human_display(&self) -> String {
        format!("{}  {}  {}", self.id, self.state, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wit_core::field::SYSTEM_STATE;
    use wit_core::{FieldAssignment, Fields, SpaceId};
    use wit_fs::Workspace;

    fn save_with_broken_log(break_log: bool) -> (TempDir, SaveOutcome) {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        let space = SpaceId::new();
        let item = ws.create_item(space, Fields::new(), "alice").unwrap();
        if break_log {
            std::fs::create_dir_all(ws.event_log().events_path(&item.id)).unwrap();
        }

        let ops = [FieldAssignment::parse(&format!("{SYSTEM_STATE}=closed")).unwrap()];
        let outcome = ws.update_item(space, item.id, None, &ops, "alice").unwrap();
        (tmp, outcome)
    }

    #[test]
    fn test_save_report_carries_audit_failure() {
        let (_tmp, outcome) = save_with_broken_log(true);
        let report = SaveReport::from(&outcome);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["item"]["version"], 1);
        let failure = json["audit_failure"].as_str().unwrap();
        assert!(failure.contains("event log create failed"));

        let warning = report.audit_warning().unwrap();
        assert!(warning.starts_with("warning: item saved"));
    }

    #[test]
    fn test_save_report_without_failure() {
        let (_tmp, outcome) = save_with_broken_log(false);
        let report = SaveReport::from(&outcome);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("audit_failure").is_none());
        assert_eq!(json["events"].as_array().unwrap().len(), 1);
        assert!(report.audit_warning().is_none());
    }

    #[test]
    fn test_success_document_escapes_message() {
        let message = r#"Initialized workspace at C:\work\"quoted""#;
        let text = serde_json::to_string(&success_document(message)).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["message"], message);
    }
}

//! CLI command implementations.

use crate::output::{self, OutputFormat, WorkItemSummary};
use anyhow::{Context as _, Result, bail};
use std::path::PathBuf;
use tracing::warn;
use wit_core::field::{SYSTEM_ASSIGNEES, SYSTEM_LABELS, SYSTEM_STATE, SYSTEM_TITLE};
use wit_core::{FieldAssignment, FieldValue, Fields, SpaceId, State, WorkItemId};
use wit_fs::{EventRepository, Workspace, WorkspaceConfig};

/// Options shared by every command.
pub struct Context {
    pub path: PathBuf,
    pub space: Option<SpaceId>,
    pub actor: String,
    pub format: OutputFormat,
}

impl Context {
    fn open(&self) -> Result<Workspace> {
        Workspace::open(&self.path).context("Failed to open workspace")
    }

    fn space(&self, ws: &Workspace) -> Result<SpaceId> {
        match self.space.or(ws.config().workspace.space) {
            Some(space) => Ok(space),
            None => bail!("No space given; pass --space or set workspace.space in .wit/config.yml"),
        }
    }
}

fn parse_id(id: &str) -> Result<WorkItemId> {
    id.parse().with_context(|| format!("Invalid work item id '{id}'"))
}

/// Initialize a new workspace.
pub fn init(ctx: &Context, name: Option<String>) -> Result<()> {
    let name = name.unwrap_or_else(|| {
        ctx.path
            .file_name()
            .map_or_else(|| "wit".to_string(), |n| n.to_string_lossy().to_string())
    });
    let mut config = WorkspaceConfig::new(name);
    if ctx.space.is_some() {
        config.workspace.space = ctx.space;
    }

    Workspace::init_with(&ctx.path, config).context("Failed to initialize workspace")?;
    output::print_success(
        &format!("Initialized workspace at {}", ctx.path.display()),
        ctx.format,
    )
}

/// Create a new work item.
pub fn new_item(
    ctx: &Context,
    title: String,
    state: Option<String>,
    assignees: Vec<String>,
    labels: Vec<String>,
) -> Result<()> {
    let ws = ctx.open()?;
    let space = ctx.space(&ws)?;

    let mut fields = Fields::new();
    fields.insert(SYSTEM_TITLE.to_string(), FieldValue::Text(title));
    if let Some(state) = state {
        let state: State = state.parse()?;
        fields.insert(SYSTEM_STATE.to_string(), state.into());
    }
    if !assignees.is_empty() {
        fields.insert(SYSTEM_ASSIGNEES.to_string(), FieldValue::Identities(assignees));
    }
    if !labels.is_empty() {
        fields.insert(SYSTEM_LABELS.to_string(), FieldValue::Labels(labels));
    }

    let item = ws
        .create_item(space, fields, &ctx.actor)
        .context("Failed to create item")?;
    output::print(&item, ctx.format)
}

/// List the work items of the space.
pub fn list(ctx: &Context) -> Result<()> {
    let ws = ctx.open()?;
    let items = ws
        .list_items(ctx.space(&ws)?)
        .context("Failed to list items")?;

    let summaries: Vec<WorkItemSummary> = items.iter().map(WorkItemSummary::from).collect();
    output::print_item_list(&summaries, ctx.format)
}

/// Show a work item.
pub fn show(ctx: &Context, id: &str) -> Result<()> {
    let ws = ctx.open()?;
    let item = ws
        .load_item(ctx.space(&ws)?, parse_id(id)?)
        .context("Failed to get item")?;
    output::print(&item, ctx.format)
}

/// Apply field assignments and save.
pub fn set(ctx: &Context, id: &str, version: Option<u64>, assignments: &[String]) -> Result<()> {
    let ws = ctx.open()?;
    let space = ctx.space(&ws)?;

    let operations = assignments
        .iter()
        .map(|a| FieldAssignment::parse(a))
        .collect::<wit_core::Result<Vec<_>>>()
        .context("Invalid assignment")?;

    let outcome = ws
        .update_item(space, parse_id(id)?, version, &operations, &ctx.actor)
        .context("Failed to save item")?;

    if let Some(failure) = &outcome.audit_failure {
        warn!(error = %failure, "Item saved, but its history could not be recorded");
    }

    output::print_save(&output::SaveReport::from(&outcome), ctx.format)
}

/// Show the event history of a work item.
pub fn events(ctx: &Context, id: &str) -> Result<()> {
    let ws = ctx.open()?;
    let events = ws
        .event_log()
        .list(&parse_id(id)?)
        .context("Failed to read events")?;

    if events.is_empty() {
        return output::print_success("No events recorded", ctx.format);
    }
    output::print_list(&events, ctx.format)
}

/// Stage a remote tracker item.
pub fn tracker_put(ctx: &Context, remote_id: &str, tracker: u64, item: String) -> Result<()> {
    let ws = ctx.open()?;
    let staged = ws
        .tracker()
        .upsert(remote_id, item, tracker)
        .context("Failed to stage tracker item")?;
    output::print(&staged, ctx.format)
}

/// Show a staged tracker item.
pub fn tracker_get(ctx: &Context, remote_id: &str) -> Result<()> {
    let ws = ctx.open()?;
    let staged = ws.tracker().get(remote_id)?;
    output::print(&staged, ctx.format)
}

/// List items staged by a tracker.
pub fn tracker_list(ctx: &Context, tracker: u64) -> Result<()> {
    let ws = ctx.open()?;
    let items = ws.tracker().list(tracker)?;
    output::print_list(&items, ctx.format)
}

//! Workspace management and work item operations.

use crate::atomic::write_atomic;
use crate::config::WorkspaceConfig;
use crate::error::{FsError, Result};
use crate::event_log::EventLog;
use crate::lock::FileLock;
use crate::repository::{EventRepository, SaveOutcome, WorkItemRepository};
use crate::tracker::TrackerStore;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use wit_core::field::SYSTEM_STATE;
use wit_core::{
    Event, FieldAssignment, Fields, NewEvent, SpaceId, WorkItem, WorkItemId, derive_changes,
    validate_fields,
};

/// Directory name for wit configuration.
const WIT_DIR: &str = ".wit";
/// Configuration file name.
const CONFIG_FILE: &str = "config.yml";
/// Items directory name.
const ITEMS_DIR: &str = "work/items";
/// Tracker staging directory name.
const TRACKER_DIR: &str = "work/tracker";
/// Meta file name within item directory.
const META_FILE: &str = "meta.yml";
/// Lock serializing saves of one item.
const META_LOCK: &str = "meta.lock";

/// A workspace manages work items on the filesystem.
#[derive(Debug)]
pub struct Workspace {
    /// Root path of the workspace.
    root: PathBuf,
    /// Workspace configuration.
    config: WorkspaceConfig,
    /// Per-item event logs.
    events: EventLog,
}

impl Workspace {
    /// Initialize a new workspace at the given path.
    ///
    /// # Errors
    /// Returns error if workspace already exists or IO fails.
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        Self::init_with(path, WorkspaceConfig::default())
    }

    /// Initialize a new workspace with an explicit configuration.
    ///
    /// # Errors
    /// Returns error if workspace already exists or IO fails.
    pub fn init_with(path: impl AsRef<Path>, config: WorkspaceConfig) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let wit_dir = root.join(WIT_DIR);

        if wit_dir.exists() {
            return Err(FsError::WorkspaceExists(root));
        }

        fs::create_dir_all(&wit_dir)?;
        fs::create_dir_all(root.join(ITEMS_DIR))?;
        fs::create_dir_all(root.join(TRACKER_DIR))?;

        let config_content = serde_yaml::to_string(&config)?;
        fs::write(wit_dir.join(CONFIG_FILE), config_content)?;

        info!(path = %root.display(), "Initialized workspace");

        Ok(Self::from_parts(root, config))
    }

    /// Open an existing workspace at the given path.
    ///
    /// # Errors
    /// Returns error if workspace doesn't exist or config is invalid.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let config_path = root.join(WIT_DIR).join(CONFIG_FILE);

        if !config_path.exists() {
            return Err(FsError::WorkspaceNotFound(root));
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: WorkspaceConfig = serde_yaml::from_str(&config_content)?;

        debug!(path = %root.display(), "Opened workspace");

        Ok(Self::from_parts(root, config))
    }

    fn from_parts(root: PathBuf, config: WorkspaceConfig) -> Self {
        let events = EventLog::new(root.join(ITEMS_DIR), config.storage.lock_timeout());
        Self {
            root,
            config,
            events,
        }
    }

    /// Get the workspace root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the workspace configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// The event log shared by all items of this workspace.
    #[must_use]
    pub const fn event_log(&self) -> &EventLog {
        &self.events
    }

    /// Staging storage for remote tracker items.
    #[must_use]
    pub fn tracker(&self) -> TrackerStore {
        TrackerStore::new(
            self.root.join(TRACKER_DIR),
            self.config.storage.lock_timeout(),
        )
    }

    fn item_dir(&self, id: &WorkItemId) -> PathBuf {
        self.root.join(ITEMS_DIR).join(id.to_string())
    }

    /// Create a new work item at version 0.
    ///
    /// The configured default state is filled in when `system.state` is absent.
    ///
    /// # Errors
    /// Returns error if the fields are malformed or IO fails.
    pub fn create_item(&self, space_id: SpaceId, fields: Fields, actor: &str) -> Result<WorkItem> {
        validate_fields(&fields)?;

        let mut item = WorkItem::new(space_id);
        item.fields = fields;
        item.fields
            .entry(SYSTEM_STATE.to_string())
            .or_insert_with(|| self.config.defaults.state.into());

        fs::create_dir_all(self.item_dir(&item.id))?;
        self.write_meta(&item)?;

        info!(id = %item.id, space_id = %space_id, actor = %actor, "Created work item");

        Ok(item)
    }

    /// Load a work item of a space.
    ///
    /// # Errors
    /// Returns `FsError::ItemNotFound` if the item is absent or belongs to another space.
    pub fn load_item(&self, space_id: SpaceId, id: WorkItemId) -> Result<WorkItem> {
        let item = self.read_meta(&id)?;
        if item.space_id != space_id {
            return Err(FsError::ItemNotFound(id));
        }
        Ok(item)
    }

    /// List the work items of a space, most recently updated first.
    ///
    /// # Errors
    /// Returns error if the items directory cannot be read.
    pub fn list_items(&self, space_id: SpaceId) -> Result<Vec<WorkItem>> {
        let items_dir = self.root.join(ITEMS_DIR);
        if !items_dir.exists() {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();

        for entry in fs::read_dir(&items_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let Ok(id) = name.parse::<WorkItemId>() else {
                debug!(dir = %name, "Skipping non-item directory");
                continue;
            };

            match self.read_meta(&id) {
                Ok(item) if item.space_id == space_id => items.push(item),
                Ok(_) => {}
                Err(e) => {
                    debug!(id = %id, error = %e, "Failed to read item, skipping");
                }
            }
        }

        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(items)
    }

    /// Save new field values for a work item.
    ///
    /// `item.version` must equal the stored version. The check, the write and
    /// the event append happen under the item's lock, so the snapshot pair the
    /// events are derived from is exactly the committed pair and each item's
    /// log follows its commit order.
    ///
    /// # Errors
    /// Returns `FsError::VersionConflict` for a stale version,
    /// `FsError::ItemNotFound` for an unknown item, a core validation error for
    /// malformed fields, or a storage error. Event append failures are
    /// reported in [`SaveOutcome::audit_failure`] instead.
    pub fn save(&self, space_id: SpaceId, item: &WorkItem, actor: &str) -> Result<SaveOutcome> {
        validate_fields(&item.fields)?;

        let dir = self.item_dir(&item.id);
        if !dir.join(META_FILE).exists() {
            return Err(FsError::ItemNotFound(item.id));
        }

        let _lock = FileLock::acquire(&dir.join(META_LOCK), self.config.storage.lock_timeout())?;

        let stored = self.load_item(space_id, item.id)?;
        if stored.version != item.version {
            warn!(
                id = %item.id,
                expected = item.version,
                actual = stored.version,
                "Version conflict"
            );
            return Err(FsError::VersionConflict {
                id: item.id,
                expected: item.version,
                actual: stored.version,
            });
        }

        let mut updated = stored.clone();
        updated.fields = item.fields.clone();
        updated.version = stored.version + 1;
        updated.touch();
        self.write_meta(&updated)?;

        info!(id = %updated.id, version = updated.version, actor = %actor, "Saved work item");

        let previous = stored.fields;
        let (events, audit_failure) = self.record_changes(&updated, &previous, actor);

        Ok(SaveOutcome {
            item: updated,
            previous,
            events,
            audit_failure,
        })
    }

    /// Apply assignments to the stored item and save it.
    ///
    /// With `expected_version` set, the save fails on a concurrent change
    /// instead of applying on top of it.
    ///
    /// # Errors
    /// Same as [`Workspace::save`].
    pub fn update_item(
        &self,
        space_id: SpaceId,
        id: WorkItemId,
        expected_version: Option<u64>,
        assignments: &[FieldAssignment],
        actor: &str,
    ) -> Result<SaveOutcome> {
        let mut item = self.load_item(space_id, id)?;
        if let Some(version) = expected_version {
            item.version = version;
        }
        for assignment in assignments {
            assignment.apply(&mut item.fields);
        }
        self.save(space_id, &item, actor)
    }

    /// Events recorded for a work item, oldest first.
    ///
    /// # Errors
    /// Returns a storage error if the log cannot be read.
    pub fn read_events(&self, id: &WorkItemId) -> Result<Vec<Event>> {
        self.events.list(id)
    }

    fn record_changes(
        &self,
        item: &WorkItem,
        previous: &Fields,
        actor: &str,
    ) -> (Vec<Event>, Option<FsError>) {
        let mut events = Vec::new();
        for change in derive_changes(previous, &item.fields) {
            let new_event = NewEvent::from_change(item.id, change).with_actor(actor);
            match self.events.create(new_event) {
                Ok(event) => events.push(event),
                Err(err) => {
                    warn!(
                        id = %item.id,
                        version = item.version,
                        error = %err,
                        "Save committed but events were not recorded"
                    );
                    return (events, Some(err));
                }
            }
        }
        (events, None)
    }

    // Private helpers

    fn read_meta(&self, id: &WorkItemId) -> Result<WorkItem> {
        let meta_path = self.item_dir(id).join(META_FILE);
        let content = match fs::read_to_string(&meta_path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(FsError::ItemNotFound(*id));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_yaml::from_str(&content)?)
    }

    fn write_meta(&self, item: &WorkItem) -> Result<()> {
        let meta_path = self.item_dir(&item.id).join(META_FILE);
        let content = serde_yaml::to_string(item)?;
        write_atomic(&meta_path, &content)?;
        Ok(())
    }
}

impl WorkItemRepository for Workspace {
    fn create(&self, space_id: SpaceId, fields: Fields, actor: &str) -> Result<WorkItem> {
        self.create_item(space_id, fields, actor)
    }

    fn load(&self, space_id: SpaceId, id: WorkItemId) -> Result<WorkItem> {
        self.load_item(space_id, id)
    }

    fn list(&self, space_id: SpaceId) -> Result<Vec<WorkItem>> {
        self.list_items(space_id)
    }

    fn save(&self, space_id: SpaceId, item: &WorkItem, actor: &str) -> Result<SaveOutcome> {
        Self::save(self, space_id, item, actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use tempfile::TempDir;
    use wit_core::field::{SYSTEM_ASSIGNEES, SYSTEM_TITLE};
    use wit_core::{EventName, FieldValue, State};

    fn setup() -> (TempDir, Workspace) {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        (tmp, ws)
    }

    fn titled(title: &str) -> Fields {
        Fields::from([(SYSTEM_TITLE.to_string(), FieldValue::from(title))])
    }

    #[test]
    fn test_init_workspace() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        assert!(tmp.path().join(".wit/config.yml").exists());
        assert!(tmp.path().join("work/items").exists());
        assert_eq!(ws.config().version, 1);
    }

    #[test]
    fn test_init_existing_fails() {
        let tmp = TempDir::new().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let result = Workspace::init(tmp.path());
        assert!(matches!(result, Err(FsError::WorkspaceExists(_))));
    }

    #[test]
    fn test_open_workspace() {
        let tmp = TempDir::new().unwrap();
        Workspace::init_with(tmp.path(), WorkspaceConfig::new("demo")).unwrap();

        let ws = Workspace::open(tmp.path()).unwrap();
        assert_eq!(ws.config().workspace.name.as_deref(), Some("demo"));
    }

    #[test]
    fn test_open_missing_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            Workspace::open(tmp.path()),
            Err(FsError::WorkspaceNotFound(_))
        ));
    }

    #[test]
    fn test_create_and_load_item() {
        let (_tmp, ws) = setup();
        let space = SpaceId::new();

        let item = ws.create_item(space, titled("Fix login"), "alice").unwrap();
        assert_eq!(item.version, 0);
        assert_eq!(item.state(), Some(State::New));

        let loaded = ws.load_item(space, item.id).unwrap();
        assert_eq!(loaded, item);
        assert!(ws.read_events(&item.id).unwrap().is_empty());
    }

    #[test]
    fn test_load_from_other_space_is_not_found() {
        let (_tmp, ws) = setup();
        let item = ws.create_item(SpaceId::new(), titled("x"), "alice").unwrap();

        let err = ws.load_item(SpaceId::new(), item.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_save_increments_version_and_returns_snapshots() {
        let (_tmp, ws) = setup();
        let space = SpaceId::new();
        let mut item = ws.create_item(space, titled("x"), "alice").unwrap();

        item.fields
            .insert(SYSTEM_STATE.into(), FieldValue::State(State::Open));
        let outcome = ws.save(space, &item, "alice").unwrap();

        assert_eq!(outcome.item.version, 1);
        assert_eq!(
            outcome.previous.get(SYSTEM_STATE),
            Some(&FieldValue::State(State::New))
        );
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].name, EventName::State);
        assert_eq!(outcome.events[0].actor.as_deref(), Some("alice"));
        assert!(outcome.audit_failure.is_none());
        assert_eq!(ws.load_item(space, item.id).unwrap().version, 1);
    }

    #[test]
    fn test_stale_version_conflicts() {
        let (_tmp, ws) = setup();
        let space = SpaceId::new();
        let item = ws.create_item(space, titled("x"), "alice").unwrap();

        ws.save(space, &item, "alice").unwrap();
        let err = ws.save(space, &item, "bob").unwrap_err();

        assert!(matches!(
            err,
            FsError::VersionConflict {
                expected: 0,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_save_unknown_item() {
        let (_tmp, ws) = setup();
        let item = WorkItem::new(SpaceId::new());
        let err = ws.save(item.space_id, &item, "alice").unwrap_err();
        assert!(matches!(err, FsError::ItemNotFound(_)));
    }

    #[test]
    fn test_save_malformed_fields() {
        let (_tmp, ws) = setup();
        let space = SpaceId::new();
        let mut item = ws.create_item(space, titled("x"), "alice").unwrap();

        item.fields
            .insert(SYSTEM_ASSIGNEES.into(), FieldValue::from("alice"));
        let err = ws.save(space, &item, "alice").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadInput);
        assert_eq!(ws.load_item(space, item.id).unwrap().version, 0);
    }

    #[test]
    fn test_update_item_with_assignments() {
        let (_tmp, ws) = setup();
        let space = SpaceId::new();
        let item = ws.create_item(space, titled("x"), "alice").unwrap();

        let ops = vec![
            FieldAssignment::parse("system.state=in progress").unwrap(),
            FieldAssignment::parse("system.assignees=alice").unwrap(),
        ];
        let outcome = ws.update_item(space, item.id, None, &ops, "alice").unwrap();

        assert_eq!(outcome.item.state(), Some(State::InProgress));
        assert_eq!(outcome.item.assignees(), ["alice"]);
        let names: Vec<EventName> = outcome.events.iter().map(|e| e.name).collect();
        assert_eq!(names, [EventName::Assignees, EventName::State]);

        let err = ws
            .update_item(space, item.id, Some(0), &ops, "alice")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionConflict);
    }

    #[test]
    fn test_list_items_by_space() {
        let (_tmp, ws) = setup();
        let space = SpaceId::new();

        ws.create_item(space, titled("Task 1"), "alice").unwrap();
        ws.create_item(space, titled("Task 2"), "alice").unwrap();
        ws.create_item(SpaceId::new(), titled("Other"), "alice")
            .unwrap();

        let items = ws.list_items(space).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.space_id == space));
    }

    #[test]
    fn test_event_append_failure_keeps_save() {
        let (_tmp, ws) = setup();
        let space = SpaceId::new();
        let mut item = ws.create_item(space, titled("x"), "alice").unwrap();

        // A directory where the log file should be makes every append fail.
        fs::create_dir_all(ws.event_log().events_path(&item.id)).unwrap();

        item.fields
            .insert(SYSTEM_STATE.into(), FieldValue::State(State::Closed));
        let outcome = ws.save(space, &item, "alice").unwrap();

        assert_eq!(outcome.item.version, 1);
        assert!(outcome.events.is_empty());
        let failure = outcome.audit_failure.unwrap();
        assert!(matches!(failure, FsError::EventLog { operation: "create", .. }));
        assert_eq!(
            ws.load_item(space, item.id).unwrap().state(),
            Some(State::Closed)
        );
    }
}

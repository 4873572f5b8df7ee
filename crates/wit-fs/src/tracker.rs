//! Staging storage for items fetched from remote trackers.

use crate::atomic::write_atomic;
use crate::error::{FsError, Result};
use crate::lock::FileLock;
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use wit_core::{CoreError, TrackerItem};

/// Staged items file name.
const ITEMS_FILE: &str = "items.json";
/// Lock guarding writes to the items file.
const ITEMS_LOCK: &str = "items.lock";

/// Tracker items keyed by remote item id.
#[derive(Debug, Clone)]
pub struct TrackerStore {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl TrackerStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout,
        }
    }

    /// Insert a new staged item, or replace the payload of an existing one.
    ///
    /// # Errors
    /// Returns `BadInput` for an empty remote id, or a storage error.
    pub fn upsert(
        &self,
        remote_item_id: &str,
        item: impl Into<String>,
        tracker_id: u64,
    ) -> Result<TrackerItem> {
        let remote_item_id = remote_item_id.trim();
        if remote_item_id.is_empty() {
            return Err(CoreError::Validation("remote item id must not be empty".into()).into());
        }

        let _lock = FileLock::acquire(&self.dir.join(ITEMS_LOCK), self.lock_timeout)?;
        let mut items = self.read_all()?;
        let now = Utc::now();

        let next_id = items.values().map(|i| i.id).max().unwrap_or(0) + 1;
        let staged = items
            .entry(remote_item_id.to_string())
            .and_modify(|existing| existing.updated_at = now)
            .or_insert_with(|| TrackerItem {
                id: next_id,
                remote_item_id: remote_item_id.to_string(),
                item: String::new(),
                tracker_id,
                created_at: now,
                updated_at: now,
            });
        staged.item = item.into();
        staged.tracker_id = tracker_id;
        let staged = staged.clone();

        write_atomic(
            &self.dir.join(ITEMS_FILE),
            &serde_json::to_string_pretty(&items)?,
        )?;

        debug!(remote_item_id = %staged.remote_item_id, id = staged.id, "Staged tracker item");
        Ok(staged)
    }

    /// Look up a staged item by remote id.
    ///
    /// # Errors
    /// Returns `FsError::TrackerItemNotFound` if absent.
    pub fn get(&self, remote_item_id: &str) -> Result<TrackerItem> {
        self.read_all()?
            .remove(remote_item_id.trim())
            .ok_or_else(|| FsError::TrackerItemNotFound(remote_item_id.to_string()))
    }

    /// Staged items fetched by one tracker, ordered by id.
    ///
    /// # Errors
    /// Returns a storage error if the items file cannot be read.
    pub fn list(&self, tracker_id: u64) -> Result<Vec<TrackerItem>> {
        let mut items: Vec<TrackerItem> = self
            .read_all()?
            .into_values()
            .filter(|item| item.tracker_id == tracker_id)
            .collect();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    fn read_all(&self) -> Result<BTreeMap<String, TrackerItem>> {
        match fs::read_to_string(self.dir.join(ITEMS_FILE)) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

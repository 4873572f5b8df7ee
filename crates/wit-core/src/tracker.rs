//! Remote tracker staging records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An item fetched from a remote tracker, staged before it is pushed to a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerItem {
    pub id: u64,

    /// Remote item ID, unique across all trackers.
    pub remote_item_id: String,

    /// Raw field values as received from the remote tracker.
    pub item: String,

    /// Tracker configuration this item was fetched by.
    pub tracker_id: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

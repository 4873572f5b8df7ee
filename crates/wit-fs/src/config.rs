//! Workspace configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wit_core::{SpaceId, State};

/// Workspace configuration stored in `.wit/config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Workspace settings.
    #[serde(default)]
    pub workspace: WorkspaceSettings,

    /// Default values for new items.
    #[serde(default)]
    pub defaults: ItemDefaults,

    /// Storage tuning.
    #[serde(default)]
    pub storage: StorageSettings,
}

const fn default_version() -> u32 {
    1
}

/// Workspace-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceSettings {
    /// Workspace name.
    #[serde(default)]
    pub name: Option<String>,

    /// Space used when a command does not name one.
    #[serde(default)]
    pub space: Option<SpaceId>,
}

/// Default values for new work items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemDefaults {
    /// State given to items created without one.
    #[serde(default)]
    pub state: State,
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// How long a writer waits for a per-item lock.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

const fn default_lock_timeout_ms() -> u64 {
    5_000
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StorageSettings {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace: WorkspaceSettings::default(),
            defaults: ItemDefaults::default(),
            storage: StorageSettings::default(),
        }
    }
}

impl WorkspaceConfig {
    /// Create a new config with the given workspace name and a fresh default space.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            workspace: WorkspaceSettings {
                name: Some(name.into()),
                space: Some(SpaceId::new()),
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: WorkspaceConfig = serde_yaml::from_str("workspace:\n  name: demo\n").unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.workspace.name.as_deref(), Some("demo"));
        assert!(config.workspace.space.is_none());
        assert_eq!(config.defaults.state, State::New);
        assert_eq!(config.storage.lock_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_state_default_override() {
        let config: WorkspaceConfig =
            serde_yaml::from_str("defaults:\n  state: open\nstorage:\n  lock_timeout_ms: 50\n")
                .unwrap();
        assert_eq!(config.defaults.state, State::Open);
        assert_eq!(config.storage.lock_timeout_ms, 50);
    }
}

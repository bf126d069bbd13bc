//! Construction-time configuration for the coordinator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use savekeep_core::SerializationFormat;
use savekeep_persistence::StoreConfig;

/// Profile adopted when no saved profile exists yet.
pub const DEFAULT_PROFILE_ID: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub storage_root: PathBuf,
    pub store: StoreConfig,
    /// Turns every load, save, listing and deletion into a no-op
    pub disable_persistence: bool,
    /// Forces the active profile, bypassing most-recent selection
    pub override_profile_id: Option<String>,
    pub default_profile_id: String,
    /// Periodic save while the command loop runs; off when `None`
    pub autosave_interval: Option<Duration>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("saves"),
            store: StoreConfig::default(),
            disable_persistence: false,
            override_profile_id: None,
            default_profile_id: DEFAULT_PROFILE_ID.to_string(),
            autosave_interval: None,
        }
    }
}

impl PersistenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = root.into();
        self
    }

    pub fn with_file_name_template(mut self, template: impl Into<String>) -> Self {
        self.store.file_name_template = template.into();
        self
    }

    pub fn with_encryption(mut self, key: impl Into<String>) -> Self {
        self.store.use_encryption = true;
        self.store.encryption_key = key.into();
        self
    }

    pub fn with_backups(mut self, enabled: bool) -> Self {
        self.store.backup_on_save = enabled;
        self
    }

    pub fn with_format(mut self, format: SerializationFormat) -> Self {
        self.store.format = format;
        self
    }

    pub fn with_persistence_disabled(mut self, disabled: bool) -> Self {
        self.disable_persistence = disabled;
        self
    }

    pub fn with_override_profile_id(mut self, profile_id: impl Into<String>) -> Self {
        self.override_profile_id = Some(profile_id.into());
        self
    }

    pub fn with_default_profile_id(mut self, profile_id: impl Into<String>) -> Self {
        self.default_profile_id = profile_id.into();
        self
    }

    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = Some(interval);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{
            "storage_root": "/var/game/saves",
            "disable_persistence": true,
            "store": { "use_encryption": true }
        }"#;

        let config: PersistenceConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.storage_root, PathBuf::from("/var/game/saves"));
        assert!(config.disable_persistence);
        assert!(config.store.use_encryption);
        assert_eq!(config.store.file_name_template, "{profile}.save");
        assert_eq!(config.default_profile_id, DEFAULT_PROFILE_ID);
        assert_eq!(config.override_profile_id, None);
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = PersistenceConfig::new()
            .with_storage_root("/tmp/x")
            .with_encryption("key")
            .with_backups(true)
            .with_override_profile_id("test_slot")
            .with_autosave_interval(Duration::from_secs(60));

        assert!(config.store.use_encryption);
        assert_eq!(config.store.encryption_key, "key");
        assert!(config.store.backup_on_save);
        assert_eq!(config.override_profile_id.as_deref(), Some("test_slot"));
        assert_eq!(config.autosave_interval, Some(Duration::from_secs(60)));
    }
}

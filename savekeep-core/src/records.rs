//! # Records
//!
//! The two record kinds savekeep persists: a per-profile [`GameData`]
//! snapshot and a single cross-profile [`PlayerData`] record.
//!
//! Subsystems never add fields to the record structs themselves. Each one
//! owns one or more keys in the record's [`Sections`] map and stores any
//! serde-serializable value there.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Result, Timestamp};

/// Subsystem-owned fields of a record, keyed by section name.
///
/// # Examples
///
/// ```rust
/// use savekeep_core::Sections;
///
/// let mut sections = Sections::default();
/// sections.set("score", &42u32).unwrap();
/// assert_eq!(sections.get::<u32>("score").unwrap(), Some(42));
/// assert_eq!(sections.get::<u32>("missing").unwrap(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sections(BTreeMap<String, serde_json::Value>);

impl Sections {
    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// * `SaveError::Serialization` if `value` cannot be represented as JSON
    pub fn set<T: Serialize + ?Sized>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.0.insert(key.into(), value);
        Ok(())
    }

    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the section has never been written.
    ///
    /// # Errors
    /// * `SaveError::Serialization` if the stored value does not match `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.0.get(key) {
            Some(value) => Ok(Some(T::deserialize(value)?)),
            None => Ok(None),
        }
    }

    /// Raw JSON view of a section.
    pub fn get_raw(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Snapshot of one save profile.
///
/// `last_updated` is owned by the coordinator: it is stamped on every
/// successful save and strictly increases across saves of the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    pub player_saved_name: String,
    pub last_updated: Timestamp,
    #[serde(default)]
    pub sections: Sections,
}

impl GameData {
    /// Creates a blank snapshot for a new game.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use savekeep_core::{GameData, Timestamp};
    ///
    /// let data = GameData::new("Alice");
    /// assert_eq!(data.player_saved_name(), "Alice");
    /// assert_eq!(data.last_updated, Timestamp::NEVER);
    /// assert!(data.sections.is_empty());
    /// ```
    pub fn new(player_saved_name: impl Into<String>) -> Self {
        Self {
            player_saved_name: player_saved_name.into(),
            last_updated: Timestamp::NEVER,
            sections: Sections::default(),
        }
    }

    pub fn player_saved_name(&self) -> &str {
        &self.player_saved_name
    }

    /// Stamps `last_updated` with a timestamp strictly after the current one.
    pub fn touch(&mut self) -> Timestamp {
        self.last_updated = Timestamp::next_after(self.last_updated);
        self.last_updated
    }
}

/// The single player record shared by every profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    #[serde(default)]
    pub last_updated: Timestamp,
    #[serde(default)]
    pub sections: Sections,
}

impl PlayerData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps `last_updated` with a timestamp strictly after the current one.
    pub fn touch(&mut self) -> Timestamp {
        self.last_updated = Timestamp::next_after(self.last_updated);
        self.last_updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Inventory {
        coins: u32,
        items: Vec<String>,
    }

    #[test]
    fn test_sections_store_structured_values() {
        let mut data = GameData::new("Bob");
        let inventory = Inventory {
            coins: 12,
            items: vec!["key".to_string(), "map".to_string()],
        };

        data.sections.set("inventory", &inventory).unwrap();

        let restored: Inventory = data.sections.get("inventory").unwrap().unwrap();
        assert_eq!(restored, inventory);
        assert!(data.sections.contains("inventory"));
        assert_eq!(data.sections.keys().collect::<Vec<_>>(), vec!["inventory"]);
    }

    #[test]
    fn test_sections_type_mismatch_is_error() {
        let mut sections = Sections::default();
        sections.set("level", "not a number").unwrap();

        assert!(sections.get::<u32>("level").is_err());
    }

    #[test]
    fn test_touch_strictly_increases() {
        let mut data = GameData::new("Alice");
        let first = data.touch();
        let second = data.touch();
        assert!(second > first);

        let mut player = PlayerData::new();
        let first = player.touch();
        assert!(player.touch() > first);
    }

    #[test]
    fn test_game_data_without_sections_deserializes() {
        let json = r#"{"player_saved_name":"Eve","last_updated":7}"#;
        let data: GameData = serde_json::from_str(json).unwrap();

        assert_eq!(data.player_saved_name(), "Eve");
        assert_eq!(data.last_updated, Timestamp::new(7));
        assert!(data.sections.is_empty());
    }
}

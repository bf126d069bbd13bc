//! # Participant Contracts
//!
//! Capabilities implemented by subsystems that want their state persisted.
//!
//! There are two independent channels: [`GameDataParticipant`] for the
//! per-profile snapshot and [`PlayerDataParticipant`] for the cross-profile
//! player record. A subsystem may implement either or both.
//!
//! ```rust
//! use savekeep_core::{GameData, GameDataParticipant, Result};
//!
//! #[derive(Default)]
//! struct DoorTracker {
//!     opened: Vec<String>,
//! }
//!
//! impl GameDataParticipant for DoorTracker {
//!     fn load_data(&mut self, data: &GameData) -> Result<()> {
//!         self.opened = data.sections.get("doors")?.unwrap_or_default();
//!         Ok(())
//!     }
//!
//!     fn save_data(&mut self, data: &mut GameData) -> Result<()> {
//!         data.sections.set("doors", &self.opened)
//!     }
//! }
//!
//! let mut tracker = DoorTracker { opened: vec!["north".into()] };
//! let mut data = GameData::new("Alice");
//! tracker.save_data(&mut data).unwrap();
//!
//! let mut restored = DoorTracker::default();
//! restored.load_data(&data).unwrap();
//! assert_eq!(restored.opened, vec!["north".to_string()]);
//! ```

use crate::{GameData, PlayerData, Result};

/// A subsystem that reads from and writes into the per-profile [`GameData`].
pub trait GameDataParticipant: Send {
    /// Pulls state out of a freshly loaded record into the participant.
    fn load_data(&mut self, data: &GameData) -> Result<()>;

    /// Pushes participant state into the record before it is persisted.
    fn save_data(&mut self, data: &mut GameData) -> Result<()>;

    /// Name used in log output.
    fn participant_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A subsystem that reads from and writes into the shared [`PlayerData`].
pub trait PlayerDataParticipant: Send {
    /// Pulls state out of the player record into the participant.
    fn load_player_data(&mut self, data: &PlayerData) -> Result<()>;

    /// Pushes participant state into the player record before it is persisted.
    fn save_player_data(&mut self, data: &mut PlayerData) -> Result<()>;

    /// Name used in log output.
    fn participant_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

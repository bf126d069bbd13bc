//! # Savekeep Core
//!
//! Core building blocks for the savekeep persistence engine.
//!
//! savekeep lets independent subsystems persist and restore their state into
//! named save profiles. This crate holds everything the store and the
//! coordinator share:
//!
//! - **Records**: [`GameData`] (one per profile) and [`PlayerData`] (one per
//!   installation), each with a keyed [`Sections`] map owned by subsystems
//! - **Participant Contracts**: [`GameDataParticipant`] and
//!   [`PlayerDataParticipant`], the two capability channels
//! - **Identifiers**: [`ProfileId`], [`Timestamp`], [`ParticipantId`]
//! - **Codec**: [`RecordCodec`], JSON inside a checksummed envelope with an
//!   optional [`cipher::Cipher`]
//! - **Storage Seam**: [`persistence::StorageBackend`], byte-level storage
//!   implemented by `savekeep-persistence`
//! - **Error Handling**: [`SaveError`] and the crate-wide [`Result`]
//!
//! ## Example
//!
//! ```rust
//! use savekeep_core::{GameData, RecordCodec};
//!
//! let mut data = GameData::new("Alice");
//! data.sections.set("checkpoint", "forest_gate").unwrap();
//!
//! let codec = RecordCodec::json();
//! let bytes = codec.encode(&data).unwrap();
//! let restored: GameData = codec.decode(&bytes).unwrap();
//! assert_eq!(restored, data);
//! ```

pub mod cipher;
pub mod error;
pub mod participant;
pub mod persistence;
pub mod records;
pub mod serialization;
pub mod types;

// Re-export commonly used types for convenience
pub use error::*;
pub use participant::*;
pub use records::*;
pub use serialization::{RecordCodec, SerializationFormat};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let error = SaveError::corrupted("bad magic");
        assert!(error.is_corruption());

        let error = SaveError::persistence("disk full");
        assert!(!error.is_corruption());

        let error: SaveError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(error, SaveError::Io(_)));
        assert!(!error.is_corruption());
    }

    #[test]
    fn test_player_data_round_trip_through_codec() {
        let mut player = PlayerData::new();
        player.sections.set("volume", &0.5f32).unwrap();
        player.touch();

        let codec = RecordCodec::json();
        let restored: PlayerData = codec.decode(&codec.encode(&player).unwrap()).unwrap();
        assert_eq!(restored, player);
    }
}

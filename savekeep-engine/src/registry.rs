//! # Participant Registry
//!
//! Subsystems register themselves here during their own startup instead of
//! being discovered by the coordinator. The registry keeps every registered
//! participant, whether or not the host currently considers it active,
//! because inactive subsystems still own state that has to round-trip.
//!
//! Fan-out order is registration order. When two participants write the same
//! section, the one registered later wins.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::debug;

use savekeep_core::{GameDataParticipant, ParticipantId, PlayerDataParticipant};

pub type SharedGameParticipant = Arc<Mutex<dyn GameDataParticipant>>;
pub type SharedPlayerParticipant = Arc<Mutex<dyn PlayerDataParticipant>>;

#[derive(Default)]
pub struct ParticipantRegistry {
    game: RwLock<Vec<(ParticipantId, SharedGameParticipant)>>,
    player: RwLock<Vec<(ParticipantId, SharedPlayerParticipant)>>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant on the game channel.
    pub fn register_game<P>(&self, participant: Arc<Mutex<P>>) -> ParticipantId
    where
        P: GameDataParticipant + 'static,
    {
        let id = ParticipantId::new();
        self.insert_game(id, participant);
        id
    }

    /// Register a participant on the player channel.
    pub fn register_player<P>(&self, participant: Arc<Mutex<P>>) -> ParticipantId
    where
        P: PlayerDataParticipant + 'static,
    {
        let id = ParticipantId::new();
        self.insert_player(id, participant);
        id
    }

    /// Register a participant on both channels under a single id.
    pub fn register_both<P>(&self, participant: Arc<Mutex<P>>) -> ParticipantId
    where
        P: GameDataParticipant + PlayerDataParticipant + 'static,
    {
        let id = ParticipantId::new();
        self.insert_game(id, participant.clone());
        self.insert_player(id, participant);
        id
    }

    /// Remove a participant from every channel it was registered on.
    ///
    /// Returns `false` if the id was unknown.
    pub fn unregister(&self, id: ParticipantId) -> bool {
        let mut removed = false;

        let mut game = self.game.write();
        if let Some(index) = game.iter().position(|(existing, _)| *existing == id) {
            game.remove(index);
            removed = true;
        }
        drop(game);

        let mut player = self.player.write();
        if let Some(index) = player.iter().position(|(existing, _)| *existing == id) {
            player.remove(index);
            removed = true;
        }

        if removed {
            debug!(participant = %id, "Participant unregistered");
        }
        removed
    }

    /// Snapshot of the game channel in registration order.
    pub fn game_participants(&self) -> Vec<SharedGameParticipant> {
        self.game.read().iter().map(|(_, p)| p.clone()).collect()
    }

    /// Snapshot of the player channel in registration order.
    pub fn player_participants(&self) -> Vec<SharedPlayerParticipant> {
        self.player.read().iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn game_count(&self) -> usize {
        self.game.read().len()
    }

    pub fn player_count(&self) -> usize {
        self.player.read().len()
    }

    pub fn clear(&self) {
        self.game.write().clear();
        self.player.write().clear();
    }

    fn insert_game(&self, id: ParticipantId, participant: SharedGameParticipant) {
        let mut game = self.game.write();
        game.push((id, participant));
        debug!(participant = %id, count = game.len(), "Game participant registered");
    }

    fn insert_player(&self, id: ParticipantId, participant: SharedPlayerParticipant) {
        let mut player = self.player.write();
        player.push((id, participant));
        debug!(participant = %id, count = player.len(), "Player participant registered");
    }
}

impl std::fmt::Debug for ParticipantRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticipantRegistry")
            .field("game", &self.game_count())
            .field("player", &self.player_count())
            .finish()
    }
}

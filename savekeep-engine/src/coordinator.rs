//! The coordinator that owns the active profile and its in-memory records.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use savekeep_core::{
    persistence::StorageBackend, GameData, PlayerData, ProfileId, Result, Timestamp,
};
use savekeep_persistence::{FileStore, FileSystemBackend};

use crate::{ParticipantRegistry, PersistenceConfig};

/// Counters describing what the coordinator has done since construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorStatistics {
    pub session_boundaries: u64,
    pub game_loads: u64,
    pub player_loads: u64,
    pub game_saves: u64,
    pub player_saves: u64,
    pub last_game_save: Option<Timestamp>,
}

/// Orchestrates loading and saving across both participant channels.
///
/// The coordinator owns the active profile id and the in-memory records. It
/// is the only component hosts talk to: lifecycle signals, profile commands
/// from menus and the final save on shutdown all go through it. Every
/// operation takes `&mut self`, so at most one load or save is ever in
/// flight.
pub struct PersistenceCoordinator<B: StorageBackend> {
    config: PersistenceConfig,
    store: FileStore<B>,
    registry: Arc<ParticipantRegistry>,
    active_profile_id: ProfileId,
    forced_profile_id: Option<ProfileId>,
    default_profile_id: ProfileId,
    game_data: Option<GameData>,
    player_data: Option<PlayerData>,
    stats: CoordinatorStatistics,
}

impl PersistenceCoordinator<FileSystemBackend> {
    /// Build a file-backed coordinator rooted at `config.storage_root` and
    /// select the active profile.
    ///
    /// With persistence disabled the storage root is never created.
    ///
    /// # Errors
    /// * Returns error if the storage root cannot be created
    /// * Returns error if the store configuration or a configured profile id
    ///   is invalid
    pub async fn open(
        config: PersistenceConfig,
        registry: Arc<ParticipantRegistry>,
    ) -> Result<Self> {
        let backend = if config.disable_persistence {
            FileSystemBackend::unopened(&config.storage_root)
        } else {
            FileSystemBackend::new(&config.storage_root).await?
        };
        let store = FileStore::new(backend, &config.store)?;
        let mut coordinator = Self::new(config, store, registry)?;
        coordinator.initialize().await;
        Ok(coordinator)
    }
}

impl<B: StorageBackend> PersistenceCoordinator<B> {
    /// Create a coordinator over an existing store.
    ///
    /// The active profile starts as the forced or default id; call
    /// [`initialize`](Self::initialize) to select the most recently updated
    /// profile.
    ///
    /// ```rust
    /// use savekeep_engine::{ParticipantRegistry, PersistenceConfig, PersistenceCoordinator};
    /// use savekeep_persistence::{FileStore, InMemoryBackend};
    /// use std::sync::Arc;
    ///
    /// # tokio_test::block_on(async {
    /// let config = PersistenceConfig::default();
    /// let store = FileStore::new(InMemoryBackend::new(), &config.store).unwrap();
    /// let mut coordinator =
    ///     PersistenceCoordinator::new(config, store, Arc::new(ParticipantRegistry::new())).unwrap();
    ///
    /// coordinator.initialize().await;
    /// coordinator.start_new_game("Alice");
    /// coordinator.save_game().await.unwrap();
    /// assert_eq!(coordinator.list_all_profiles().await.len(), 1);
    /// # });
    /// ```
    ///
    /// # Errors
    /// * `SaveError::InvalidProfileId` if the default or override id is invalid
    pub fn new(
        config: PersistenceConfig,
        store: FileStore<B>,
        registry: Arc<ParticipantRegistry>,
    ) -> Result<Self> {
        let default_profile_id = ProfileId::new(config.default_profile_id.as_str())?;
        let forced_profile_id = config
            .override_profile_id
            .as_deref()
            .map(ProfileId::new)
            .transpose()?;

        if config.disable_persistence {
            warn!("Data persistence is disabled; nothing will be loaded or saved");
        }

        let active_profile_id = forced_profile_id
            .clone()
            .unwrap_or_else(|| default_profile_id.clone());

        Ok(Self {
            config,
            store,
            registry,
            active_profile_id,
            forced_profile_id,
            default_profile_id,
            game_data: None,
            player_data: None,
            stats: CoordinatorStatistics::default(),
        })
    }

    /// Select the active profile.
    ///
    /// A forced id wins; otherwise the most recently updated profile on disk,
    /// falling back to the default id when no readable profile exists.
    pub async fn initialize(&mut self) {
        if let Some(forced) = &self.forced_profile_id {
            warn!("Overrode selected profile id with test id {}", forced);
            self.active_profile_id = forced.clone();
            return;
        }

        if self.config.disable_persistence {
            self.active_profile_id = self.default_profile_id.clone();
            return;
        }

        self.active_profile_id = match self.store.most_recently_updated_profile_id().await {
            Some(profile_id) => profile_id,
            None => self.default_profile_id.clone(),
        };
        info!(profile = %self.active_profile_id, "Selected active profile");
    }

    /// Reload both channels and immediately write them back.
    ///
    /// Writing right after loading captures any defaults participants derive
    /// while loading, before the process has a chance to exit.
    ///
    /// # Errors
    /// * Returns error if writing the player or game record fails
    pub async fn on_session_boundary(&mut self) -> Result<()> {
        self.stats.session_boundaries += 1;
        debug!(
            game_participants = self.registry.game_count(),
            player_participants = self.registry.player_count(),
            "Session boundary reached"
        );

        self.load_player().await;
        self.load_game().await;

        self.save_player().await?;
        if self.game_data.is_some() {
            self.save_game().await?;
        }
        Ok(())
    }

    /// Final save before the process exits; see [`save_all`](Self::save_all).
    pub async fn on_shutdown(&mut self) -> Result<()> {
        info!("Saving before shutdown");
        self.save_all().await
    }

    /// Save the player record and then the game record.
    ///
    /// The game record is written even if the player write fails; the first
    /// error is returned.
    pub async fn save_all(&mut self) -> Result<()> {
        let player = self.save_player().await;
        let game = self.save_game().await;
        player.and(game)
    }

    /// Switch profiles and load the new profile's game data.
    ///
    /// Player data is left untouched.
    pub async fn change_active_profile(&mut self, profile_id: ProfileId) {
        info!(from = %self.active_profile_id, to = %profile_id, "Changing active profile");
        self.active_profile_id = profile_id;
        self.load_game().await;
    }

    /// Replace the held game data with a blank record.
    ///
    /// Nothing is written until the next save.
    pub fn start_new_game(&mut self, player_saved_name: impl Into<String>) {
        let data = GameData::new(player_saved_name);
        info!(
            profile = %self.active_profile_id,
            name = data.player_saved_name(),
            "New game data created"
        );
        self.game_data = Some(data);
    }

    /// Replace the held player data with a blank record.
    pub fn new_player_data(&mut self) {
        self.player_data = Some(PlayerData::new());
    }

    /// Load the active profile and push it to every game participant.
    ///
    /// A missing or unreadable profile clears the held game data.
    pub async fn load_game(&mut self) {
        if self.config.disable_persistence {
            return;
        }

        self.game_data = self.store.load(&self.active_profile_id).await;
        self.stats.game_loads += 1;

        let Some(data) = &self.game_data else {
            info!(
                profile = %self.active_profile_id,
                "No game data found; a new game needs to be started before data can be loaded"
            );
            return;
        };

        for participant in self.registry.game_participants() {
            let mut participant = participant.lock();
            if let Err(e) = participant.load_data(data) {
                warn!(
                    participant = participant.participant_name(),
                    "Participant failed to load game data: {}", e
                );
            }
        }
    }

    /// Load the player record, creating a fresh one if none is stored, and
    /// push it to every player participant.
    pub async fn load_player(&mut self) {
        if self.config.disable_persistence {
            return;
        }

        let data = match self.store.load_player().await {
            Some(data) => data,
            None => {
                info!("No player data found; creating a new player record");
                PlayerData::new()
            }
        };
        self.stats.player_loads += 1;

        for participant in self.registry.player_participants() {
            let mut participant = participant.lock();
            if let Err(e) = participant.load_player_data(&data) {
                warn!(
                    participant = participant.participant_name(),
                    "Participant failed to load player data: {}", e
                );
            }
        }

        self.player_data = Some(data);
    }

    /// Collect state from every game participant, stamp the record and
    /// write it to the active profile.
    ///
    /// # Errors
    /// * Returns error if the record cannot be written; nothing else fails
    pub async fn save_game(&mut self) -> Result<()> {
        if self.config.disable_persistence {
            return Ok(());
        }

        let Some(data) = self.game_data.as_mut() else {
            warn!("No game data found; a new game needs to be started before data can be saved");
            return Ok(());
        };

        for participant in self.registry.game_participants() {
            let mut participant = participant.lock();
            if let Err(e) = participant.save_data(data) {
                warn!(
                    participant = participant.participant_name(),
                    "Participant failed to save game data: {}", e
                );
            }
        }

        let stamp = data.touch();
        self.store.save(data, &self.active_profile_id).await?;

        self.stats.game_saves += 1;
        self.stats.last_game_save = Some(stamp);
        Ok(())
    }

    /// Collect state from every player participant and write the player record.
    ///
    /// # Errors
    /// * Returns error if the record cannot be written
    pub async fn save_player(&mut self) -> Result<()> {
        if self.config.disable_persistence {
            return Ok(());
        }

        let Some(data) = self.player_data.as_mut() else {
            warn!("No player data found; player data must be loaded or created before it can be saved");
            return Ok(());
        };

        for participant in self.registry.player_participants() {
            let mut participant = participant.lock();
            if let Err(e) = participant.save_player_data(data) {
                warn!(
                    participant = participant.participant_name(),
                    "Participant failed to save player data: {}", e
                );
            }
        }

        data.touch();
        self.store.save_player(data).await?;
        self.stats.player_saves += 1;
        Ok(())
    }

    /// Delete a profile, reselect the active profile from what remains and
    /// reload its game data.
    ///
    /// # Errors
    /// * Returns error if the profile file exists but cannot be removed
    pub async fn delete_profile(&mut self, profile_id: &ProfileId) -> Result<()> {
        if self.config.disable_persistence {
            debug!(profile = %profile_id, "Persistence disabled; not deleting profile");
            return Ok(());
        }

        self.store.delete(profile_id).await?;
        self.initialize().await;
        self.load_game().await;
        Ok(())
    }

    /// Every readable profile, for building save-slot listings.
    pub async fn list_all_profiles(&self) -> BTreeMap<ProfileId, GameData> {
        if self.config.disable_persistence {
            return BTreeMap::new();
        }
        self.store.load_all_profiles().await
    }

    pub fn has_game_data(&self) -> bool {
        self.game_data.is_some()
    }

    pub fn has_player_data(&self) -> bool {
        self.player_data.is_some()
    }

    pub fn game_data(&self) -> Option<&GameData> {
        self.game_data.as_ref()
    }

    pub fn player_data(&self) -> Option<&PlayerData> {
        self.player_data.as_ref()
    }

    pub fn active_profile_id(&self) -> &ProfileId {
        &self.active_profile_id
    }

    pub fn is_persistence_disabled(&self) -> bool {
        self.config.disable_persistence
    }

    pub fn registry(&self) -> &Arc<ParticipantRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &FileStore<B> {
        &self.store
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    pub fn statistics(&self) -> CoordinatorStatistics {
        self.stats.clone()
    }
}

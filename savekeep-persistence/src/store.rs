//! # Profile Store
//!
//! Maps profiles and the player record onto storage entries, runs records
//! through the codec, and turns every kind of unreadable entry into "no
//! data" so that a damaged save slot can never take down profile listing or
//! startup.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use savekeep_core::{
    cipher::{Cipher, XorCipher, DEFAULT_XOR_KEY},
    persistence::StorageBackend,
    GameData, PlayerData, ProfileId, RecordCodec, Result, SaveError, SerializationFormat,
};

/// Placeholder substituted with the profile id in file-name templates.
pub const PROFILE_PLACEHOLDER: &str = "{profile}";

const BACKUP_SUFFIX: &str = ".bak";

/// Configuration for the profile store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// File name of each profile; must contain `{profile}` exactly once
    pub file_name_template: String,
    /// Fixed file name of the player record
    pub player_file_name: String,
    /// Cipher stored records with [`XorCipher`] keyed by `encryption_key`
    pub use_encryption: bool,
    pub encryption_key: String,
    /// Keep a `.bak` copy of every saved file and roll back to it on corruption
    pub backup_on_save: bool,
    pub format: SerializationFormat,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file_name_template: "{profile}.save".to_string(),
            player_file_name: "player.data".to_string(),
            use_encryption: false,
            encryption_key: DEFAULT_XOR_KEY.to_string(),
            backup_on_save: false,
            format: SerializationFormat::Json,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_name_template(mut self, template: impl Into<String>) -> Self {
        self.file_name_template = template.into();
        self
    }

    pub fn with_player_file_name(mut self, name: impl Into<String>) -> Self {
        self.player_file_name = name.into();
        self
    }

    pub fn with_encryption(mut self, key: impl Into<String>) -> Self {
        self.use_encryption = true;
        self.encryption_key = key.into();
        self
    }

    pub fn with_backups(mut self, enabled: bool) -> Self {
        self.backup_on_save = enabled;
        self
    }

    pub fn with_format(mut self, format: SerializationFormat) -> Self {
        self.format = format;
        self
    }
}

/// File naming derived from the configured template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFileLayout {
    prefix: String,
    suffix: String,
    player_file_name: String,
}

impl ProfileFileLayout {
    /// Build the layout, rejecting templates that could not round-trip a
    /// profile id or that would collide with the player record.
    pub fn new(template: &str, player_file_name: &str) -> Result<Self> {
        let (prefix, suffix) = template.split_once(PROFILE_PLACEHOLDER).ok_or_else(|| {
            SaveError::persistence(format!(
                "File name template {:?} does not contain {}",
                template, PROFILE_PLACEHOLDER
            ))
        })?;

        if suffix.contains(PROFILE_PLACEHOLDER) {
            return Err(SaveError::persistence(format!(
                "File name template {:?} contains {} more than once",
                template, PROFILE_PLACEHOLDER
            )));
        }

        for name in [template, player_file_name] {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(SaveError::persistence(format!(
                    "{:?} is not a plain file name",
                    name
                )));
            }
        }

        let layout = Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            player_file_name: player_file_name.to_string(),
        };

        if layout.profile_id_for(player_file_name).is_some() {
            return Err(SaveError::persistence(format!(
                "Player file name {:?} matches the profile template {:?}",
                player_file_name, template
            )));
        }

        Ok(layout)
    }

    pub fn file_name(&self, profile_id: &ProfileId) -> String {
        format!("{}{}{}", self.prefix, profile_id, self.suffix)
    }

    pub fn backup_name(file_name: &str) -> String {
        format!("{}{}", file_name, BACKUP_SUFFIX)
    }

    pub fn player_file_name(&self) -> &str {
        &self.player_file_name
    }

    /// Recover the profile id from an entry name, if it matches the template.
    pub fn profile_id_for(&self, file_name: &str) -> Option<ProfileId> {
        let id = file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())?;
        ProfileId::new(id).ok()
    }
}

/// Pick the profile with the greatest `last_updated`.
///
/// Ties go to the lexicographically smallest profile id, independent of
/// how the map was built.
pub fn select_most_recent(profiles: &BTreeMap<ProfileId, GameData>) -> Option<ProfileId> {
    let mut best: Option<(&ProfileId, &GameData)> = None;
    for (id, data) in profiles {
        match best {
            Some((_, current)) if data.last_updated <= current.last_updated => {}
            _ => best = Some((id, data)),
        }
    }
    best.map(|(id, _)| id.clone())
}

/// Profile-addressed store for [`GameData`] and the singleton [`PlayerData`].
///
/// Only writes report errors. Reads degrade: a missing entry, an unreadable
/// entry and an undecodable entry all come back as `None`, with the latter two
/// logged as warnings.
pub struct FileStore<B: StorageBackend> {
    backend: B,
    layout: ProfileFileLayout,
    codec: RecordCodec,
    backup_on_save: bool,
}

impl<B: StorageBackend> FileStore<B> {
    /// Create a store over `backend`.
    ///
    /// When `config.use_encryption` is set the store ciphers records with an
    /// [`XorCipher`] keyed by `config.encryption_key`; use
    /// [`FileStore::with_cipher`] to plug in a different transform.
    ///
    /// # Errors
    /// * Returns error if the file-name template or player file name is invalid
    /// * Returns error if encryption is enabled with an empty key
    pub fn new(backend: B, config: &StoreConfig) -> Result<Self> {
        let layout = ProfileFileLayout::new(&config.file_name_template, &config.player_file_name)?;

        let mut codec = RecordCodec::json().with_format(config.format);
        if config.use_encryption {
            codec = codec.with_cipher(Arc::new(XorCipher::new(&config.encryption_key)?));
        }

        Ok(Self {
            backend,
            layout,
            codec,
            backup_on_save: config.backup_on_save,
        })
    }

    /// Replace the cipher, enabling encryption.
    pub fn with_cipher(mut self, cipher: Arc<dyn Cipher>) -> Self {
        info!("Profile store using {} cipher", cipher.name());
        self.codec = self.codec.with_cipher(cipher);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn layout(&self) -> &ProfileFileLayout {
        &self.layout
    }

    pub fn is_encrypted(&self) -> bool {
        self.codec.is_encrypted()
    }

    /// Persist a profile snapshot.
    ///
    /// # Errors
    /// * `SaveError::Serialization` if the record cannot be encoded
    /// * `SaveError::Persistence` if the entry cannot be written
    pub async fn save(&self, data: &GameData, profile_id: &ProfileId) -> Result<()> {
        let file_name = self.layout.file_name(profile_id);
        self.save_entry(data, &file_name).await?;
        debug!(profile = %profile_id, last_updated = %data.last_updated, "Profile saved");
        Ok(())
    }

    /// Load a profile snapshot; `None` if it is missing or unreadable.
    pub async fn load(&self, profile_id: &ProfileId) -> Option<GameData> {
        let file_name = self.layout.file_name(profile_id);
        self.load_entry(&file_name).await
    }

    /// Persist the player record.
    pub async fn save_player(&self, data: &PlayerData) -> Result<()> {
        let file_name = self.layout.player_file_name().to_string();
        self.save_entry(data, &file_name).await?;
        debug!("Player data saved");
        Ok(())
    }

    /// Load the player record; `None` if it is missing or unreadable.
    pub async fn load_player(&self) -> Option<PlayerData> {
        let file_name = self.layout.player_file_name().to_string();
        self.load_entry(&file_name).await
    }

    /// Load every profile whose entry name matches the template.
    ///
    /// Profiles that fail to decode are left out.
    pub async fn load_all_profiles(&self) -> BTreeMap<ProfileId, GameData> {
        let names = match self.backend.list().await {
            Ok(names) => names,
            Err(e) => {
                warn!("Failed to enumerate profiles: {}", e);
                return BTreeMap::new();
            }
        };

        let mut profiles = BTreeMap::new();
        for name in names {
            let Some(profile_id) = self.layout.profile_id_for(&name) else {
                continue;
            };
            if let Some(data) = self.load_entry::<GameData>(&name).await {
                profiles.insert(profile_id, data);
            }
        }

        debug!(count = profiles.len(), "Loaded all profiles");
        profiles
    }

    /// Remove a profile and its backup. Deleting a missing profile succeeds.
    pub async fn delete(&self, profile_id: &ProfileId) -> Result<()> {
        let file_name = self.layout.file_name(profile_id);
        self.backend.remove(&file_name).await?;
        self.backend
            .remove(&ProfileFileLayout::backup_name(&file_name))
            .await?;
        info!(profile = %profile_id, "Profile deleted");
        Ok(())
    }

    /// The profile with the newest `last_updated`, if any profile is readable.
    pub async fn most_recently_updated_profile_id(&self) -> Option<ProfileId> {
        let profiles = self.load_all_profiles().await;
        select_most_recent(&profiles)
    }

    async fn save_entry<T: Serialize>(&self, record: &T, file_name: &str) -> Result<()> {
        let bytes = self.codec.encode(record)?;
        self.backend.write(file_name, &bytes).await?;

        if self.backup_on_save {
            let backup = ProfileFileLayout::backup_name(file_name);
            // The primary write already succeeded; a stale backup only matters on rollback.
            if let Err(e) = self.backend.write(&backup, &bytes).await {
                warn!("Failed to write backup {}: {}", backup, e);
            }
        }

        Ok(())
    }

    async fn load_entry<T: DeserializeOwned>(&self, file_name: &str) -> Option<T> {
        let bytes = match self.backend.read(file_name).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read {}: {}", file_name, e);
                return None;
            }
        };

        match self.codec.decode(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Discarding unreadable entry {}: {}", file_name, e);
                if self.backup_on_save {
                    self.roll_back(file_name).await
                } else {
                    None
                }
            }
        }
    }

    async fn roll_back<T: DeserializeOwned>(&self, file_name: &str) -> Option<T> {
        let backup = ProfileFileLayout::backup_name(file_name);
        let bytes = match self.backend.read(&backup).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read backup {}: {}", backup, e);
                return None;
            }
        };

        match self.codec.decode(&bytes) {
            Ok(record) => {
                if let Err(e) = self.backend.write(file_name, &bytes).await {
                    warn!("Failed to restore {} from backup: {}", file_name, e);
                }
                warn!("Rolled back {} to its backup", file_name);
                Some(record)
            }
            Err(e) => {
                warn!("Backup {} is unreadable too: {}", backup, e);
                None
            }
        }
    }
}

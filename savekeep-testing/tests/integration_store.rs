//! Store-level integration tests over the real file system.
//!
//! These exercise the profile store exactly as the coordinator uses it:
//! one file per profile under a temporary root, optional encryption, and
//! damaged files planted directly on disk.

use std::sync::Arc;

use savekeep_core::{cipher::XorCipher, GameData, PlayerData, ProfileId, SerializationFormat, Timestamp};
use savekeep_persistence::{FileStore, FileSystemBackend, StoreConfig};
use savekeep_testing::init_test_logging;
use tempfile::TempDir;

fn slot(id: &str) -> ProfileId {
    ProfileId::new(id).unwrap()
}

fn game(name: &str, last_updated: u64) -> GameData {
    let mut data = GameData::new(name);
    data.last_updated = Timestamp::new(last_updated);
    data
}

async fn file_store(dir: &TempDir, config: StoreConfig) -> FileStore<FileSystemBackend> {
    init_test_logging();
    let backend = FileSystemBackend::new(dir.path()).await.unwrap();
    FileStore::new(backend, &config).unwrap()
}

#[tokio::test]
async fn test_round_trip_preserves_every_field() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir, StoreConfig::default()).await;

    let mut data = game("Alice", 1_700_000_000_000);
    data.sections.set("position", &[12.5f64, -3.0]).unwrap();
    data.sections.set("quests", &vec!["intro", "bridge"]).unwrap();

    store.save(&data, &slot("slot1")).await.unwrap();

    assert_eq!(store.load(&slot("slot1")).await, Some(data));
}

#[tokio::test]
async fn test_never_saved_profile_is_absent() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir, StoreConfig::default()).await;

    assert_eq!(store.load(&slot("nobody")).await, None);
    assert!(store.load_all_profiles().await.is_empty());
}

#[tokio::test]
async fn test_corrupt_file_is_isolated() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir, StoreConfig::default()).await;

    store.save(&game("A", 1), &slot("a")).await.unwrap();
    store.save(&game("B", 2), &slot("b")).await.unwrap();
    std::fs::write(dir.path().join("b.save"), b"\x89PNG not a save").unwrap();
    std::fs::write(dir.path().join("c.save"), b"").unwrap();

    assert_eq!(store.load(&slot("b")).await, None);
    assert_eq!(store.load(&slot("c")).await, None);

    let all = store.load_all_profiles().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[&slot("a")].player_saved_name(), "A");
}

#[tokio::test]
async fn test_most_recent_selection() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir, StoreConfig::default()).await;

    store.save(&game("A", 1), &slot("a")).await.unwrap();
    store.save(&game("B", 3), &slot("b")).await.unwrap();
    store.save(&game("C", 2), &slot("c")).await.unwrap();

    assert_eq!(store.most_recently_updated_profile_id().await, Some(slot("b")));
}

#[tokio::test]
async fn test_delete_removes_profile() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir, StoreConfig::default()).await;

    store.save(&game("A", 1), &slot("slot1")).await.unwrap();
    store.save(&game("B", 2), &slot("slot2")).await.unwrap();

    store.delete(&slot("slot1")).await.unwrap();
    store.delete(&slot("slot1")).await.unwrap();

    assert_eq!(store.load(&slot("slot1")).await, None);
    let all = store.load_all_profiles().await;
    assert!(!all.contains_key(&slot("slot1")));
    assert!(all.contains_key(&slot("slot2")));
    assert!(!dir.path().join("slot1.save").exists());
}

#[tokio::test]
async fn test_player_record_lives_beside_profiles() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir, StoreConfig::default()).await;

    let mut player = PlayerData::new();
    player.sections.set("achievements", &vec!["first_steps"]).unwrap();
    store.save_player(&player).await.unwrap();
    store.save(&game("A", 1), &slot("a")).await.unwrap();

    assert!(dir.path().join("player.data").is_file());
    assert_eq!(store.load_player().await, Some(player));
    assert_eq!(store.load_all_profiles().await.len(), 1);
}

#[tokio::test]
async fn test_custom_template_and_encryption() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::default()
        .with_file_name_template("profile_{profile}.dat")
        .with_player_file_name("player.cfg")
        .with_encryption("s3cret")
        .with_format(SerializationFormat::PrettyJson);
    let store = file_store(&dir, config.clone()).await;

    store.save(&game("Alice", 5), &slot("slot1")).await.unwrap();

    let raw = std::fs::read(dir.path().join("profile_slot1.dat")).unwrap();
    assert!(!raw.windows(5).any(|w| w == b"Alice"));
    assert_eq!(
        store.load(&slot("slot1")).await.map(|g| g.player_saved_name),
        Some("Alice".to_string())
    );

    // Same files read with a different key degrade to absent
    let wrong_key = file_store(&dir, config.with_encryption("other")).await;
    assert_eq!(wrong_key.load(&slot("slot1")).await, None);
    assert!(wrong_key.load_all_profiles().await.is_empty());
}

#[tokio::test]
async fn test_pluggable_cipher() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir, StoreConfig::default())
        .await
        .with_cipher(Arc::new(XorCipher::new([0x5a, 0xa5, 0x3c]).unwrap()));

    assert!(store.is_encrypted());
    store.save(&game("Zed", 9), &slot("z")).await.unwrap();
    assert_eq!(store.load(&slot("z")).await.map(|g| g.last_updated), Some(Timestamp::new(9)));
}

#[tokio::test]
async fn test_backup_rollback_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir, StoreConfig::default().with_backups(true)).await;
    let data = game("Alice", 77);

    store.save(&data, &slot("slot1")).await.unwrap();
    assert!(dir.path().join("slot1.save.bak").is_file());

    std::fs::write(dir.path().join("slot1.save"), b"truncated").unwrap();

    assert_eq!(store.load(&slot("slot1")).await, Some(data.clone()));
    let repaired = std::fs::read(dir.path().join("slot1.save")).unwrap();
    let backup = std::fs::read(dir.path().join("slot1.save.bak")).unwrap();
    assert_eq!(repaired, backup);

    // Backups are not listed as profiles
    assert_eq!(store.load_all_profiles().await.len(), 1);
}

//! Command loop integration tests.
//!
//! The coordinator is moved into its run loop and driven purely through
//! [`CoordinatorCommand`]s, the way a host wires it up.

use std::time::Duration;

use savekeep_core::ProfileId;
use savekeep_engine::{CoordinatorCommand, PersistenceConfig};
use savekeep_testing::TestHarness;
use tokio::sync::{mpsc, oneshot};

fn slot(id: &str) -> ProfileId {
    ProfileId::new(id).unwrap()
}

#[tokio::test]
async fn test_shutdown_performs_final_save() -> anyhow::Result<()> {
    let harness = TestHarness::new(PersistenceConfig::default())?;
    let participant = harness.participant("inventory").with_value("sword").shared();
    harness.registry.register_both(participant);
    let backend = harness.backend.clone();
    let log = harness.log.clone();

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(harness.coordinator.run(cmd_rx));

    cmd_tx.send(CoordinatorCommand::SessionBoundary)?;
    cmd_tx.send(CoordinatorCommand::StartNewGame("Alice".into()))?;
    cmd_tx.send(CoordinatorCommand::Shutdown)?;
    handle.await??;

    assert!(backend.inner().contains("default.save"));
    assert!(backend.inner().contains("player.data"));
    // Final save fans out to both channels
    assert_eq!(log.count("save_data:inventory"), 1);
    assert_eq!(log.count("save_player_data:inventory"), 2);
    Ok(())
}

#[tokio::test]
async fn test_closed_channel_also_saves() -> anyhow::Result<()> {
    let harness = TestHarness::new(PersistenceConfig::default())?;
    let backend = harness.backend.clone();

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(harness.coordinator.run(cmd_rx));

    cmd_tx.send(CoordinatorCommand::StartNewGame("Alice".into()))?;
    drop(cmd_tx);
    handle.await??;

    assert!(backend.inner().contains("default.save"));
    Ok(())
}

#[tokio::test]
async fn test_profile_requests_reply() -> anyhow::Result<()> {
    let harness = TestHarness::new(PersistenceConfig::default())?;
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(harness.coordinator.run(cmd_rx));

    for (profile, name) in [("slot1", "Alice"), ("slot2", "Bob")] {
        cmd_tx.send(CoordinatorCommand::ChangeActiveProfile(slot(profile)))?;
        cmd_tx.send(CoordinatorCommand::StartNewGame(name.into()))?;
        let (tx, rx) = oneshot::channel();
        cmd_tx.send(CoordinatorCommand::SaveNow(tx))?;
        rx.await??;
    }

    let (tx, rx) = oneshot::channel();
    cmd_tx.send(CoordinatorCommand::ListProfiles(tx))?;
    let profiles = rx.await?;
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[&slot("slot1")].player_saved_name(), "Alice");
    assert_eq!(profiles[&slot("slot2")].player_saved_name(), "Bob");

    let (tx, rx) = oneshot::channel();
    cmd_tx.send(CoordinatorCommand::DeleteProfile(slot("slot1"), tx))?;
    rx.await??;

    let (tx, rx) = oneshot::channel();
    cmd_tx.send(CoordinatorCommand::ListProfiles(tx))?;
    assert_eq!(rx.await?.keys().cloned().collect::<Vec<_>>(), vec![slot("slot2")]);

    let (tx, rx) = oneshot::channel();
    cmd_tx.send(CoordinatorCommand::GetStatistics(tx))?;
    let stats = rx.await?;
    assert_eq!(stats.game_saves, 2);
    assert!(stats.last_game_save.is_some());

    cmd_tx.send(CoordinatorCommand::Shutdown)?;
    handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_save_now_writes_game_even_if_player_write_fails() -> anyhow::Result<()> {
    let harness = TestHarness::new(PersistenceConfig::default())?;
    let backend = harness.backend.clone();
    let log = harness.log.clone();

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(harness.coordinator.run(cmd_rx));

    // Creates the player record, then a game to go with it
    cmd_tx.send(CoordinatorCommand::SessionBoundary)?;
    cmd_tx.send(CoordinatorCommand::StartNewGame("Alice".into()))?;
    let (tx, rx) = oneshot::channel();
    cmd_tx.send(CoordinatorCommand::GetStatistics(tx))?;
    rx.await?;

    backend.set_fail_writes(true);
    log.clear();
    let (tx, rx) = oneshot::channel();
    cmd_tx.send(CoordinatorCommand::SaveNow(tx))?;
    assert!(rx.await?.is_err());
    assert_eq!(
        log.entries(),
        vec!["write:player.data".to_string(), "write:default.save".to_string()]
    );

    backend.set_fail_writes(false);
    cmd_tx.send(CoordinatorCommand::Shutdown)?;
    handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_autosave_runs_on_interval() -> anyhow::Result<()> {
    let config = PersistenceConfig::default().with_autosave_interval(Duration::from_millis(10));
    let harness = TestHarness::new(config)?;
    let backend = harness.backend.clone();

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(harness.coordinator.run(cmd_rx));

    cmd_tx.send(CoordinatorCommand::StartNewGame("Alice".into()))?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Written before any shutdown was requested
    assert!(backend.inner().contains("default.save"));
    assert!(backend.stats().writes >= 2);

    cmd_tx.send(CoordinatorCommand::Shutdown)?;
    handle.await??;
    Ok(())
}

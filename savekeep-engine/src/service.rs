//! Command loop that serializes host signals onto one coordinator task.

use std::collections::BTreeMap;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, Interval};
use tracing::{debug, error, info};

use savekeep_core::{persistence::StorageBackend, GameData, ProfileId, Result};

use crate::{CoordinatorStatistics, PersistenceCoordinator};

/// Signals and requests a host sends to a coordinator running in
/// [`PersistenceCoordinator::run`].
#[derive(Debug)]
pub enum CoordinatorCommand {
    /// A screen or scene transition completed
    SessionBoundary,
    /// The process is about to exit; triggers the final save and stops the loop
    Shutdown,
    SaveNow(oneshot::Sender<Result<()>>),
    ChangeActiveProfile(ProfileId),
    DeleteProfile(ProfileId, oneshot::Sender<Result<()>>),
    StartNewGame(String),
    ListProfiles(oneshot::Sender<BTreeMap<ProfileId, GameData>>),
    GetStatistics(oneshot::Sender<CoordinatorStatistics>),
}

pub type CoordinatorCommandSender = mpsc::UnboundedSender<CoordinatorCommand>;
pub type CoordinatorCommandReceiver = mpsc::UnboundedReceiver<CoordinatorCommand>;

impl<B: StorageBackend + 'static> PersistenceCoordinator<B> {
    /// Process host commands one at a time until shutdown.
    ///
    /// The loop ends on [`CoordinatorCommand::Shutdown`] or once every sender
    /// has been dropped; either way a final save runs first and its result is
    /// returned. Failures while handling other commands are logged and the
    /// loop keeps going.
    pub async fn run(mut self, mut commands: CoordinatorCommandReceiver) -> Result<()> {
        info!(profile = %self.active_profile_id(), "Persistence coordinator running");

        let mut autosave = self
            .config()
            .autosave_interval
            .map(|period| interval_at(Instant::now() + period, period));

        loop {
            tokio::select! {
                command_opt = commands.recv() => {
                    match command_opt {
                        Some(CoordinatorCommand::Shutdown) => {
                            info!("Shutdown requested");
                            break;
                        }
                        Some(command) => self.handle_command(command).await,
                        // Channel closed, host signals are gone
                        None => break,
                    }
                }

                _ = next_autosave(&mut autosave) => {
                    debug!("Autosaving");
                    if let Err(e) = self.save_player().await {
                        error!("Autosave of player data failed: {}", e);
                    }
                    if let Err(e) = self.save_game().await {
                        error!("Autosave of game data failed: {}", e);
                    }
                }
            }
        }

        self.on_shutdown().await
    }

    async fn handle_command(&mut self, command: CoordinatorCommand) {
        match command {
            CoordinatorCommand::SessionBoundary => {
                if let Err(e) = self.on_session_boundary().await {
                    error!("Error handling session boundary: {}", e);
                }
            }
            CoordinatorCommand::SaveNow(tx) => {
                let result = self.save_all().await;
                if tx.send(result).is_err() {
                    debug!("Save requester went away before the reply");
                }
            }
            CoordinatorCommand::ChangeActiveProfile(profile_id) => {
                self.change_active_profile(profile_id).await;
            }
            CoordinatorCommand::DeleteProfile(profile_id, tx) => {
                let result = self.delete_profile(&profile_id).await;
                if tx.send(result).is_err() {
                    debug!("Delete requester went away before the reply");
                }
            }
            CoordinatorCommand::StartNewGame(name) => self.start_new_game(name),
            CoordinatorCommand::ListProfiles(tx) => {
                let _ = tx.send(self.list_all_profiles().await);
            }
            CoordinatorCommand::GetStatistics(tx) => {
                let _ = tx.send(self.statistics());
            }
            CoordinatorCommand::Shutdown => {}
        }
    }
}

async fn next_autosave(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

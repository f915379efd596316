// Spawning a match task and the handle used to talk to it.

use super::combat::{Match, MatchSetup};
use super::game::match_task;
use super::types::{MatchEvent, MatchPhase, MatchUpdate};
use crate::domain::errors::SetupError;
use crate::domain::systems::MatchOutcome;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tokio::task::JoinHandle;

/// Channel sizing and tick rate for a spawned match.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Capacity for inbound match events.
    pub input_channel_capacity: usize,
    /// Capacity for broadcast match updates.
    pub update_broadcast_capacity: usize,
    /// Fixed tick interval for the match loop.
    pub tick_interval: Duration,
}

/// Channels into and out of a running match task.
#[derive(Debug)]
pub struct MatchHandle {
    /// Sender for inputs and physics reports.
    pub input_tx: mpsc::Sender<MatchEvent>,
    /// Broadcast sender for per-tick updates; subscribe to receive them.
    pub update_tx: broadcast::Sender<MatchUpdate>,
    /// Latest high-level phase.
    pub phase_rx: watch::Receiver<MatchPhase>,
    shutdown: Arc<Notify>,
    task: JoinHandle<Option<MatchOutcome>>,
}

impl MatchHandle {
    /// Builds the match and spawns its task on the current runtime.
    pub fn spawn(setup: MatchSetup, settings: &SessionSettings) -> Result<Self, SetupError> {
        let game = Match::new(setup)?;

        let (input_tx, input_rx) = mpsc::channel::<MatchEvent>(settings.input_channel_capacity);
        let (update_tx, _update_rx) =
            broadcast::channel::<MatchUpdate>(settings.update_broadcast_capacity);
        let (phase_tx, phase_rx) = watch::channel(MatchPhase::Setup);
        let shutdown = Arc::new(Notify::new());

        let task = tokio::spawn(match_task(
            game,
            input_rx,
            update_tx.clone(),
            phase_tx,
            settings.tick_interval,
            shutdown.clone(),
        ));

        Ok(Self {
            input_tx,
            update_tx,
            phase_rx,
            shutdown,
            task,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MatchUpdate> {
        self.update_tx.subscribe()
    }

    /// Stops the match loop at its next tick.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Waits for the match task to finish; `None` if it was shut down or panicked.
    pub async fn finished(self) -> Option<MatchOutcome> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(%error, "match task failed");
                None
            }
        }
    }
}

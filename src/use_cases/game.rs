use super::combat::Match;
use super::types::{CombatEvent, MatchEvent, MatchPhase, MatchUpdate};
use crate::domain::systems::MatchOutcome;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tracing::{debug, info, warn};

/// Drives one match at a fixed tick rate until it is decided or shut down.
///
/// All inputs arrive through `input_rx` and are applied inside the tick, so fuse
/// expiry, collisions and player actions never race each other.
pub async fn match_task(
    mut game: Match,
    mut input_rx: mpsc::Receiver<MatchEvent>,
    update_tx: broadcast::Sender<MatchUpdate>,
    phase_tx: watch::Sender<MatchPhase>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) -> Option<MatchOutcome> {
    let mut tick: u64 = 0;
    let mut inputs_open = true;
    let _ = phase_tx.send(MatchPhase::Running);

    let mut interval = tokio::time::interval(tick_interval);
    let dt = tick_interval.as_secs_f32();

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick, "match shut down");
                break;
            }
            _ = interval.tick() => {}
        }

        let mut rejected = Vec::new();
        while inputs_open {
            match input_rx.try_recv() {
                Ok(event) => {
                    if let Err(error) = apply_event(&mut game, event) {
                        rejected.push(CombatEvent::ActionRejected(error));
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    // The match keeps running on timers alone; fuses and timeouts still resolve.
                    debug!("input channel closed");
                    inputs_open = false;
                }
            }
        }

        let mut events = rejected;
        events.extend(game.tick(dt));
        tick += 1;

        let _ = update_tx.send(MatchUpdate {
            tick,
            snapshot: game.snapshot(),
            events,
        });

        if let Some(outcome) = game.outcome() {
            let _ = phase_tx.send(MatchPhase::Ended(outcome));
            info!(tick, ?outcome, "match finished");
            return Some(outcome);
        }
    }

    None
}

fn apply_event(game: &mut Match, event: MatchEvent) -> Result<(), crate::domain::CombatError> {
    match event {
        MatchEvent::Fire { player_id, target } => {
            game.fire(player_id, target).map(|_| ()).inspect_err(|error| {
                warn!(%error, "fire rejected");
            })
        }
        MatchEvent::SelectWeapon { weapon } => game.select_weapon(&weapon).map(|_| ()),
        MatchEvent::BodyMoved {
            body,
            position,
            velocity,
        } => {
            if !game.body_moved(body, position, velocity) {
                debug!(?body, "position update for unknown body");
            }
            Ok(())
        }
        MatchEvent::Collision {
            projectile_id,
            other,
        } => {
            game.collision(projectile_id, other);
            Ok(())
        }
        MatchEvent::ForceEndTurn => game.force_end_turn().map(|_| ()),
    }
}

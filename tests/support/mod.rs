// Shared helpers for spawning match tasks in integration tests.
#![allow(dead_code)]

use std::time::Duration;

use artillery_core::domain::state::{PlayerId, Point};
use artillery_core::domain::tuning::maps::GROUND_Y;
use artillery_core::use_cases::{CombatEvent, MatchHandle, MatchSetup, MatchUpdate, SessionSettings};
use tokio::sync::broadcast;

pub const TICK: Duration = Duration::from_millis(16);

pub fn settings() -> SessionSettings {
    SessionSettings {
        input_channel_capacity: 64,
        update_broadcast_capacity: 1024,
        tick_interval: TICK,
    }
}

pub fn id(s: &str) -> PlayerId {
    s.parse().expect("valid player id")
}

// Players 300 units apart on flat ground with no platforms.
pub fn open_field(sizes: &[usize]) -> MatchSetup {
    let total: usize = sizes.iter().sum();
    let points = (0..total)
        .map(|i| Point::new(100.0 + 300.0 * i as f32, GROUND_Y - 10.0))
        .collect();
    let mut setup = MatchSetup::from_team_sizes(sizes).with_spawn_points(points);
    setup.platforms = Some(Vec::new());
    setup
}

pub fn spawn(setup: MatchSetup) -> MatchHandle {
    MatchHandle::spawn(setup, &settings()).expect("valid setup")
}

// Receives updates until one satisfies `pred`; panics if the match stops first.
pub async fn wait_for<F>(rx: &mut broadcast::Receiver<MatchUpdate>, mut pred: F) -> MatchUpdate
where
    F: FnMut(&MatchUpdate) -> bool,
{
    loop {
        match rx.recv().await {
            Ok(update) if pred(&update) => return update,
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => panic!("match updates closed"),
        }
    }
}

pub fn turn_starts(update: &MatchUpdate) -> Vec<PlayerId> {
    update
        .events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::TurnStarted { player_id, .. } => Some(*player_id),
            _ => None,
        })
        .collect()
}

pub fn has_explosion(update: &MatchUpdate) -> bool {
    update
        .events
        .iter()
        .any(|e| matches!(e, CombatEvent::Exploded(_)))
}

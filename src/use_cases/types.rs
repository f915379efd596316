// Use-case level inputs/outputs for the match loop.

use crate::domain::errors::CombatError;
use crate::domain::state::{PlayerId, PlayerSnapshot, Point, ProjectileSnapshot, TeamId, TeamSnapshot};
use crate::domain::systems::{BodyRef, ExplosionReport, MatchOutcome, TurnPhase};
use crate::domain::tuning::weapon::WeaponKind;

/// Inputs funneled into the match task from the input layer and the physics provider.
#[derive(Debug, Clone)]
pub enum MatchEvent {
    /// Fire the active team's weapon at `target`. `player_id` is checked when present.
    Fire { player_id: Option<PlayerId>, target: Point },
    SelectWeapon { weapon: String },
    BodyMoved { body: BodyRef, position: Point, velocity: Point },
    Collision { projectile_id: u64, other: BodyRef },
    ForceEndTurn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Setup,
    Running,
    Ended(MatchOutcome),
}

/// Everything that happened in the match since the last drain, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    TurnStarted { player_id: PlayerId, turn: u64 },
    TurnTimedOut { player_id: PlayerId },
    TurnSkipped { player_id: PlayerId },
    WeaponSelected { team: TeamId, weapon: WeaponKind },
    ProjectileLaunched { projectile_id: u64, owner_id: PlayerId, weapon: WeaponKind },
    Exploded(ExplosionReport),
    ProjectileDiscarded { projectile_id: u64, owner_id: PlayerId },
    PlayerEliminated { player_id: PlayerId },
    TeamEliminated { team: TeamId },
    MatchEnded(MatchOutcome),
    /// An input was refused; the match state is unchanged.
    ActionRejected(CombatError),
}

/// Read-only view for the rendering/UI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSnapshot {
    pub turn_number: u64,
    pub phase: TurnPhase,
    pub current_player: Option<PlayerId>,
    pub current_weapon: Option<WeaponKind>,
    pub turn_time_remaining: f32,
    pub turn_in_progress: bool,
    pub teams: Vec<TeamSnapshot>,
    pub players: Vec<PlayerSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub outcome: Option<MatchOutcome>,
}

#[derive(Debug, Clone)]
pub struct MatchUpdate {
    pub tick: u64,
    pub snapshot: MatchSnapshot,
    pub events: Vec<CombatEvent>,
}

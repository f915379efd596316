// Domain-level errors for combat workflows.
//
// None of these are fatal to a running match: callers log them and degrade.

use std::fmt;

use super::state::{PlayerId, TeamId};

#[derive(Debug, Clone, PartialEq)]
pub enum CombatError {
    /// Turn rotation exhausted its attempts without finding a living player.
    NoLivingPlayerFound,
    /// Occlusion was queried without a platform list.
    MissingTerrainData,
    /// Requested weapon is not part of the catalog.
    UnknownWeaponType(String),
    /// Win check found no surviving team (mutual elimination).
    AmbiguousMatchOutcome { surviving_teams: Vec<TeamId> },
    /// Referenced player does not exist in this match.
    UnknownPlayer(PlayerId),
    /// Shooter is not the active player, or has already fired.
    NotPlayersTurn(PlayerId),
    /// A projectile is still resolving.
    ProjectileInFlight,
    /// The match already has an outcome.
    MatchOver,
}

impl fmt::Display for CombatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatError::NoLivingPlayerFound => write!(f, "no living player found"),
            CombatError::MissingTerrainData => write!(f, "terrain data missing"),
            CombatError::UnknownWeaponType(name) => write!(f, "unknown weapon type `{name}`"),
            CombatError::AmbiguousMatchOutcome { surviving_teams } => write!(
                f,
                "ambiguous match outcome ({} surviving teams)",
                surviving_teams.len()
            ),
            CombatError::UnknownPlayer(id) => write!(f, "unknown player {id}"),
            CombatError::NotPlayersTurn(id) => write!(f, "player {id} may not act now"),
            CombatError::ProjectileInFlight => write!(f, "a projectile is already in flight"),
            CombatError::MatchOver => write!(f, "match is over"),
        }
    }
}

impl std::error::Error for CombatError {}

/// Errors raised while building a match from setup data.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupError {
    TooFewTeams(usize),
    InvalidTeamSize { team: String, size: usize },
    DuplicateTeamName(String),
    EmptyWeaponCatalog,
    MissingDefaultWeapon(String),
    InvalidWeapon { weapon: String, reason: &'static str },
    SpawnPointCount { expected: usize, found: usize },
    Config(String),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::TooFewTeams(found) => {
                write!(f, "match needs at least two teams, found {found}")
            }
            SetupError::InvalidTeamSize { team, size } => {
                write!(f, "team `{team}` has {size} players (expected 1-3)")
            }
            SetupError::DuplicateTeamName(name) => write!(f, "duplicate team name `{name}`"),
            SetupError::EmptyWeaponCatalog => write!(f, "weapon catalog is empty"),
            SetupError::MissingDefaultWeapon(name) => {
                write!(f, "default weapon `{name}` is not in the catalog")
            }
            SetupError::InvalidWeapon { weapon, reason } => {
                write!(f, "weapon `{weapon}` is invalid: {reason}")
            }
            SetupError::SpawnPointCount { expected, found } => {
                write!(f, "expected {expected} spawn points, found {found}")
            }
            SetupError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for SetupError {}

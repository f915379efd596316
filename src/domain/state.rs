// Domain-level combat entities and snapshot types.

use std::fmt;
use std::str::FromStr;

use super::tuning::weapon::{DetonationPolicy, WeaponKind};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Index of a team in setup order. Team 0 is "A", team 1 is "B", and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamId(pub usize);

impl TeamId {
    pub fn letter(self) -> char {
        char::from(b'A' + (self.0 % 26) as u8)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Team-qualified player id, rendered as `A1`, `B2`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId {
    pub team: TeamId,
    /// Zero-based slot inside the team.
    pub slot: usize,
}

impl PlayerId {
    pub const fn new(team: TeamId, slot: usize) -> Self {
        Self { team, slot }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.team.letter(), self.slot + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlayerIdError(pub String);

impl fmt::Display for ParsePlayerIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid player id `{}`", self.0)
    }
}

impl std::error::Error for ParsePlayerIdError {}

impl FromStr for PlayerId {
    type Err = ParsePlayerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePlayerIdError(s.to_string());
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(err)?.to_ascii_uppercase();
        if !letter.is_ascii_uppercase() {
            return Err(err());
        }
        let number: usize = chars.as_str().parse().map_err(|_| err())?;
        if number == 0 {
            return Err(err());
        }
        let team = TeamId(usize::from(letter as u8 - b'A'));
        Ok(PlayerId::new(team, number - 1))
    }
}

#[derive(Debug, Clone)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub player_count: usize,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub team_id: TeamId,
    pub health: f32,
    pub position: Point,

    // Turn permissions, granted and revoked by the turn scheduler only.
    pub can_move: bool,
    pub can_shoot: bool,
}

impl Player {
    pub fn new(id: PlayerId, position: Point, health: f32) -> Self {
        Self {
            id,
            team_id: id.team,
            health,
            position,
            can_move: false,
            can_shoot: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Projectile currently resolving on the battlefield.
#[derive(Debug, Clone)]
pub struct SimProjectile {
    pub id: u64,
    pub owner_id: PlayerId,
    pub weapon: WeaponKind,
    pub policy: DetonationPolicy,
    pub position: Point,
    pub velocity: Point,
    /// Collisions reported while the projectile ignored them (timed weapons).
    pub bounces: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub team_id: TeamId,
    pub health: f32,
    pub x: f32,
    pub y: f32,
    pub can_move: bool,
    pub can_shoot: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSnapshot {
    pub id: u64,
    pub owner_id: PlayerId,
    pub weapon: WeaponKind,
    pub x: f32,
    pub y: f32,
    pub fuse_remaining: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamSnapshot {
    pub id: TeamId,
    pub name: String,
    pub selected_weapon: WeaponKind,
    pub eliminated: bool,
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            team_id: p.team_id,
            health: p.health,
            x: p.position.x,
            y: p.position.y,
            can_move: p.can_move,
            can_shoot: p.can_shoot,
        }
    }
}

// Wire protocol DTOs and conversions for the JSON-lines match bridge.

use crate::domain::state::{PlayerId, Point};
use crate::domain::systems::{BodyRef, MatchOutcome};
use crate::use_cases::{CombatEvent, MatchEvent, MatchPhase, MatchUpdate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Messages the input layer and physics provider send to the match.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Fire the active team's weapon at a world point.
    Fire(FireDto),
    // Switch the active team's weapon.
    SelectWeapon(SelectWeaponDto),
    // Latest body state from the physics provider.
    BodyMoved(BodyMovedDto),
    // Collision between a projectile and another body.
    Collision(CollisionDto),
    // Skip the rest of the current turn.
    ForceEndTurn,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FireDto {
    #[serde(default)]
    pub player_id: Option<String>,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectWeaponDto {
    pub weapon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BodyMovedDto {
    pub body: BodyDto,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub vx: f32,
    #[serde(default)]
    pub vy: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollisionDto {
    pub projectile_id: u64,
    pub other: BodyDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyDto {
    Projectile { id: u64 },
    Player { id: String },
    Terrain,
    Other,
}

/// Client message that could not be mapped onto a match event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    InvalidPlayerId(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidPlayerId(raw) => write!(f, "invalid player id `{raw}`"),
        }
    }
}

impl std::error::Error for ProtocolError {}

fn parse_player(raw: &str) -> Result<PlayerId, ProtocolError> {
    raw.parse()
        .map_err(|_| ProtocolError::InvalidPlayerId(raw.to_string()))
}

impl TryFrom<BodyDto> for BodyRef {
    type Error = ProtocolError;

    fn try_from(body: BodyDto) -> Result<Self, Self::Error> {
        Ok(match body {
            BodyDto::Projectile { id } => BodyRef::Projectile(id),
            BodyDto::Player { id } => BodyRef::Player(parse_player(&id)?),
            BodyDto::Terrain => BodyRef::Terrain,
            BodyDto::Other => BodyRef::Other,
        })
    }
}

impl TryFrom<ClientMessage> for MatchEvent {
    type Error = ProtocolError;

    fn try_from(msg: ClientMessage) -> Result<Self, Self::Error> {
        Ok(match msg {
            ClientMessage::Fire(fire) => MatchEvent::Fire {
                player_id: fire.player_id.as_deref().map(parse_player).transpose()?,
                target: Point::new(fire.x, fire.y),
            },
            ClientMessage::SelectWeapon(select) => MatchEvent::SelectWeapon {
                weapon: select.weapon,
            },
            ClientMessage::BodyMoved(moved) => MatchEvent::BodyMoved {
                body: moved.body.try_into()?,
                position: Point::new(moved.x, moved.y),
                velocity: Point::new(moved.vx, moved.vy),
            },
            ClientMessage::Collision(collision) => MatchEvent::Collision {
                projectile_id: collision.projectile_id,
                other: collision.other.try_into()?,
            },
            ClientMessage::ForceEndTurn => MatchEvent::ForceEndTurn,
        })
    }
}

/// Messages the match sends to the rendering/UI layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Snapshot plus events for a given tick.
    MatchUpdate(MatchUpdateDto),
    // High-level phase transitions (running, ended).
    MatchState(MatchPhaseDto),
    // Input line that could not be understood.
    Error { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchUpdateDto {
    pub tick: u64,
    pub turn: TurnDto,
    pub teams: Vec<TeamDto>,
    pub players: Vec<PlayerDto>,
    pub projectiles: Vec<ProjectileDto>,
    pub events: Vec<EventDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnDto {
    pub number: u64,
    pub phase: String,
    pub current_player: Option<String>,
    pub current_weapon: Option<String>,
    pub time_remaining: f32,
    pub in_progress: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamDto {
    pub id: String,
    pub name: String,
    pub selected_weapon: String,
    pub eliminated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerDto {
    pub id: String,
    pub team: String,
    pub health: f32,
    pub x: f32,
    pub y: f32,
    pub can_move: bool,
    pub can_shoot: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileDto {
    pub id: u64,
    pub owner_id: String,
    pub weapon: String,
    pub x: f32,
    pub y: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuse_remaining: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HitDto {
    pub player_id: String,
    pub damage: f32,
    pub health: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventDto {
    TurnStarted { player_id: String, turn: u64 },
    TurnTimedOut { player_id: String },
    TurnSkipped { player_id: String },
    WeaponSelected { team: String, weapon: String },
    ProjectileLaunched { projectile_id: u64, owner_id: String, weapon: String },
    Exploded {
        x: f32,
        y: f32,
        owner_id: String,
        weapon: String,
        radius: f32,
        hits: Vec<HitDto>,
        shielded: Vec<String>,
    },
    ProjectileDiscarded { projectile_id: u64, owner_id: String },
    PlayerEliminated { player_id: String },
    TeamEliminated { team: String },
    /// `winner` is absent on a draw.
    MatchEnded { winner: Option<String> },
    Rejected { reason: String },
}

fn winner_of(outcome: MatchOutcome) -> Option<String> {
    match outcome {
        MatchOutcome::Winner(team) => Some(team.to_string()),
        MatchOutcome::Draw => None,
    }
}

impl From<&CombatEvent> for EventDto {
    fn from(event: &CombatEvent) -> Self {
        match event {
            CombatEvent::TurnStarted { player_id, turn } => EventDto::TurnStarted {
                player_id: player_id.to_string(),
                turn: *turn,
            },
            CombatEvent::TurnTimedOut { player_id } => EventDto::TurnTimedOut {
                player_id: player_id.to_string(),
            },
            CombatEvent::TurnSkipped { player_id } => EventDto::TurnSkipped {
                player_id: player_id.to_string(),
            },
            CombatEvent::WeaponSelected { team, weapon } => EventDto::WeaponSelected {
                team: team.to_string(),
                weapon: weapon.to_string(),
            },
            CombatEvent::ProjectileLaunched {
                projectile_id,
                owner_id,
                weapon,
            } => EventDto::ProjectileLaunched {
                projectile_id: *projectile_id,
                owner_id: owner_id.to_string(),
                weapon: weapon.to_string(),
            },
            CombatEvent::Exploded(report) => EventDto::Exploded {
                x: report.point.x,
                y: report.point.y,
                owner_id: report.owner_id.to_string(),
                weapon: report.weapon.to_string(),
                radius: report.radius,
                hits: report
                    .hits
                    .iter()
                    .map(|hit| HitDto {
                        player_id: hit.player_id.to_string(),
                        damage: hit.amount,
                        health: hit.health_after,
                    })
                    .collect(),
                shielded: report.shielded.iter().map(ToString::to_string).collect(),
            },
            CombatEvent::ProjectileDiscarded {
                projectile_id,
                owner_id,
            } => EventDto::ProjectileDiscarded {
                projectile_id: *projectile_id,
                owner_id: owner_id.to_string(),
            },
            CombatEvent::PlayerEliminated { player_id } => EventDto::PlayerEliminated {
                player_id: player_id.to_string(),
            },
            CombatEvent::TeamEliminated { team } => EventDto::TeamEliminated {
                team: team.to_string(),
            },
            CombatEvent::MatchEnded(outcome) => EventDto::MatchEnded {
                winner: winner_of(*outcome),
            },
            CombatEvent::ActionRejected(error) => EventDto::Rejected {
                reason: error.to_string(),
            },
        }
    }
}

impl From<MatchUpdate> for MatchUpdateDto {
    fn from(update: MatchUpdate) -> Self {
        let snapshot = update.snapshot;
        Self {
            tick: update.tick,
            turn: TurnDto {
                number: snapshot.turn_number,
                phase: format!("{:?}", snapshot.phase),
                current_player: snapshot.current_player.map(|id| id.to_string()),
                current_weapon: snapshot.current_weapon.map(|w| w.to_string()),
                time_remaining: snapshot.turn_time_remaining,
                in_progress: snapshot.turn_in_progress,
            },
            teams: snapshot
                .teams
                .iter()
                .map(|team| TeamDto {
                    id: team.id.to_string(),
                    name: team.name.clone(),
                    selected_weapon: team.selected_weapon.to_string(),
                    eliminated: team.eliminated,
                })
                .collect(),
            players: snapshot
                .players
                .iter()
                .map(|player| PlayerDto {
                    id: player.id.to_string(),
                    team: player.team_id.to_string(),
                    health: player.health,
                    x: player.x,
                    y: player.y,
                    can_move: player.can_move,
                    can_shoot: player.can_shoot,
                })
                .collect(),
            projectiles: snapshot
                .projectiles
                .iter()
                .map(|projectile| ProjectileDto {
                    id: projectile.id,
                    owner_id: projectile.owner_id.to_string(),
                    weapon: projectile.weapon.to_string(),
                    x: projectile.x,
                    y: projectile.y,
                    fuse_remaining: projectile.fuse_remaining,
                })
                .collect(),
            events: update.events.iter().map(EventDto::from).collect(),
        }
    }
}

/// High-level match phase for the UI layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MatchPhaseDto {
    Setup,
    Running,
    Ended { winner: Option<String> },
}

impl From<MatchPhase> for MatchPhaseDto {
    fn from(phase: MatchPhase) -> Self {
        match phase {
            MatchPhase::Setup => MatchPhaseDto::Setup,
            MatchPhase::Running => MatchPhaseDto::Running,
            MatchPhase::Ended(outcome) => MatchPhaseDto::Ended {
                winner: winner_of(outcome),
            },
        }
    }
}

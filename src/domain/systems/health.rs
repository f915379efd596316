// Health ledger: the only place player health changes.
//
// It also owns the roster, since elimination and win checks are roster queries.

use tracing::{info, warn};

use crate::domain::errors::CombatError;
use crate::domain::state::{Player, PlayerId, Point, Team, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Winner(TeamId),
    /// Every team was wiped out at once.
    Draw,
}

/// Result of a single `apply_damage` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageReport {
    pub player_id: PlayerId,
    pub amount: f32,
    pub health_before: f32,
    pub health_after: f32,
    /// Health reached zero with this hit.
    pub eliminated: bool,
    /// Set when this hit took out the last living player of the team.
    pub team_eliminated: Option<TeamId>,
}

#[derive(Debug, Clone)]
pub struct HealthLedger {
    teams: Vec<Team>,
    players: Vec<Player>,
    max_health: f32,
}

impl HealthLedger {
    pub fn new(teams: Vec<Team>, players: Vec<Player>, max_health: f32) -> Self {
        let players = players
            .into_iter()
            .map(|mut p| {
                p.health = p.health.clamp(0.0, max_health);
                p
            })
            .collect();
        Self {
            teams,
            players,
            max_health,
        }
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn living_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive())
    }

    /// Subtracts `amount` from the player's health, clamped to `[0, max]`.
    /// Returns `None` for unknown players, dead players, and non-positive amounts.
    pub fn apply_damage(&mut self, id: PlayerId, amount: f32) -> Option<DamageReport> {
        if !(amount > 0.0) {
            return None;
        }
        let Some(index) = self.index_of(id) else {
            warn!(error = %CombatError::UnknownPlayer(id), "damage for unknown player ignored");
            return None;
        };

        let player = &mut self.players[index];
        if !player.is_alive() {
            return None;
        }

        let health_before = player.health;
        player.health = (player.health - amount).clamp(0.0, self.max_health);
        let health_after = player.health;
        let eliminated = health_after <= 0.0;
        let team = player.team_id;

        let mut team_eliminated = None;
        if eliminated {
            // Dead players cannot act.
            player.can_move = false;
            player.can_shoot = false;
            info!(player_id = %id, "player eliminated");
            if self.is_team_eliminated(team) {
                info!(team = %team, "team eliminated");
                team_eliminated = Some(team);
            }
        }

        Some(DamageReport {
            player_id: id,
            amount: health_before - health_after,
            health_before,
            health_after,
            eliminated,
            team_eliminated,
        })
    }

    /// True iff every player of the team has no health left.
    pub fn is_team_eliminated(&self, team: TeamId) -> bool {
        self.players
            .iter()
            .filter(|p| p.team_id == team)
            .all(|p| !p.is_alive())
    }

    pub fn surviving_teams(&self) -> Vec<TeamId> {
        self.teams
            .iter()
            .map(|t| t.id)
            .filter(|&id| !self.is_team_eliminated(id))
            .collect()
    }

    /// `Some` once the match is decided: one surviving team wins, none is a draw.
    /// `None` while more than one team is still standing.
    pub fn winning_team(&self) -> Option<MatchOutcome> {
        let surviving = self.surviving_teams();
        match surviving.as_slice() {
            [winner] => Some(MatchOutcome::Winner(*winner)),
            [] => {
                warn!(
                    error = %CombatError::AmbiguousMatchOutcome { surviving_teams: surviving.clone() },
                    "no team survived; declaring a draw"
                );
                Some(MatchOutcome::Draw)
            }
            _ => None,
        }
    }

    pub fn set_position(&mut self, id: PlayerId, position: Point) -> bool {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(player) => {
                player.position = position;
                true
            }
            None => false,
        }
    }

    /// Grants move/shoot to exactly one player and revokes everyone else.
    pub(crate) fn grant_turn(&mut self, index: usize) {
        for (i, player) in self.players.iter_mut().enumerate() {
            let active = i == index && player.is_alive();
            player.can_move = active;
            player.can_shoot = active;
        }
    }

    pub(crate) fn revoke_all(&mut self) {
        for player in &mut self.players {
            player.can_move = false;
            player.can_shoot = false;
        }
    }
}

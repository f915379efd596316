// Match orchestration: owns every combat system and routes inputs through them.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::types::{CombatEvent, MatchSnapshot};
use crate::domain::errors::{CombatError, SetupError};
use crate::domain::state::{Player, PlayerId, PlayerSnapshot, Point, Team, TeamId, TeamSnapshot};
use crate::domain::systems::{
    BodyRef, DamageReport, ExplosionEngine, HealthLedger, MatchClock, MatchOutcome, MatchTask,
    Platform, ProjectileSystem, Resolution, TerrainModel, TurnScheduler,
};
use crate::domain::tuning::maps::{self, MapDefinition};
use crate::domain::tuning::player::PlayerTuning;
use crate::domain::tuning::projectile::ProjectileTuning;
use crate::domain::tuning::turn::TurnTuning;
use crate::domain::tuning::weapon::{WeaponCatalog, WeaponKind};

#[derive(Debug, Clone, PartialEq)]
pub struct TeamSetup {
    pub name: String,
    pub player_count: usize,
}

impl TeamSetup {
    pub fn new(name: impl Into<String>, player_count: usize) -> Self {
        Self {
            name: name.into(),
            player_count,
        }
    }
}

/// Everything the map/config provider hands over at match start.
#[derive(Debug, Clone)]
pub struct MatchSetup {
    pub teams: Vec<TeamSetup>,
    /// `None` when the provider supplied no terrain at all.
    pub platforms: Option<Vec<Platform>>,
    pub catalog: WeaponCatalog,
    pub turn: TurnTuning,
    pub projectile: ProjectileTuning,
    pub player: PlayerTuning,
    /// One point per player in team order; defaults to a line along the ground.
    pub spawn_points: Option<Vec<Point>>,
}

impl MatchSetup {
    /// Teams on the classic arena with default tuning.
    pub fn new(teams: Vec<TeamSetup>) -> Self {
        Self {
            teams,
            platforms: Some(maps::classic().platforms),
            catalog: WeaponCatalog::default(),
            turn: TurnTuning::default(),
            projectile: ProjectileTuning::default(),
            player: PlayerTuning::default(),
            spawn_points: None,
        }
    }

    /// Teams named `Team A`, `Team B`, ... with the given sizes.
    pub fn from_team_sizes(sizes: &[usize]) -> Self {
        let teams = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| TeamSetup::new(format!("Team {}", TeamId(i)), size))
            .collect();
        Self::new(teams)
    }

    pub fn with_map(mut self, map: &MapDefinition) -> Self {
        self.platforms = Some(map.platforms.clone());
        self
    }

    pub fn with_spawn_points(mut self, points: Vec<Point>) -> Self {
        self.spawn_points = Some(points);
        self
    }
}

/// One running match. Created at match start, dropped at match end.
///
/// Mutating calls queue [`CombatEvent`]s; [`Match::tick`] returns everything
/// queued since the previous tick.
#[derive(Debug)]
pub struct Match {
    clock: MatchClock,
    terrain: TerrainModel,
    ledger: HealthLedger,
    explosions: ExplosionEngine,
    projectiles: ProjectileSystem,
    turns: TurnScheduler,
    outcome: Option<MatchOutcome>,
    events: Vec<CombatEvent>,
}

impl Match {
    pub fn new(setup: MatchSetup) -> Result<Self, SetupError> {
        validate_teams(&setup.teams, setup.player.max_team_size)?;

        let total_players: usize = setup.teams.iter().map(|t| t.player_count).sum();
        let spawn_points = match setup.spawn_points {
            Some(points) if points.len() != total_players => {
                return Err(SetupError::SpawnPointCount {
                    expected: total_players,
                    found: points.len(),
                });
            }
            Some(points) => points,
            None => maps::default_spawn_points(total_players, setup.player.spawn_spacing),
        };

        let teams: Vec<Team> = setup
            .teams
            .iter()
            .enumerate()
            .map(|(i, t)| Team {
                id: TeamId(i),
                name: t.name.clone(),
                player_count: t.player_count,
            })
            .collect();
        let players: Vec<Player> = teams
            .iter()
            .flat_map(|team| (0..team.player_count).map(move |slot| PlayerId::new(team.id, slot)))
            .zip(spawn_points)
            .map(|(id, position)| Player::new(id, position, setup.player.max_health))
            .collect();

        let ledger = HealthLedger::new(teams, players, setup.player.max_health);
        let turns = TurnScheduler::new(setup.turn, &ledger, setup.catalog.default_weapon());
        let terrain = match setup.platforms {
            Some(platforms) => TerrainModel::new(platforms),
            None => TerrainModel::missing(),
        };

        info!(
            teams = ledger.teams().len(),
            players = ledger.players().len(),
            platforms = terrain.platforms().len(),
            "match created"
        );

        let mut game = Self {
            clock: MatchClock::new(),
            terrain,
            ledger,
            explosions: ExplosionEngine::new(setup.catalog),
            projectiles: ProjectileSystem::new(setup.projectile),
            turns,
            outcome: None,
            events: Vec::new(),
        };
        game.begin_turn();
        Ok(game)
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    pub fn ledger(&self) -> &HealthLedger {
        &self.ledger
    }

    pub fn turns(&self) -> &TurnScheduler {
        &self.turns
    }

    pub fn terrain(&self) -> &TerrainModel {
        &self.terrain
    }

    pub fn catalog(&self) -> &WeaponCatalog {
        self.explosions.catalog()
    }

    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    /// Advances match time by `dt` seconds and runs everything that became due.
    pub fn tick(&mut self, dt: f32) -> Vec<CombatEvent> {
        if self.outcome.is_none() {
            if let Some(player_id) = self.turns.update_timer(dt, &mut self.ledger, &mut self.clock) {
                self.events.push(CombatEvent::TurnTimedOut { player_id });
                self.push_turn_started();
            }
        }

        for (handle, task) in self.clock.advance(dt) {
            match task {
                MatchTask::NextTurn => {
                    if self
                        .turns
                        .on_transition_due(handle, &mut self.ledger, &mut self.clock)
                        .is_some()
                    {
                        self.push_turn_started();
                    }
                }
                MatchTask::Fuse { .. } | MatchTask::SafetyTimeout { .. } => {
                    if self.outcome.is_some() {
                        continue;
                    }
                    if let Some(resolution) = self.projectiles.on_task(task, &mut self.clock) {
                        self.resolve(resolution);
                    }
                }
            }
        }

        std::mem::take(&mut self.events)
    }

    /// Launches the active team's weapon from the active player toward `target`.
    pub fn fire(&mut self, shooter: Option<PlayerId>, target: Point) -> Result<u64, CombatError> {
        if self.outcome.is_some() {
            return Err(CombatError::MatchOver);
        }
        if self.projectiles.in_flight().is_some() {
            return Err(CombatError::ProjectileInFlight);
        }
        let current = self
            .turns
            .current_player()
            .ok_or(CombatError::NoLivingPlayerFound)?;
        if let Some(requested) = shooter {
            if requested != current {
                return Err(CombatError::NotPlayersTurn(requested));
            }
        }
        let player = self
            .ledger
            .player(current)
            .cloned()
            .ok_or(CombatError::UnknownPlayer(current))?;
        if !self.turns.is_player_turn(current) || !player.can_shoot {
            return Err(CombatError::NotPlayersTurn(current));
        }

        let kind = self
            .turns
            .current_weapon()
            .unwrap_or_else(|| self.explosions.catalog().default_weapon());
        let weapon = self.explosions.catalog().resolve(kind);
        let projectile = self
            .projectiles
            .launch(&player, target, weapon, &mut self.clock)?;
        let (projectile_id, weapon) = (projectile.id, projectile.weapon);

        self.turns.lock_player_for_projectile(&mut self.ledger);
        self.events.push(CombatEvent::ProjectileLaunched {
            projectile_id,
            owner_id: current,
            weapon,
        });
        Ok(projectile_id)
    }

    /// Switches the active team's weapon. Unknown names change nothing.
    pub fn select_weapon(&mut self, weapon: &str) -> Result<WeaponKind, CombatError> {
        let catalog = self.explosions.catalog();
        match self.turns.set_current_weapon(weapon, catalog) {
            Ok(kind) => {
                if let Some(player) = self.turns.current_player() {
                    self.events.push(CombatEvent::WeaponSelected {
                        team: player.team,
                        weapon: kind,
                    });
                }
                Ok(kind)
            }
            Err(error) => {
                warn!(%error, requested = weapon, "weapon switch ignored");
                Err(error)
            }
        }
    }

    /// Physics provider reports a body's latest position and velocity.
    pub fn body_moved(&mut self, body: BodyRef, position: Point, velocity: Point) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        match body {
            BodyRef::Projectile(id) => self.projectiles.update_body(id, position, velocity),
            BodyRef::Player(id) => self.ledger.set_position(id, position),
            BodyRef::Terrain | BodyRef::Other => false,
        }
    }

    /// Physics provider reports a collision between a projectile and another body.
    pub fn collision(&mut self, projectile_id: u64, other: BodyRef) {
        if self.outcome.is_some() {
            debug!(projectile_id, "collision after match end ignored");
            return;
        }
        if let Some(resolution) = self
            .projectiles
            .on_collision(projectile_id, other, &mut self.clock)
        {
            self.resolve(resolution);
        }
    }

    /// Damage from outside the explosion model (falls, hazards).
    pub fn apply_damage(&mut self, player_id: PlayerId, amount: f32) -> Option<DamageReport> {
        if self.outcome.is_some() {
            return None;
        }
        let report = self.ledger.apply_damage(player_id, amount)?;
        self.record_damage(&report);
        self.check_outcome();
        Some(report)
    }

    /// Ends the current turn immediately. A projectile still in flight is discarded.
    pub fn force_end_turn(&mut self) -> Result<PlayerId, CombatError> {
        if self.outcome.is_some() {
            return Err(CombatError::MatchOver);
        }
        self.discard_in_flight();
        if let Some(player_id) = self.turns.current_player() {
            self.events.push(CombatEvent::TurnSkipped { player_id });
        }
        let next = self
            .turns
            .force_end_turn(&mut self.ledger, &mut self.clock)
            .ok_or(CombatError::NoLivingPlayerFound)?;
        self.push_turn_started();
        Ok(next)
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        let state = self.turns.state();
        let default_weapon = self.explosions.catalog().default_weapon();
        MatchSnapshot {
            turn_number: self.turns.turn_number(),
            phase: self.turns.phase(),
            current_player: state.current_player,
            current_weapon: self.turns.current_weapon(),
            turn_time_remaining: state.turn_time_remaining,
            turn_in_progress: state.turn_in_progress,
            teams: self
                .ledger
                .teams()
                .iter()
                .map(|team| TeamSnapshot {
                    id: team.id,
                    name: team.name.clone(),
                    selected_weapon: self.turns.weapon_for_team(team.id).unwrap_or(default_weapon),
                    eliminated: self.ledger.is_team_eliminated(team.id),
                })
                .collect(),
            players: self.ledger.players().iter().map(PlayerSnapshot::from).collect(),
            projectiles: self.projectiles.snapshots(&self.clock),
            outcome: self.outcome,
        }
    }

    fn begin_turn(&mut self) {
        if self.turns.start_turn(&mut self.ledger, &mut self.clock).is_some() {
            self.push_turn_started();
        }
    }

    fn discard_in_flight(&mut self) {
        if let Some(Resolution::Discarded {
            projectile_id,
            owner_id,
        }) = self.projectiles.discard(&mut self.clock)
        {
            self.events.push(CombatEvent::ProjectileDiscarded {
                projectile_id,
                owner_id,
            });
        }
    }

    fn push_turn_started(&mut self) {
        if let Some(player_id) = self.turns.current_player() {
            self.events.push(CombatEvent::TurnStarted {
                player_id,
                turn: self.turns.turn_number(),
            });
        }
    }

    // One resolution per projectile: explode (or not), then hand the turn over once.
    fn resolve(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Detonated {
                owner_id,
                weapon,
                point,
                ..
            } => {
                let report = self.explosions.detonate(
                    point,
                    owner_id,
                    weapon,
                    &self.terrain,
                    &mut self.ledger,
                );
                self.events.push(CombatEvent::Exploded(report.clone()));
                for hit in &report.hits {
                    self.record_damage(hit);
                }
            }
            Resolution::Discarded {
                projectile_id,
                owner_id,
            } => {
                self.events.push(CombatEvent::ProjectileDiscarded {
                    projectile_id,
                    owner_id,
                });
            }
        }

        self.turns.end_projectile_turn(&mut self.clock);
        self.check_outcome();
    }

    fn record_damage(&mut self, report: &DamageReport) {
        if report.eliminated {
            self.events.push(CombatEvent::PlayerEliminated {
                player_id: report.player_id,
            });
        }
        if let Some(team) = report.team_eliminated {
            self.events.push(CombatEvent::TeamEliminated { team });
        }
    }

    fn check_outcome(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        let Some(outcome) = self.ledger.winning_team() else {
            return;
        };
        match outcome {
            MatchOutcome::Winner(team) => {
                let name = self
                    .ledger
                    .teams()
                    .get(team.0)
                    .map(|t| t.name.as_str())
                    .unwrap_or("?");
                info!(team = %team, name, "match won");
            }
            MatchOutcome::Draw => info!("match ended in a draw"),
        }
        self.outcome = Some(outcome);
        // Nothing may resolve once the match is decided.
        self.discard_in_flight();
        self.turns.end_match(&mut self.ledger, &mut self.clock);
        self.events.push(CombatEvent::MatchEnded(outcome));
    }
}

fn validate_teams(teams: &[TeamSetup], max_team_size: usize) -> Result<(), SetupError> {
    if teams.len() < 2 {
        return Err(SetupError::TooFewTeams(teams.len()));
    }
    let mut names = HashSet::new();
    for team in teams {
        if team.player_count == 0 || team.player_count > max_team_size {
            return Err(SetupError::InvalidTeamSize {
                team: team.name.clone(),
                size: team.player_count,
            });
        }
        if !names.insert(team.name.trim()) {
            return Err(SetupError::DuplicateTeamName(team.name.clone()));
        }
    }
    Ok(())
}

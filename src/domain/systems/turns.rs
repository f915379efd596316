// Turn rotation state machine.
//
// Teams take turns round-robin; inside a team its players rotate round-robin too,
// so a one-player team acts every other turn against a two-player team.

use tracing::{debug, info, warn};

use crate::domain::errors::CombatError;
use crate::domain::state::{PlayerId, TeamId};
use crate::domain::systems::clock::{MatchClock, MatchTask, TaskHandle};
use crate::domain::systems::health::HealthLedger;
use crate::domain::tuning::turn::TurnTuning;
use crate::domain::tuning::weapon::{WeaponCatalog, WeaponKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Active player may move, aim and fire.
    WaitingForAction,
    /// Player fired; the turn is locked until the projectile resolves.
    ProjectileInFlight,
    /// Projectile resolved; next turn starts after the grace delay.
    TurnTransition,
    MatchEnded,
}

/// Rotation bookkeeping, read by the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnState {
    /// Team inspected first by the next rotation.
    pub active_team_index: usize,
    /// Per-team pointer to the next player slot to try.
    pub next_player_index: Vec<usize>,
    pub current_player: Option<PlayerId>,
    pub turn_time_remaining: f32,
    pub turn_in_progress: bool,
}

#[derive(Debug)]
pub struct TurnScheduler {
    tuning: TurnTuning,
    state: TurnState,
    phase: TurnPhase,
    team_sizes: Vec<usize>,
    weapon_by_team: Vec<WeaponKind>,
    timer_armed: bool,
    pending_transition: Option<TaskHandle>,
    turn_number: u64,
}

impl TurnScheduler {
    pub fn new(tuning: TurnTuning, ledger: &HealthLedger, default_weapon: WeaponKind) -> Self {
        let team_sizes: Vec<usize> = ledger.teams().iter().map(|t| t.player_count).collect();
        Self {
            tuning,
            state: TurnState {
                active_team_index: 0,
                next_player_index: vec![0; team_sizes.len()],
                current_player: None,
                turn_time_remaining: tuning.turn_time,
                turn_in_progress: false,
            },
            phase: TurnPhase::WaitingForAction,
            weapon_by_team: vec![default_weapon; team_sizes.len()],
            team_sizes,
            timer_armed: false,
            pending_transition: None,
            turn_number: 0,
        }
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.state.current_player
    }

    pub fn remaining_time(&self) -> f32 {
        self.state.turn_time_remaining
    }

    pub fn is_turn_in_progress(&self) -> bool {
        self.state.turn_in_progress
    }

    pub fn turn_number(&self) -> u64 {
        self.turn_number
    }

    /// True when `id` is the active player and has not fired yet.
    pub fn is_player_turn(&self, id: PlayerId) -> bool {
        self.phase == TurnPhase::WaitingForAction && self.state.current_player == Some(id)
    }

    /// Hands the turn to the next living player and re-arms the timer.
    ///
    /// Returns the player who received the turn; `None` once the match has ended.
    pub fn start_turn(&mut self, ledger: &mut HealthLedger, clock: &mut MatchClock) -> Option<PlayerId> {
        if self.phase == TurnPhase::MatchEnded {
            debug!("match ended; no turn granted");
            return None;
        }
        if let Some(stale) = self.pending_transition.take() {
            clock.cancel(stale);
        }

        let index = self.next_player_index(ledger).unwrap_or_else(|error| {
            warn!(%error, "turn rotation found nobody; falling back to the first player");
            0
        });
        ledger.grant_turn(index);

        let player = ledger.players().get(index).map(|p| p.id);
        self.state.current_player = player;
        self.state.turn_time_remaining = self.tuning.turn_time;
        self.state.turn_in_progress = false;
        self.timer_armed = true;
        self.phase = TurnPhase::WaitingForAction;
        self.turn_number += 1;

        if let Some(id) = player {
            info!(
                turn = self.turn_number,
                player_id = %id,
                weapon = %self.weapon_for_team(id.team).map(|w| w.key()).unwrap_or("-"),
                "turn started"
            );
        }
        player
    }

    /// Finds the next living player and advances the rotation pointers.
    ///
    /// Returns the player's index in the ledger. Eliminated teams are passed
    /// over without spending an attempt; dead players inside a live team do
    /// spend one.
    pub fn next_player_index(&mut self, ledger: &HealthLedger) -> Result<usize, CombatError> {
        let team_count = self.team_sizes.len();
        let total_players: usize = self.team_sizes.iter().sum();
        if team_count == 0 {
            return Err(CombatError::NoLivingPlayerFound);
        }

        for _ in 0..total_players {
            let Some(team) = self.next_standing_team(ledger) else {
                break;
            };
            let size = self.team_sizes[team].max(1);
            let slot = self.state.next_player_index[team] % size;
            self.state.next_player_index[team] = (slot + 1) % size;

            let id = PlayerId::new(TeamId(team), slot);
            match ledger.index_of(id) {
                Some(index) if ledger.players()[index].is_alive() => {
                    self.state.active_team_index = (team + 1) % team_count;
                    return Ok(index);
                }
                _ => debug!(player_id = %id, "skipping fallen player"),
            }
        }

        Err(CombatError::NoLivingPlayerFound)
    }

    // Moves the team pointer past eliminated teams; `None` when every team is out.
    fn next_standing_team(&mut self, ledger: &HealthLedger) -> Option<usize> {
        let team_count = self.team_sizes.len();
        for _ in 0..team_count {
            let team = self.state.active_team_index % team_count;
            if !ledger.is_team_eliminated(TeamId(team)) {
                return Some(team);
            }
            self.state.active_team_index = (team + 1) % team_count;
        }
        None
    }

    /// The active player fired: freeze the turn until the projectile resolves.
    pub fn lock_player_for_projectile(&mut self, ledger: &mut HealthLedger) {
        self.state.turn_in_progress = true;
        self.timer_armed = false;
        self.phase = TurnPhase::ProjectileInFlight;
        ledger.revoke_all();
        debug!(player_id = ?self.state.current_player, "turn locked for projectile");
    }

    /// Projectile resolved; schedule the next turn after the grace delay.
    ///
    /// Only the first call per locked turn has any effect.
    pub fn end_projectile_turn(&mut self, clock: &mut MatchClock) -> bool {
        if self.phase != TurnPhase::ProjectileInFlight {
            warn!(phase = ?self.phase, "end of projectile turn outside a locked turn; ignoring");
            return false;
        }
        self.state.turn_in_progress = false;
        self.phase = TurnPhase::TurnTransition;
        self.pending_transition = Some(clock.schedule(self.tuning.grace_delay, MatchTask::NextTurn));
        true
    }

    /// Runs a due `NextTurn` task. Stale handles are ignored.
    pub fn on_transition_due(
        &mut self,
        handle: TaskHandle,
        ledger: &mut HealthLedger,
        clock: &mut MatchClock,
    ) -> Option<PlayerId> {
        if self.pending_transition != Some(handle) {
            return None;
        }
        self.pending_transition = None;
        self.start_turn(ledger, clock)
    }

    /// Counts the turn timer down. On expiry the active player forfeits the
    /// rest of the turn, which is returned.
    pub fn update_timer(
        &mut self,
        dt: f32,
        ledger: &mut HealthLedger,
        clock: &mut MatchClock,
    ) -> Option<PlayerId> {
        if !self.timer_armed || self.state.turn_in_progress || self.phase != TurnPhase::WaitingForAction {
            return None;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.state.turn_time_remaining = (self.state.turn_time_remaining - dt).max(0.0);
        if self.state.turn_time_remaining > 0.0 {
            return None;
        }

        let forfeited = self.state.current_player;
        info!(player_id = ?forfeited.map(|id| id.to_string()), "turn timed out");
        self.start_turn(ledger, clock);
        forfeited
    }

    /// Skips the rest of the current turn. The caller must clear any projectile first.
    pub fn force_end_turn(&mut self, ledger: &mut HealthLedger, clock: &mut MatchClock) -> Option<PlayerId> {
        if self.phase == TurnPhase::MatchEnded {
            return None;
        }
        info!(player_id = ?self.state.current_player.map(|id| id.to_string()), "turn ended early");
        self.state.turn_in_progress = false;
        self.start_turn(ledger, clock)
    }

    /// Terminal state: nobody may act and no further turns start.
    pub fn end_match(&mut self, ledger: &mut HealthLedger, clock: &mut MatchClock) {
        if let Some(pending) = self.pending_transition.take() {
            clock.cancel(pending);
        }
        ledger.revoke_all();
        self.phase = TurnPhase::MatchEnded;
        self.timer_armed = false;
        self.state.turn_in_progress = false;
        self.state.current_player = None;
    }

    /// Weapon selected by the active player's team.
    pub fn current_weapon(&self) -> Option<WeaponKind> {
        self.state
            .current_player
            .and_then(|id| self.weapon_for_team(id.team))
    }

    pub fn weapon_for_team(&self, team: TeamId) -> Option<WeaponKind> {
        self.weapon_by_team.get(team.0).copied()
    }

    /// Switches the active team's weapon. Unknown names leave the selection untouched.
    pub fn set_current_weapon(
        &mut self,
        weapon: &str,
        catalog: &WeaponCatalog,
    ) -> Result<WeaponKind, CombatError> {
        if self.phase == TurnPhase::MatchEnded {
            return Err(CombatError::MatchOver);
        }
        let kind: WeaponKind = weapon.parse()?;
        if !catalog.contains(kind) {
            return Err(CombatError::UnknownWeaponType(weapon.to_string()));
        }
        let team = self
            .state
            .current_player
            .map(|id| id.team)
            .ok_or(CombatError::NoLivingPlayerFound)?;
        let slot = self
            .weapon_by_team
            .get_mut(team.0)
            .ok_or(CombatError::NoLivingPlayerFound)?;
        *slot = kind;
        info!(team = %team, weapon = %kind, "weapon selected");
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::ledger_with_team_sizes;

    fn id(s: &str) -> PlayerId {
        s.parse().expect("valid player id")
    }

    fn scheduler(ledger: &HealthLedger) -> TurnScheduler {
        TurnScheduler::new(TurnTuning::default(), ledger, WeaponKind::Bazooka)
    }

    fn rotation(sizes: &[usize], turns: usize) -> Vec<String> {
        let mut ledger = ledger_with_team_sizes(sizes);
        let mut clock = MatchClock::new();
        let mut turns_sched = scheduler(&ledger);
        (0..turns)
            .filter_map(|_| turns_sched.start_turn(&mut ledger, &mut clock))
            .map(|id| id.to_string())
            .collect()
    }

    fn active_players(ledger: &HealthLedger) -> Vec<PlayerId> {
        ledger
            .players()
            .iter()
            .filter(|p| p.can_move && p.can_shoot)
            .map(|p| p.id)
            .collect()
    }

    #[test]
    fn two_versus_one_alternates_teams() {
        assert_eq!(rotation(&[2, 1], 6), ["A1", "B1", "A2", "B1", "A1", "B1"]);
    }

    #[test]
    fn every_living_player_gets_a_turn_within_one_cycle() {
        let sizes = [3, 1, 2];
        let cycle = sizes.len() * sizes.iter().max().copied().unwrap_or(1);
        let seen = rotation(&sizes, cycle);

        for expected in ["A1", "A2", "A3", "B1", "C1", "C2"] {
            assert!(seen.iter().any(|s| s == expected), "{expected} missing from {seen:?}");
        }
        // Each team's own rotation never repeats a player before the others had a go.
        let team_a: Vec<_> = seen.iter().filter(|s| s.starts_with('A')).collect();
        assert_eq!(team_a, ["A1", "A2", "A3"]);
    }

    #[test]
    fn fallen_players_are_skipped() {
        let mut ledger = ledger_with_team_sizes(&[2, 1]);
        let mut clock = MatchClock::new();
        let mut turns = scheduler(&ledger);
        ledger.apply_damage(id("A2"), 100.0);

        let order: Vec<_> = (0..4)
            .filter_map(|_| turns.start_turn(&mut ledger, &mut clock))
            .collect();
        assert_eq!(order, vec![id("A1"), id("B1"), id("A1"), id("B1")]);
    }

    #[test]
    fn eliminated_teams_are_skipped() {
        let mut ledger = ledger_with_team_sizes(&[1, 1, 1]);
        let mut clock = MatchClock::new();
        let mut turns = scheduler(&ledger);
        ledger.apply_damage(id("B1"), 100.0);

        let order: Vec<_> = (0..4)
            .filter_map(|_| turns.start_turn(&mut ledger, &mut clock))
            .collect();
        assert_eq!(order, vec![id("A1"), id("C1"), id("A1"), id("C1")]);
    }

    #[test]
    fn exactly_one_player_may_act() {
        let mut ledger = ledger_with_team_sizes(&[3, 2]);
        let mut clock = MatchClock::new();
        let mut turns = scheduler(&ledger);

        for _ in 0..7 {
            let current = turns.start_turn(&mut ledger, &mut clock).expect("turn granted");
            assert_eq!(active_players(&ledger), vec![current]);
        }
        turns.lock_player_for_projectile(&mut ledger);
        assert!(active_players(&ledger).is_empty());
    }

    #[test]
    fn exhausted_rotation_falls_back_to_first_player() {
        let mut ledger = ledger_with_team_sizes(&[1, 1]);
        let mut clock = MatchClock::new();
        let mut turns = scheduler(&ledger);
        ledger.apply_damage(id("A1"), 100.0);
        ledger.apply_damage(id("B1"), 100.0);

        assert_eq!(turns.next_player_index(&ledger), Err(CombatError::NoLivingPlayerFound));
        assert_eq!(turns.start_turn(&mut ledger, &mut clock), Some(id("A1")));
        assert!(active_players(&ledger).is_empty(), "dead fallback player cannot act");
    }

    #[test]
    fn timeout_forfeits_the_turn() {
        let mut ledger = ledger_with_team_sizes(&[1, 1]);
        let mut clock = MatchClock::new();
        let mut turns = scheduler(&ledger);
        turns.start_turn(&mut ledger, &mut clock);

        assert_eq!(turns.update_timer(29.0, &mut ledger, &mut clock), None);
        assert_eq!(turns.remaining_time(), 1.0);
        assert_eq!(turns.update_timer(1.5, &mut ledger, &mut clock), Some(id("A1")));
        assert_eq!(turns.current_player(), Some(id("B1")));
        assert_eq!(turns.remaining_time(), 30.0);
    }

    #[test]
    fn bad_time_steps_leave_the_timer_alone() {
        let mut ledger = ledger_with_team_sizes(&[1, 1]);
        let mut clock = MatchClock::new();
        let mut turns = scheduler(&ledger);
        turns.start_turn(&mut ledger, &mut clock);

        assert_eq!(turns.update_timer(-10.0, &mut ledger, &mut clock), None);
        assert_eq!(turns.update_timer(f32::NAN, &mut ledger, &mut clock), None);
        assert_eq!(turns.update_timer(f32::INFINITY, &mut ledger, &mut clock), None);
        assert_eq!(turns.remaining_time(), 30.0);
        assert_eq!(turns.current_player(), Some(id("A1")));
    }

    #[test]
    fn locked_turn_ignores_the_timer() {
        let mut ledger = ledger_with_team_sizes(&[1, 1]);
        let mut clock = MatchClock::new();
        let mut turns = scheduler(&ledger);
        turns.start_turn(&mut ledger, &mut clock);
        turns.lock_player_for_projectile(&mut ledger);

        assert_eq!(turns.update_timer(120.0, &mut ledger, &mut clock), None);
        assert!(turns.is_turn_in_progress());
        assert_eq!(turns.current_player(), Some(id("A1")));
    }

    #[test]
    fn projectile_turn_hands_over_after_grace_delay() {
        let mut ledger = ledger_with_team_sizes(&[1, 1]);
        let mut clock = MatchClock::new();
        let mut turns = scheduler(&ledger);
        turns.start_turn(&mut ledger, &mut clock);
        turns.lock_player_for_projectile(&mut ledger);

        assert!(turns.end_projectile_turn(&mut clock));
        assert!(!turns.end_projectile_turn(&mut clock), "second call is ignored");
        assert!(!turns.is_turn_in_progress());
        assert_eq!(turns.phase(), TurnPhase::TurnTransition);

        assert!(clock.advance(0.4).is_empty());
        let due = clock.advance(0.1);
        assert_eq!(due.len(), 1);
        let (handle, task) = due[0];
        assert_eq!(task, MatchTask::NextTurn);
        assert_eq!(turns.on_transition_due(handle, &mut ledger, &mut clock), Some(id("B1")));
    }

    #[test]
    fn weapon_selection_is_kept_per_team() {
        let mut ledger = ledger_with_team_sizes(&[2, 1]);
        let mut clock = MatchClock::new();
        let catalog = WeaponCatalog::default();
        let mut turns = scheduler(&ledger);

        turns.start_turn(&mut ledger, &mut clock); // A1
        assert_eq!(turns.set_current_weapon("grenade", &catalog), Ok(WeaponKind::Grenade));
        turns.start_turn(&mut ledger, &mut clock); // B1
        assert_eq!(turns.current_weapon(), Some(WeaponKind::Bazooka));
        turns.start_turn(&mut ledger, &mut clock); // A2
        assert_eq!(turns.current_weapon(), Some(WeaponKind::Grenade));
    }

    #[test]
    fn unknown_weapon_leaves_selection_untouched() {
        let mut ledger = ledger_with_team_sizes(&[1, 1]);
        let mut clock = MatchClock::new();
        let bazooka_only = WeaponCatalog::new(
            vec![WeaponCatalog::default().resolve(WeaponKind::Bazooka).clone()],
            WeaponKind::Bazooka,
        )
        .expect("catalog should build");
        let mut turns = scheduler(&ledger);
        turns.start_turn(&mut ledger, &mut clock);

        assert!(matches!(
            turns.set_current_weapon("railgun", &bazooka_only),
            Err(CombatError::UnknownWeaponType(_))
        ));
        assert!(matches!(
            turns.set_current_weapon("GRENADE", &bazooka_only),
            Err(CombatError::UnknownWeaponType(_))
        ));
        assert_eq!(turns.current_weapon(), Some(WeaponKind::Bazooka));
    }

    #[test]
    fn ended_match_grants_no_more_turns() {
        let mut ledger = ledger_with_team_sizes(&[1, 1]);
        let mut clock = MatchClock::new();
        let mut turns = scheduler(&ledger);
        turns.start_turn(&mut ledger, &mut clock);
        turns.lock_player_for_projectile(&mut ledger);
        turns.end_projectile_turn(&mut clock);
        turns.end_match(&mut ledger, &mut clock);

        assert_eq!(clock.pending_count(), 0, "pending hand-off is cancelled");
        assert_eq!(turns.start_turn(&mut ledger, &mut clock), None);
        assert_eq!(turns.force_end_turn(&mut ledger, &mut clock), None);
        assert!(active_players(&ledger).is_empty());
    }
}

use std::collections::BTreeMap;

use crate::domain::state::{Player, PlayerId, Point, Team, TeamId};
use crate::domain::systems::HealthLedger;
use crate::domain::tuning::maps;

use super::combat::{Match, MatchSetup};

pub(crate) const MAX_HEALTH: f32 = 100.0;

pub(crate) fn id(s: &str) -> PlayerId {
    s.parse().expect("valid player id")
}

fn teams_for(sizes: &[usize]) -> Vec<Team> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &player_count)| Team {
            id: TeamId(i),
            name: format!("Team {}", TeamId(i)),
            player_count,
        })
        .collect()
}

// Full-health roster in team order, standing on the default spawn line.
pub(crate) fn ledger_with_team_sizes(sizes: &[usize]) -> HealthLedger {
    let total: usize = sizes.iter().sum();
    let ids = sizes
        .iter()
        .enumerate()
        .flat_map(|(team, &size)| (0..size).map(move |slot| PlayerId::new(TeamId(team), slot)));
    let players = ids
        .zip(maps::default_spawn_points(total, 50.0))
        .map(|(id, position)| Player::new(id, position, MAX_HEALTH))
        .collect();
    HealthLedger::new(teams_for(sizes), players, MAX_HEALTH)
}

// Roster built from explicit ids and positions; teams are inferred from the ids.
pub(crate) fn ledger_with_positions(entries: &[(&str, Point)]) -> HealthLedger {
    let mut by_team: BTreeMap<usize, usize> = BTreeMap::new();
    let mut players: Vec<Player> = entries
        .iter()
        .map(|&(raw, position)| {
            let player_id = id(raw);
            *by_team.entry(player_id.team.0).or_default() += 1;
            Player::new(player_id, position, MAX_HEALTH)
        })
        .collect();
    players.sort_by_key(|p| p.id);

    let team_count = by_team.keys().next_back().map_or(0, |last| last + 1);
    let sizes: Vec<usize> = (0..team_count)
        .map(|team| by_team.get(&team).copied().unwrap_or(0))
        .collect();
    HealthLedger::new(teams_for(&sizes), players, MAX_HEALTH)
}

// Match with players 300 units apart on the ground, so a blast only reaches its target.
pub(crate) fn match_with_team_sizes(sizes: &[usize]) -> Match {
    let total: usize = sizes.iter().sum();
    let spawn_points = (0..total)
        .map(|i| Point::new(100.0 + 300.0 * i as f32, maps::GROUND_Y - 10.0))
        .collect();
    let mut setup = MatchSetup::from_team_sizes(sizes).with_spawn_points(spawn_points);
    setup.platforms = Some(Vec::new());
    Match::new(setup).expect("test match should build")
}

// Built-in battlefields. Platform heights are resolved against the arena
// height once, here, so nothing downstream evaluates layout expressions.

use crate::domain::state::Point;
use crate::domain::systems::terrain::Platform;

pub const GAME_WIDTH: f32 = 1200.0;
pub const GAME_HEIGHT: f32 = 700.0;

/// Y coordinate players stand on when no physics provider has placed them yet.
pub const GROUND_Y: f32 = GAME_HEIGHT - 60.0;

pub const DEFAULT_MAP_ID: &str = "classic";

#[derive(Debug, Clone)]
pub struct MapDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub platforms: Vec<Platform>,
}

fn platform(x: f32, above_floor: f32, width: f32, height: f32) -> Platform {
    Platform::new(x, GAME_HEIGHT - above_floor, width, height)
}

pub fn classic() -> MapDefinition {
    MapDefinition {
        id: "classic",
        name: "Classic Arena",
        description: "The original battlefield with floating platforms and smooth terrain",
        platforms: vec![
            platform(400.0, 125.0, 200.0, 50.0),
            platform(700.0, 175.0, 150.0, 50.0),
            platform(950.0, 225.0, 100.0, 50.0),
        ],
    }
}

pub fn mountain() -> MapDefinition {
    MapDefinition {
        id: "mountain",
        name: "Mountain Warfare",
        description: "Rugged mountain terrain with strategic high ground positions",
        platforms: vec![
            platform(300.0, 150.0, 100.0, 60.0),
            platform(600.0, 200.0, 80.0, 50.0),
            platform(900.0, 250.0, 150.0, 70.0),
            platform(500.0, 300.0, 120.0, 55.0),
            platform(850.0, 375.0, 80.0, 45.0),
        ],
    }
}

/// Returns the requested map, falling back to the classic arena.
pub fn map_by_id(id: &str) -> MapDefinition {
    match id {
        "mountain" => mountain(),
        "classic" => classic(),
        other => {
            tracing::warn!(map_id = other, "unknown map; using classic arena");
            classic()
        }
    }
}

/// Default spawn line: players spread along the ground, team by team.
pub fn default_spawn_points(count: usize, spacing: f32) -> Vec<Point> {
    let total_width = spacing * count.saturating_sub(1) as f32;
    let start = ((GAME_WIDTH - total_width) / 2.0).max(0.0);
    (0..count)
        .map(|i| Point::new(start + i as f32 * spacing, GROUND_Y - 10.0))
        .collect()
}

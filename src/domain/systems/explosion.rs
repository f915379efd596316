// Splash damage: distance falloff, terrain shielding, and forwarding hits to the ledger.

use tracing::{debug, info};

use crate::domain::state::{PlayerId, Point};
use crate::domain::systems::health::{DamageReport, HealthLedger};
use crate::domain::systems::terrain::TerrainModel;
use crate::domain::tuning::weapon::{WeaponCatalog, WeaponKind};

/// Share of the maximum damage lost between the epicenter and the blast edge.
pub const FALLOFF_SHARE: f32 = 0.75;

/// Linear falloff law: full damage at the epicenter, 25% of it at `radius`.
pub fn falloff_damage(max_damage: f32, radius: f32, distance: f32) -> f32 {
    (max_damage - (distance / radius) * max_damage * FALLOFF_SHARE).max(0.0)
}

/// Damage actually dealt at `distance`: the falloff law inside the blast, nothing outside it.
pub fn splash_damage(max_damage: f32, radius: f32, distance: f32) -> f32 {
    if distance < radius {
        falloff_damage(max_damage, radius, distance)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplosionReport {
    pub point: Point,
    pub owner_id: PlayerId,
    /// Weapon whose stats were used (after any fallback).
    pub weapon: WeaponKind,
    pub radius: f32,
    pub hits: Vec<DamageReport>,
    /// Players inside the radius that terrain protected.
    pub shielded: Vec<PlayerId>,
}

#[derive(Debug, Clone, Default)]
pub struct ExplosionEngine {
    catalog: WeaponCatalog,
}

impl ExplosionEngine {
    pub fn new(catalog: WeaponCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &WeaponCatalog {
        &self.catalog
    }

    /// Applies splash damage around `point` to every living player.
    ///
    /// The owner is treated like everybody else: terrain can shield the shooter
    /// from their own blast.
    pub fn detonate(
        &self,
        point: Point,
        owner_id: PlayerId,
        weapon: WeaponKind,
        terrain: &TerrainModel,
        ledger: &mut HealthLedger,
    ) -> ExplosionReport {
        let def = self.catalog.resolve(weapon);
        info!(
            owner_id = %owner_id,
            weapon = %def.kind,
            x = point.x,
            y = point.y,
            radius = def.radius,
            "explosion"
        );

        // Collect targets first; damage mutates the ledger we are iterating.
        let targets: Vec<(PlayerId, Point)> = ledger
            .living_players()
            .map(|p| (p.id, p.position))
            .collect();

        let mut hits = Vec::new();
        let mut shielded = Vec::new();
        for (player_id, position) in targets {
            let distance = point.distance(position);
            if distance >= def.radius {
                continue;
            }
            if terrain.is_occluded(point, position) {
                debug!(player_id = %player_id, "protected by terrain");
                shielded.push(player_id);
                continue;
            }

            let damage = splash_damage(def.damage, def.radius, distance);
            if damage <= 0.0 {
                continue;
            }
            if let Some(report) = ledger.apply_damage(player_id, damage) {
                info!(
                    player_id = %player_id,
                    distance,
                    damage = report.amount,
                    health = report.health_after,
                    own_blast = player_id == owner_id,
                    "player hit"
                );
                hits.push(report);
            }
        }

        ExplosionReport {
            point,
            owner_id,
            weapon: def.kind,
            radius: def.radius,
            hits,
            shielded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::TeamId;
    use crate::domain::systems::terrain::Platform;
    use crate::use_cases::test_support::ledger_with_positions;

    fn id(s: &str) -> PlayerId {
        s.parse().expect("valid player id")
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn falloff_law_matches_reference_points() {
        assert!(approx(falloff_damage(100.0, 200.0, 0.0), 100.0));
        assert!(approx(falloff_damage(100.0, 200.0, 100.0), 62.5));
        assert!(approx(falloff_damage(100.0, 200.0, 200.0), 25.0));
    }

    #[test]
    fn splash_damage_is_zero_at_and_beyond_radius() {
        assert_eq!(splash_damage(100.0, 200.0, 200.0), 0.0);
        assert_eq!(splash_damage(100.0, 200.0, 350.0), 0.0);
        assert!(approx(splash_damage(15.0, 80.0, 40.0), 15.0 - 0.5 * 15.0 * 0.75));
    }

    #[test]
    fn detonation_damages_players_inside_radius() {
        let mut ledger = ledger_with_positions(&[
            ("A1", Point::new(0.0, 0.0)),
            ("B1", Point::new(100.0, 0.0)),
            ("B2", Point::new(500.0, 0.0)),
        ]);
        let engine = ExplosionEngine::default();
        let terrain = TerrainModel::new(Vec::new());

        let report = engine.detonate(
            Point::new(0.0, 0.0),
            id("A1"),
            WeaponKind::Bazooka,
            &terrain,
            &mut ledger,
        );

        let health = |s: &str| ledger.player(id(s)).map(|p| p.health).unwrap_or(-1.0);
        assert_eq!(health("A1"), 0.0, "shooter takes full epicenter damage");
        assert!(approx(health("B1"), 100.0 - 62.5));
        assert_eq!(health("B2"), 100.0);
        assert_eq!(report.hits.len(), 2);
        let eliminated: Vec<PlayerId> = report
            .hits
            .iter()
            .filter(|h| h.eliminated)
            .map(|h| h.player_id)
            .collect();
        assert_eq!(eliminated, vec![id("A1")]);
        assert_eq!(report.hits[0].team_eliminated, Some(TeamId(0)));
    }

    #[test]
    fn terrain_shields_players_regardless_of_side() {
        let platform = Platform::new(400.0, 575.0, 200.0, 50.0);
        let terrain = TerrainModel::new(vec![platform]);
        let engine = ExplosionEngine::default();

        // Blast above, player below.
        let mut ledger = ledger_with_positions(&[
            ("A1", Point::new(0.0, 0.0)),
            ("B1", Point::new(400.0, 650.0)),
        ]);
        let report = engine.detonate(
            Point::new(400.0, 500.0),
            id("A1"),
            WeaponKind::Bazooka,
            &terrain,
            &mut ledger,
        );
        assert_eq!(report.shielded, vec![id("B1")]);
        assert_eq!(ledger.player(id("B1")).map(|p| p.health), Some(100.0));

        // Blast below, player above.
        let mut ledger = ledger_with_positions(&[
            ("A1", Point::new(0.0, 0.0)),
            ("B1", Point::new(400.0, 500.0)),
        ]);
        let report = engine.detonate(
            Point::new(400.0, 650.0),
            id("A1"),
            WeaponKind::Bazooka,
            &terrain,
            &mut ledger,
        );
        assert_eq!(report.shielded, vec![id("B1")]);
        assert!(report.hits.is_empty());
    }

    #[test]
    fn owner_is_shielded_by_terrain_like_anyone_else() {
        let terrain = TerrainModel::new(vec![Platform::new(400.0, 575.0, 200.0, 50.0)]);
        let mut ledger = ledger_with_positions(&[
            ("A1", Point::new(400.0, 650.0)),
            ("B1", Point::new(1000.0, 0.0)),
        ]);

        let report = ExplosionEngine::default().detonate(
            Point::new(400.0, 500.0),
            id("A1"),
            WeaponKind::Bazooka,
            &terrain,
            &mut ledger,
        );
        assert_eq!(report.shielded, vec![id("A1")]);
    }

    #[test]
    fn dead_players_are_skipped() {
        let mut ledger = ledger_with_positions(&[
            ("A1", Point::new(0.0, 0.0)),
            ("B1", Point::new(10.0, 0.0)),
        ]);
        ledger.apply_damage(id("B1"), 100.0);

        let report = ExplosionEngine::default().detonate(
            Point::new(5.0, 0.0),
            id("A1"),
            WeaponKind::Grenade,
            &TerrainModel::new(Vec::new()),
            &mut ledger,
        );
        let hit: Vec<_> = report.hits.iter().map(|h| h.player_id).collect();
        assert_eq!(hit, vec![id("A1")]);
        assert!(ledger.is_team_eliminated(TeamId(1)));
    }

    #[test]
    fn unknown_weapon_uses_default_stats() {
        let bazooka_only = WeaponCatalog::new(
            vec![WeaponCatalog::default().resolve(WeaponKind::Bazooka).clone()],
            WeaponKind::Bazooka,
        )
        .expect("catalog should build");
        let engine = ExplosionEngine::new(bazooka_only);
        let mut ledger = ledger_with_positions(&[
            ("A1", Point::new(0.0, 0.0)),
            ("B1", Point::new(150.0, 0.0)),
        ]);

        let report = engine.detonate(
            Point::new(0.0, 0.0),
            id("A1"),
            WeaponKind::Uzi,
            &TerrainModel::new(Vec::new()),
            &mut ledger,
        );
        assert_eq!(report.weapon, WeaponKind::Bazooka);
        assert_eq!(report.radius, 200.0);
        assert_eq!(report.hits.len(), 2);
    }
}

// Match setup file format (JSON) and its conversion into a `MatchSetup`.

use crate::domain::errors::SetupError;
use crate::domain::state::Point;
use crate::domain::systems::Platform;
use crate::domain::tuning::maps;
use crate::domain::tuning::weapon::{DetonationPolicy, WeaponCatalog, WeaponDefinition, WeaponKind};
use crate::use_cases::{MatchSetup, TeamSetup};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct MatchSetupDto {
    pub teams: Vec<TeamSetupDto>,
    // Built-in map id; ignored when `platforms` is given.
    #[serde(default)]
    pub map: Option<String>,
    #[serde(default)]
    pub platforms: Option<Vec<PlatformDto>>,
    // Per-weapon overrides on top of the built-in catalog.
    #[serde(default)]
    pub weapons: Vec<WeaponOverrideDto>,
    #[serde(default)]
    pub default_weapon: Option<String>,
    #[serde(default)]
    pub spawn_points: Option<Vec<PointDto>>,
    #[serde(default)]
    pub turn_time: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamSetupDto {
    pub name: String,
    pub player_count: usize,
}

/// Platform rectangle; `x`/`y` is the center.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlatformDto {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointDto {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeaponOverrideDto {
    pub kind: String,
    #[serde(default)]
    pub damage: Option<f32>,
    #[serde(default)]
    pub radius: Option<f32>,
    // Turns the weapon into a timed one with this fuse.
    #[serde(default)]
    pub fuse_seconds: Option<f32>,
}

impl TryFrom<MatchSetupDto> for MatchSetup {
    type Error = SetupError;

    fn try_from(dto: MatchSetupDto) -> Result<Self, Self::Error> {
        let teams = dto
            .teams
            .into_iter()
            .map(|t| TeamSetup::new(t.name, t.player_count))
            .collect();
        let mut setup = MatchSetup::new(teams);

        setup.platforms = Some(match dto.platforms {
            Some(platforms) => platforms
                .into_iter()
                .map(|p| Platform::new(p.x, p.y, p.width, p.height))
                .collect(),
            None => maps::map_by_id(dto.map.as_deref().unwrap_or(maps::DEFAULT_MAP_ID)).platforms,
        });
        setup.spawn_points = dto
            .spawn_points
            .map(|points| points.into_iter().map(|p| Point::new(p.x, p.y)).collect());
        if let Some(turn_time) = dto.turn_time {
            if !(turn_time.is_finite() && turn_time > 0.0) {
                return Err(SetupError::Config(format!("turn_time must be positive, got {turn_time}")));
            }
            setup.turn.turn_time = turn_time;
        }
        setup.catalog = build_catalog(&dto.weapons, dto.default_weapon.as_deref())?;
        Ok(setup)
    }
}

fn build_catalog(
    overrides: &[WeaponOverrideDto],
    default_weapon: Option<&str>,
) -> Result<WeaponCatalog, SetupError> {
    let base = WeaponCatalog::default();
    let mut definitions: Vec<WeaponDefinition> = base.iter().cloned().collect();

    for o in overrides {
        let kind: WeaponKind = o
            .kind
            .parse()
            .map_err(|e| SetupError::Config(format!("{e}")))?;
        let Some(def) = definitions.iter_mut().find(|d| d.kind == kind) else {
            continue;
        };
        if let Some(damage) = o.damage {
            def.damage = damage;
        }
        if let Some(radius) = o.radius {
            def.radius = radius;
        }
        if let Some(fuse_seconds) = o.fuse_seconds {
            def.policy = DetonationPolicy::Timed { fuse_seconds };
        }
    }

    let default_weapon = match default_weapon {
        Some(raw) => raw
            .parse()
            .map_err(|e| SetupError::Config(format!("{e}")))?,
        None => base.default_weapon(),
    };
    WeaponCatalog::new(definitions, default_weapon)
}

pub fn parse_setup(json: &str) -> Result<MatchSetup, SetupError> {
    let dto: MatchSetupDto = serde_json::from_str(json)
        .map_err(|e| SetupError::Config(format!("malformed match setup: {e}")))?;
    dto.try_into()
}

pub fn load_setup_file(path: &Path) -> Result<MatchSetup, SetupError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| SetupError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_setup(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_setup_uses_classic_map_and_builtin_weapons() {
        let setup = parse_setup(r#"{"teams":[{"name":"Red","player_count":2},{"name":"Blue","player_count":1}]}"#)
            .expect("valid setup");

        assert_eq!(setup.teams.len(), 2);
        assert_eq!(setup.platforms.as_ref().map(Vec::len), Some(3));
        assert_eq!(setup.catalog.iter().count(), 7);
        assert_eq!(setup.catalog.default_weapon(), WeaponKind::Bazooka);
    }

    #[test]
    fn overrides_apply_on_top_of_builtins() {
        let setup = parse_setup(
            r#"{
                "teams": [{"name": "Red", "player_count": 1}, {"name": "Blue", "player_count": 1}],
                "map": "mountain",
                "weapons": [{"kind": "bazooka", "damage": 50, "fuse_seconds": 2.0}],
                "default_weapon": "UZI",
                "turn_time": 10
            }"#,
        )
        .expect("valid setup");

        let bazooka = setup.catalog.resolve(WeaponKind::Bazooka);
        assert_eq!(bazooka.damage, 50.0);
        assert_eq!(bazooka.policy, DetonationPolicy::Timed { fuse_seconds: 2.0 });
        assert_eq!(setup.catalog.default_weapon(), WeaponKind::Uzi);
        assert_eq!(setup.platforms.as_ref().map(Vec::len), Some(5));
        assert_eq!(setup.turn.turn_time, 10.0);
    }

    #[test]
    fn invalid_files_are_config_errors() {
        assert!(matches!(parse_setup("{"), Err(SetupError::Config(_))));
        assert!(matches!(
            parse_setup(r#"{"teams":[],"weapons":[{"kind":"railgun"}]}"#),
            Err(SetupError::Config(_))
        ));
        assert!(matches!(
            parse_setup(r#"{"teams":[],"weapons":[{"kind":"grenade","radius":0}]}"#),
            Err(SetupError::InvalidWeapon { .. })
        ));
        assert!(matches!(
            load_setup_file(Path::new("/nonexistent/match.json")),
            Err(SetupError::Config(_))
        ));
    }
}

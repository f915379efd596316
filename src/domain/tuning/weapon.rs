// Weapon catalog: damage, blast radius and detonation policy per weapon.
// The catalog is read-only for the lifetime of a match.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{CombatError, SetupError};

/// Fuse used by grenade-class weapons when nothing else is configured.
pub const DEFAULT_FUSE_SECONDS: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WeaponKind {
    Bazooka,
    Grenade,
    HomingMissile,
    Shotgun,
    Uzi,
    PineappleBomb,
    MangoBomb,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 7] = [
        WeaponKind::Bazooka,
        WeaponKind::Grenade,
        WeaponKind::HomingMissile,
        WeaponKind::Shotgun,
        WeaponKind::Uzi,
        WeaponKind::PineappleBomb,
        WeaponKind::MangoBomb,
    ];

    /// Stable key used by input and config files.
    pub fn key(self) -> &'static str {
        match self {
            WeaponKind::Bazooka => "BAZOOKA",
            WeaponKind::Grenade => "GRENADE",
            WeaponKind::HomingMissile => "HOMING_MISSILE",
            WeaponKind::Shotgun => "SHOTGUN",
            WeaponKind::Uzi => "UZI",
            WeaponKind::PineappleBomb => "PINEAPPLE_BOMB",
            WeaponKind::MangoBomb => "MANGO_BOMB",
        }
    }
}

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for WeaponKind {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        WeaponKind::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CombatError::UnknownWeaponType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetonationPolicy {
    /// Explodes on the first collision with any other body.
    Instant,
    /// Ignores collisions and explodes once the fuse runs out.
    Timed { fuse_seconds: f32 },
}

/// Weapon-specific extras. Flight behaviour itself belongs to the physics provider.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeaponParams {
    pub bounce_factor: Option<f32>,
    pub homing_strength: Option<f32>,
    pub pellets: Option<u32>,
    pub fire_rate_ms: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponDefinition {
    pub kind: WeaponKind,
    pub name: String,
    pub description: String,
    /// Damage at the epicenter.
    pub damage: f32,
    /// Blast radius in world units.
    pub radius: f32,
    pub policy: DetonationPolicy,
    pub params: WeaponParams,
}

impl WeaponDefinition {
    fn builtin(
        kind: WeaponKind,
        name: &str,
        damage: f32,
        radius: f32,
        description: &str,
    ) -> Self {
        Self {
            kind,
            name: name.to_string(),
            description: description.to_string(),
            damage,
            radius,
            policy: DetonationPolicy::Instant,
            params: WeaponParams::default(),
        }
    }

    fn timed(mut self, fuse_seconds: f32) -> Self {
        self.policy = DetonationPolicy::Timed { fuse_seconds };
        self
    }

    fn with_params(mut self, params: WeaponParams) -> Self {
        self.params = params;
        self
    }

    fn validate(&self) -> Result<(), SetupError> {
        let invalid = |reason| SetupError::InvalidWeapon {
            weapon: self.kind.key().to_string(),
            reason,
        };
        if !(self.damage.is_finite() && self.damage >= 0.0) {
            return Err(invalid("damage must be a non-negative number"));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(invalid("radius must be positive"));
        }
        if let DetonationPolicy::Timed { fuse_seconds } = self.policy {
            if !(fuse_seconds.is_finite() && fuse_seconds > 0.0) {
                return Err(invalid("fuse must be positive"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WeaponCatalog {
    definitions: HashMap<WeaponKind, WeaponDefinition>,
    default_weapon: WeaponKind,
}

impl WeaponCatalog {
    pub fn new(
        definitions: Vec<WeaponDefinition>,
        default_weapon: WeaponKind,
    ) -> Result<Self, SetupError> {
        if definitions.is_empty() {
            return Err(SetupError::EmptyWeaponCatalog);
        }
        for def in &definitions {
            def.validate()?;
        }
        let definitions: HashMap<_, _> = definitions.into_iter().map(|d| (d.kind, d)).collect();
        if !definitions.contains_key(&default_weapon) {
            return Err(SetupError::MissingDefaultWeapon(default_weapon.key().to_string()));
        }
        Ok(Self {
            definitions,
            default_weapon,
        })
    }

    pub fn default_weapon(&self) -> WeaponKind {
        self.default_weapon
    }

    pub fn contains(&self, kind: WeaponKind) -> bool {
        self.definitions.contains_key(&kind)
    }

    /// Looks up a weapon, substituting the default one when it is missing.
    pub fn resolve(&self, kind: WeaponKind) -> &WeaponDefinition {
        match self.definitions.get(&kind) {
            Some(def) => def,
            None => {
                tracing::warn!(
                    error = %CombatError::UnknownWeaponType(kind.key().to_string()),
                    fallback = %self.default_weapon,
                    "weapon missing from catalog; using default"
                );
                &self.definitions[&self.default_weapon]
            }
        }
    }

    /// Definitions in stable catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &WeaponDefinition> {
        WeaponKind::ALL
            .into_iter()
            .filter_map(|kind| self.definitions.get(&kind))
    }
}

impl Default for WeaponCatalog {
    fn default() -> Self {
        let bouncy = |bounce_factor| WeaponParams {
            bounce_factor: Some(bounce_factor),
            ..WeaponParams::default()
        };
        let definitions = vec![
            WeaponDefinition::builtin(
                WeaponKind::Bazooka,
                "Bazooka",
                100.0,
                200.0,
                "Powerful mid-range projectile with large blast radius",
            ),
            WeaponDefinition::builtin(
                WeaponKind::Grenade,
                "Grenade",
                15.0,
                80.0,
                "Bouncy explosive, unpredictable flight path",
            )
            .timed(DEFAULT_FUSE_SECONDS)
            .with_params(bouncy(0.8)),
            WeaponDefinition::builtin(
                WeaponKind::HomingMissile,
                "Homing Missile",
                35.0,
                40.0,
                "Smart missile that tracks enemies",
            )
            .with_params(WeaponParams {
                homing_strength: Some(0.5),
                ..WeaponParams::default()
            }),
            WeaponDefinition::builtin(
                WeaponKind::Shotgun,
                "Shotgun",
                12.0,
                35.0,
                "Close-range spread weapon",
            )
            .with_params(WeaponParams {
                pellets: Some(5),
                ..WeaponParams::default()
            }),
            WeaponDefinition::builtin(
                WeaponKind::Uzi,
                "UZI",
                8.0,
                25.0,
                "Rapid-fire automatic weapon",
            )
            .with_params(WeaponParams {
                fire_rate_ms: Some(150),
                ..WeaponParams::default()
            }),
            WeaponDefinition::builtin(
                WeaponKind::PineappleBomb,
                "Pineapple Bomb",
                20.0,
                70.0,
                "Explosive tropical fruit - chaotic and fun",
            )
            .timed(DEFAULT_FUSE_SECONDS)
            .with_params(bouncy(0.6)),
            WeaponDefinition::builtin(
                WeaponKind::MangoBomb,
                "Mango Bomb",
                18.0,
                75.0,
                "Juicy explosive - sticky and unpredictable",
            )
            .timed(DEFAULT_FUSE_SECONDS)
            .with_params(bouncy(0.7)),
        ];

        Self {
            definitions: definitions.into_iter().map(|d| (d.kind, d)).collect(),
            default_weapon: WeaponKind::Bazooka,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_contains_every_weapon() {
        let catalog = WeaponCatalog::default();
        for kind in WeaponKind::ALL {
            assert!(catalog.contains(kind), "{kind} missing");
        }
        assert_eq!(catalog.iter().count(), WeaponKind::ALL.len());
    }

    #[test]
    fn grenade_class_weapons_are_timed() {
        let catalog = WeaponCatalog::default();
        assert_eq!(
            catalog.resolve(WeaponKind::Grenade).policy,
            DetonationPolicy::Timed { fuse_seconds: 3.0 }
        );
        assert_eq!(
            catalog.resolve(WeaponKind::Bazooka).policy,
            DetonationPolicy::Instant
        );
    }

    #[test]
    fn resolve_falls_back_to_default_weapon() {
        let catalog = WeaponCatalog::new(
            vec![WeaponCatalog::default().resolve(WeaponKind::Bazooka).clone()],
            WeaponKind::Bazooka,
        )
        .expect("catalog should build");

        assert_eq!(catalog.resolve(WeaponKind::Uzi).kind, WeaponKind::Bazooka);
    }

    #[test]
    fn catalog_rejects_missing_default() {
        let uzi = WeaponCatalog::default().resolve(WeaponKind::Uzi).clone();
        let err = WeaponCatalog::new(vec![uzi], WeaponKind::Bazooka).unwrap_err();
        assert_eq!(err, SetupError::MissingDefaultWeapon("BAZOOKA".to_string()));
    }

    #[test]
    fn weapon_keys_parse_case_insensitively() {
        assert_eq!("grenade".parse::<WeaponKind>(), Ok(WeaponKind::Grenade));
        assert_eq!(
            "LASER".parse::<WeaponKind>(),
            Err(CombatError::UnknownWeaponType("LASER".to_string()))
        );
    }
}

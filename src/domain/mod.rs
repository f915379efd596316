// Domain layer: combat rules, entities and gameplay tuning.

pub mod errors;
pub mod state;
pub mod systems;
pub mod tuning;

pub use errors::{CombatError, SetupError};
pub use state::{
    Player, PlayerId, PlayerSnapshot, Point, ProjectileSnapshot, SimProjectile, Team, TeamId,
    TeamSnapshot,
};

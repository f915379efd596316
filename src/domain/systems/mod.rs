// Combat systems. Each one is a plain value owned by the match; none hold globals.

pub mod clock;
pub mod explosion;
pub mod health;
pub mod projectiles;
pub mod terrain;
pub mod turns;

pub use clock::{GameClock, MatchClock, MatchTask, TaskHandle};
pub use explosion::{ExplosionEngine, ExplosionReport};
pub use health::{DamageReport, HealthLedger, MatchOutcome};
pub use projectiles::{BodyRef, DetonationTrigger, ProjectileSystem, Resolution};
pub use terrain::{Platform, TerrainModel};
pub use turns::{TurnPhase, TurnScheduler, TurnState};

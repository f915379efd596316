// Use cases layer: match orchestration and the async match loop.

pub mod combat;
pub mod game;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use combat::{Match, MatchSetup, TeamSetup};
pub use session::{MatchHandle, SessionSettings};
pub use types::{CombatEvent, MatchEvent, MatchPhase, MatchSnapshot, MatchUpdate};

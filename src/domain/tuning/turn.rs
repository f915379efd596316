/// Gameplay tuning for turn flow.
///
/// Keep this separate from runtime configuration (tick rates, buffer sizes, etc.).

#[derive(Debug, Clone, Copy)]
pub struct TurnTuning {
    /// Seconds a player gets to act before the turn is forfeited.
    pub turn_time: f32,

    /// Pause between a projectile resolving and the next turn starting.
    pub grace_delay: f32,
}

impl Default for TurnTuning {
    fn default() -> Self {
        Self {
            turn_time: 30.0,
            grace_delay: 0.5,
        }
    }
}

/// Gameplay tuning for team rosters.

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Health every player starts with; also the upper clamp.
    pub max_health: f32,

    /// Largest allowed team.
    pub max_team_size: usize,

    /// Horizontal gap between default spawn points.
    pub spawn_spacing: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_team_size: 3,
            spawn_spacing: 50.0,
        }
    }
}

/// Gameplay tuning for projectiles.

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Launch speed handed to the physics provider (world units per step).
    pub launch_speed: f32,

    /// Distance from the shooter at which the projectile spawns, so it does not
    /// collide with the shooter's own body.
    pub spawn_offset: f32,

    /// How far an instant detonation steps back along the velocity so the blast
    /// sits outside the platform the projectile buried into.
    pub surface_offset: f32,

    /// Seconds before an unresolved projectile is forcibly resolved.
    pub safety_timeout: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            launch_speed: 25.0,
            spawn_offset: 45.0,
            surface_offset: 50.0,
            safety_timeout: 5.0,
        }
    }
}

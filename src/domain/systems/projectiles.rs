use tracing::{debug, info, warn};

use crate::domain::errors::CombatError;
use crate::domain::state::{Player, PlayerId, Point, ProjectileSnapshot, SimProjectile};
use crate::domain::systems::clock::{MatchClock, MatchTask, TaskHandle};
use crate::domain::tuning::projectile::ProjectileTuning;
use crate::domain::tuning::weapon::{DetonationPolicy, WeaponDefinition, WeaponKind};

/// Body identifiers the physics provider reports collisions and positions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRef {
    Projectile(u64),
    Player(PlayerId),
    Terrain,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetonationTrigger {
    Collision,
    Fuse,
    SafetyTimeout,
}

/// How an in-flight projectile ended. Each projectile resolves exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Detonated {
        projectile_id: u64,
        owner_id: PlayerId,
        weapon: WeaponKind,
        point: Point,
        trigger: DetonationTrigger,
    },
    /// Removed without exploding (an instant shot that never hit anything).
    Discarded { projectile_id: u64, owner_id: PlayerId },
}

#[derive(Debug)]
struct InFlight {
    projectile: SimProjectile,
    fuse_task: Option<TaskHandle>,
    timeout_task: TaskHandle,
}

/// Launches projectiles and decides when they detonate.
///
/// At most one projectile is in flight at a time; the turn scheduler's lock
/// enforces the same thing from the other side.
#[derive(Debug)]
pub struct ProjectileSystem {
    tuning: ProjectileTuning,
    in_flight: Option<InFlight>,
    next_projectile_id: u64,
}

impl ProjectileSystem {
    pub fn new(tuning: ProjectileTuning) -> Self {
        Self {
            tuning,
            in_flight: None,
            next_projectile_id: 1,
        }
    }

    pub fn in_flight(&self) -> Option<&SimProjectile> {
        self.in_flight.as_ref().map(|f| &f.projectile)
    }

    /// Spawns a projectile aimed from the shooter at `target`.
    pub fn launch(
        &mut self,
        shooter: &Player,
        target: Point,
        weapon: &WeaponDefinition,
        clock: &mut MatchClock,
    ) -> Result<&SimProjectile, CombatError> {
        if self.in_flight.is_some() {
            return Err(CombatError::ProjectileInFlight);
        }

        let angle = (target.y - shooter.position.y).atan2(target.x - shooter.position.x);
        let (dir_x, dir_y) = (angle.cos(), angle.sin());

        let id = self.next_projectile_id;
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);

        let projectile = SimProjectile {
            id,
            owner_id: shooter.id,
            weapon: weapon.kind,
            policy: weapon.policy,
            // Spawn clear of the shooter's own body.
            position: Point::new(
                shooter.position.x + dir_x * self.tuning.spawn_offset,
                shooter.position.y + dir_y * self.tuning.spawn_offset,
            ),
            velocity: Point::new(dir_x * self.tuning.launch_speed, dir_y * self.tuning.launch_speed),
            bounces: 0,
        };

        let fuse_task = match weapon.policy {
            DetonationPolicy::Timed { fuse_seconds } => Some(
                clock.schedule(fuse_seconds, MatchTask::Fuse { projectile_id: id }),
            ),
            DetonationPolicy::Instant => None,
        };
        let timeout_task = clock.schedule(
            self.tuning.safety_timeout,
            MatchTask::SafetyTimeout { projectile_id: id },
        );

        info!(
            projectile_id = id,
            owner_id = %shooter.id,
            weapon = %weapon.kind,
            angle,
            timed = fuse_task.is_some(),
            "projectile launched"
        );

        let flight = self.in_flight.insert(InFlight {
            projectile,
            fuse_task,
            timeout_task,
        });
        Ok(&flight.projectile)
    }

    /// Physics provider reports the latest body state.
    pub fn update_body(&mut self, projectile_id: u64, position: Point, velocity: Point) -> bool {
        match self.in_flight.as_mut() {
            Some(flight) if flight.projectile.id == projectile_id => {
                flight.projectile.position = position;
                flight.projectile.velocity = velocity;
                true
            }
            _ => false,
        }
    }

    /// Physics provider reports a collision between the projectile and `other`.
    pub fn on_collision(
        &mut self,
        projectile_id: u64,
        other: BodyRef,
        clock: &mut MatchClock,
    ) -> Option<Resolution> {
        if other == BodyRef::Projectile(projectile_id) {
            return None;
        }
        let flight = self.in_flight.as_mut()?;
        if flight.projectile.id != projectile_id {
            debug!(projectile_id, "collision for stale projectile ignored");
            return None;
        }

        let policy = flight.projectile.policy;
        match policy {
            DetonationPolicy::Timed { .. } => {
                flight.projectile.bounces += 1;
                debug!(
                    projectile_id,
                    bounces = flight.projectile.bounces,
                    ?other,
                    "timed projectile bounced"
                );
                None
            }
            DetonationPolicy::Instant => {
                let projectile = self.finish(clock)?;
                let point = surface_point(
                    projectile.position,
                    projectile.velocity,
                    self.tuning.surface_offset,
                );
                debug!(projectile_id, ?other, "projectile collided");
                Some(Resolution::Detonated {
                    projectile_id,
                    owner_id: projectile.owner_id,
                    weapon: projectile.weapon,
                    point,
                    trigger: DetonationTrigger::Collision,
                })
            }
        }
    }

    /// Handles a due clock task. Tasks for other projectiles (or `NextTurn`) are ignored.
    pub fn on_task(&mut self, task: MatchTask, clock: &mut MatchClock) -> Option<Resolution> {
        let (projectile_id, trigger) = match task {
            MatchTask::Fuse { projectile_id } => (projectile_id, DetonationTrigger::Fuse),
            MatchTask::SafetyTimeout { projectile_id } => {
                (projectile_id, DetonationTrigger::SafetyTimeout)
            }
            MatchTask::NextTurn => return None,
        };
        if self.in_flight()?.id != projectile_id {
            return None;
        }

        let projectile = self.finish(clock)?;
        match (trigger, projectile.policy) {
            (DetonationTrigger::SafetyTimeout, DetonationPolicy::Instant) => {
                warn!(projectile_id, "projectile never collided; discarding");
                Some(Resolution::Discarded {
                    projectile_id,
                    owner_id: projectile.owner_id,
                })
            }
            _ => {
                info!(projectile_id, ?trigger, bounces = projectile.bounces, "timed detonation");
                Some(Resolution::Detonated {
                    projectile_id,
                    owner_id: projectile.owner_id,
                    weapon: projectile.weapon,
                    point: projectile.position,
                    trigger,
                })
            }
        }
    }

    /// Removes the in-flight projectile without exploding it.
    pub fn discard(&mut self, clock: &mut MatchClock) -> Option<Resolution> {
        let projectile = self.finish(clock)?;
        info!(projectile_id = projectile.id, "projectile discarded");
        Some(Resolution::Discarded {
            projectile_id: projectile.id,
            owner_id: projectile.owner_id,
        })
    }

    pub fn snapshots(&self, clock: &MatchClock) -> Vec<ProjectileSnapshot> {
        self.in_flight
            .iter()
            .map(|flight| ProjectileSnapshot {
                id: flight.projectile.id,
                owner_id: flight.projectile.owner_id,
                weapon: flight.projectile.weapon,
                x: flight.projectile.position.x,
                y: flight.projectile.position.y,
                fuse_remaining: flight.fuse_task.and_then(|h| clock.remaining(h)),
            })
            .collect()
    }

    // Takes the projectile out of flight and clears every registration it holds.
    fn finish(&mut self, clock: &mut MatchClock) -> Option<SimProjectile> {
        let flight = self.in_flight.take()?;
        if let Some(fuse) = flight.fuse_task {
            clock.cancel(fuse);
        }
        clock.cancel(flight.timeout_task);
        Some(flight.projectile)
    }
}

/// Steps `position` back along the travel direction so the blast sits on the surface.
pub fn surface_point(position: Point, velocity: Point, offset: f32) -> Point {
    let speed = velocity.length();
    if speed > 0.0 {
        Point::new(
            position.x - velocity.x / speed * offset,
            position.y - velocity.y / speed * offset,
        )
    } else {
        position
    }
}

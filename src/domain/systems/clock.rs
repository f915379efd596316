// Single game clock for delayed callbacks (fuses, safety timeouts, turn hand-off).
//
// Tasks are plain values; the owner drains due tasks inside its tick, so every
// callback runs on the same thread as the rest of the simulation.

/// Handle returned by [`GameClock::schedule`]; hold it to cancel the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Scheduled<T> {
    handle: TaskHandle,
    due: f64,
    task: T,
}

#[derive(Debug)]
pub struct GameClock<T> {
    now: f64,
    next_handle: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for GameClock<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GameClock<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_handle: 1,
            pending: Vec::new(),
        }
    }

    /// Registers a one-shot task that becomes due `delay` seconds from now.
    pub fn schedule(&mut self, delay: f32, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Scheduled {
            handle,
            due: self.now + f64::from(delay.max(0.0)),
            task,
        });
        handle
    }

    /// Cancels a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.handle != handle);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|s| s.handle == handle)
    }

    /// Seconds until the task fires, if it is still pending.
    pub fn remaining(&self, handle: TaskHandle) -> Option<f32> {
        self.pending
            .iter()
            .find(|s| s.handle == handle)
            .map(|s| (s.due - self.now).max(0.0) as f32)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Moves time forward and returns every task that became due, earliest first.
    /// Tasks due at the same instant keep their scheduling order.
    pub fn advance(&mut self, dt: f32) -> Vec<(TaskHandle, T)> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.now += f64::from(dt);
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = pending;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.handle.0.cmp(&b.handle.0)));
        due.into_iter().map(|s| (s.handle, s.task)).collect()
    }
}

/// Delayed callbacks a match registers on its clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTask {
    /// Timed weapon fuse ran out.
    Fuse { projectile_id: u64 },
    /// Projectile took too long to resolve.
    SafetyTimeout { projectile_id: u64 },
    /// Grace delay after a detonation elapsed; hand the turn over.
    NextTurn,
}

pub type MatchClock = GameClock<MatchTask>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_fire_once_when_due() {
        let mut clock = GameClock::new();
        clock.schedule(1.0, "fuse");

        assert!(clock.advance(0.5).is_empty());
        let fired: Vec<_> = clock.advance(0.5).into_iter().map(|(_, t)| t).collect();
        assert_eq!(fired, vec!["fuse"]);
        assert!(clock.advance(10.0).is_empty());
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut clock = GameClock::new();
        let handle = clock.schedule(1.0, "timeout");

        assert!(clock.cancel(handle));
        assert!(!clock.cancel(handle));
        assert!(clock.advance(5.0).is_empty());
    }

    #[test]
    fn due_tasks_come_back_in_deadline_order() {
        let mut clock = GameClock::new();
        clock.schedule(3.0, "late");
        clock.schedule(1.0, "early");
        clock.schedule(1.0, "early-second");

        let fired: Vec<_> = clock.advance(5.0).into_iter().map(|(_, t)| t).collect();
        assert_eq!(fired, vec!["early", "early-second", "late"]);
    }

    #[test]
    fn negative_and_non_finite_steps_do_not_move_time() {
        let mut clock = GameClock::new();
        let handle = clock.schedule(1.0, "fuse");

        assert!(clock.advance(-3.0).is_empty());
        assert!(clock.advance(f32::NAN).is_empty());
        assert!(clock.advance(f32::INFINITY).is_empty());
        assert_eq!(clock.remaining(handle), Some(1.0));
    }

    #[test]
    fn remaining_tracks_elapsed_time() {
        let mut clock = GameClock::new();
        let handle = clock.schedule(3.0, ());
        clock.advance(1.0);

        assert_eq!(clock.remaining(handle), Some(2.0));
        clock.advance(2.0);
        assert_eq!(clock.remaining(handle), None);
        assert!(!clock.is_pending(handle));
    }
}

//! Time sources for progression.
//!
//! The engine never sleeps or spawns on its own. The host provides a [`Scheduler`] that runs the
//! periodic tick and the one-shot reel timers.

use std::time::Duration;

/// Work run once.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Work run on every tick.
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

pub trait Scheduler: Send + Sync {
    /// Run `task` on every host tick until the scheduler shuts down.
    fn every_tick(&self, task: RepeatingTask);

    /// Run `task` once after `delay`.
    fn once_after(&self, delay: Duration, task: Task);
}

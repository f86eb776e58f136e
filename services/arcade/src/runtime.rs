//! Tokio-backed scheduler and event fan-out.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};
use wagerhall_execution::{EventSink, GameEvent, RepeatingTask, Scheduler, Task};

/// Runs engine ticks on a `tokio::time::interval` and reel timers as sleeping tasks.
pub struct TokioScheduler {
    handle: Handle,
    tick: Duration,
}

impl TokioScheduler {
    pub fn new(handle: Handle, tick: Duration) -> Self {
        Self { handle, tick }
    }
}

impl Scheduler for TokioScheduler {
    fn every_tick(&self, mut task: RepeatingTask) {
        let period = self.tick;
        self.handle.spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                task();
            }
        });
    }

    fn once_after(&self, delay: Duration, task: Task) {
        self.handle.spawn(async move {
            time::sleep(delay).await;
            task();
        });
    }
}

/// Publishes engine events on a broadcast channel. Events without subscribers are dropped.
pub struct BroadcastSink {
    sender: broadcast::Sender<GameEvent>,
}

impl BroadcastSink {
    pub fn new(sender: broadcast::Sender<GameEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, event: GameEvent) {
        let _ = self.sender.send(event);
    }
}

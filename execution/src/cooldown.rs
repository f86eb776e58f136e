//! Per-player wager cooldowns.

use std::time::{Duration, Instant};

use dashmap::{mapref::entry::Entry, DashMap};
use wagerhall_types::PlayerId;

/// Result of [`CooldownTracker::try_acquire`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acquire {
    /// The wager may proceed. The stamp identifies this acquisition for [`CooldownTracker::release`].
    Granted(Instant),
    /// The previous wager is too recent.
    Denied { remaining_secs: u64 },
}

/// Identity -> timestamp of the last accepted wager.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    records: DashMap<PlayerId, Instant>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and record the cooldown for `player` in one step.
    ///
    /// Remaining time is rounded down to whole seconds. A zero `window` always grants.
    pub fn try_acquire(&self, player: &PlayerId, now: Instant, window: Duration) -> Acquire {
        if window.is_zero() {
            return Acquire::Granted(now);
        }
        match self.records.entry(player.clone()) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.saturating_duration_since(*entry.get());
                if elapsed < window {
                    return Acquire::Denied {
                        remaining_secs: (window - elapsed).as_secs(),
                    };
                }
                entry.insert(now);
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
            }
        }
        Acquire::Granted(now)
    }

    /// Undo an acquisition whose command failed afterwards.
    ///
    /// Only removes the record when it is still the one written by that acquisition.
    pub fn release(&self, player: &PlayerId, stamp: Instant) {
        self.records.remove_if(player, |_, recorded| *recorded == stamp);
    }

    pub fn last_accepted(&self, player: &PlayerId) -> Option<Instant> {
        self.records.get(player).map(|entry| *entry.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(10);

    #[test]
    fn test_immediate_reacquire_is_denied() {
        let tracker = CooldownTracker::new();
        let player = PlayerId::from("alice");
        let start = Instant::now();

        assert_eq!(
            tracker.try_acquire(&player, start, WINDOW),
            Acquire::Granted(start)
        );
        assert_eq!(
            tracker.try_acquire(&player, start, WINDOW),
            Acquire::Denied { remaining_secs: 10 }
        );

        // 2.5s later: 7.5s remain, reported as 7.
        let later = start + Duration::from_millis(2_500);
        assert_eq!(
            tracker.try_acquire(&player, later, WINDOW),
            Acquire::Denied { remaining_secs: 7 }
        );
        assert_eq!(tracker.last_accepted(&player), Some(start));
    }

    #[test]
    fn test_allowed_after_window() {
        let tracker = CooldownTracker::new();
        let player = PlayerId::from("alice");
        let start = Instant::now();
        tracker.try_acquire(&player, start, WINDOW);

        let after = start + WINDOW;
        assert_eq!(
            tracker.try_acquire(&player, after, WINDOW),
            Acquire::Granted(after)
        );
        assert_eq!(tracker.last_accepted(&player), Some(after));
    }

    #[test]
    fn test_players_are_independent() {
        let tracker = CooldownTracker::new();
        let now = Instant::now();
        tracker.try_acquire(&PlayerId::from("alice"), now, WINDOW);
        assert_eq!(
            tracker.try_acquire(&PlayerId::from("bob"), now, WINDOW),
            Acquire::Granted(now)
        );
    }

    #[test]
    fn test_zero_window_disables_gating() {
        let tracker = CooldownTracker::new();
        let player = PlayerId::from("alice");
        let now = Instant::now();
        for _ in 0..3 {
            assert_eq!(
                tracker.try_acquire(&player, now, Duration::ZERO),
                Acquire::Granted(now)
            );
        }
        assert_eq!(tracker.last_accepted(&player), None);
    }

    #[test]
    fn test_release_only_removes_own_stamp() {
        let tracker = CooldownTracker::new();
        let player = PlayerId::from("alice");
        let first = Instant::now();
        tracker.try_acquire(&player, first, WINDOW);

        let second = first + WINDOW;
        tracker.try_acquire(&player, second, WINDOW);

        // A stale release leaves the newer record in place.
        tracker.release(&player, first);
        assert_eq!(tracker.last_accepted(&player), Some(second));

        tracker.release(&player, second);
        assert_eq!(tracker.last_accepted(&player), None);
        assert_eq!(
            tracker.try_acquire(&player, second, WINDOW),
            Acquire::Granted(second)
        );
    }

    #[test]
    fn test_concurrent_acquire_grants_once() {
        let tracker = CooldownTracker::new();
        let player = PlayerId::from("alice");
        let now = Instant::now();

        let granted = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| tracker.try_acquire(&player, now, WINDOW)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("thread"))
                .filter(|result| matches!(result, Acquire::Granted(_)))
                .count()
        });
        assert_eq!(granted, 1);
    }
}

//! Deterministic stand-ins for the engine's collaborators.
//!
//! Available in tests and behind the `mocks` feature for downstream crates.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use wagerhall_types::{
    arcade::{RANKS_PER_SUIT, SUITS},
    Card, PlayerId,
};

use crate::events::{EventSink, GameEvent};
use crate::ledger::{CreditLedger, LedgerError, MemoryLedger};
use crate::payout::Settlement;
use crate::sampler::{total_weight, RandomSource, Weighted};
use crate::scheduler::{RepeatingTask, Scheduler, Task};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("mock mutex poisoned")
}

/// Random source that replays a fixed list of unit draws.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRng {
    draws: VecDeque<f64>,
}

impl ScriptedRng {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    pub fn push(&mut self, draw: f64) -> &mut Self {
        self.draws.push_back(draw);
        self
    }

    /// Queue the two draws that make [`crate::sampler::draw_card`] return `card`.
    pub fn push_card(&mut self, card: Card) -> &mut Self {
        self.push((card.rank() as f64 + 0.5) / RANKS_PER_SUIT as f64);
        self.push((card.suit() as f64 + 0.5) / SUITS as f64)
    }

    /// Queue a draw that selects bucket `index` from a weighted table.
    pub fn push_bucket<T: Weighted>(&mut self, buckets: &[T], index: usize) -> &mut Self {
        let before: f64 = buckets[..index].iter().map(Weighted::weight).sum();
        let midpoint = before + buckets[index].weight() / 2.0;
        self.push(midpoint / total_weight(buckets))
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRng {
    fn unit(&mut self) -> f64 {
        self.draws.pop_front().expect("scripted rng exhausted")
    }
}

struct Timer {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    seq: u64,
    repeating: Vec<RepeatingTask>,
    timers: Vec<Timer>,
}

/// Scheduler driven explicitly by the test.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Run every registered tick task once.
    pub fn tick(&self) {
        let mut tasks = std::mem::take(&mut lock(&self.state).repeating);
        for task in tasks.iter_mut() {
            task();
        }
        let mut state = lock(&self.state);
        tasks.append(&mut state.repeating);
        state.repeating = tasks;
    }

    /// Move time forward, firing due timers in deadline order.
    pub fn advance(&self, by: Duration) {
        let target = lock(&self.state).now + by;
        loop {
            let next = {
                let mut state = lock(&self.state);
                let position = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.seq))
                    .map(|(position, _)| position);
                position.map(|position| {
                    let timer = state.timers.remove(position);
                    state.now = timer.due;
                    timer.task
                })
            };
            match next {
                Some(task) => task(),
                None => break,
            }
        }
        lock(&self.state).now = target;
    }

    pub fn pending_timers(&self) -> usize {
        lock(&self.state).timers.len()
    }

    pub fn tick_tasks(&self) -> usize {
        lock(&self.state).repeating.len()
    }
}

impl Scheduler for ManualScheduler {
    fn every_tick(&self, task: RepeatingTask) {
        lock(&self.state).repeating.push(task);
    }

    fn once_after(&self, delay: Duration, task: Task) {
        let mut state = lock(&self.state);
        let due = state.now + delay;
        state.seq += 1;
        let seq = state.seq;
        state.timers.push(Timer { due, seq, task });
    }
}

/// Event sink that keeps everything it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<GameEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<GameEvent> {
        lock(&self.events).clone()
    }

    pub fn settlements(&self) -> Vec<Settlement> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                GameEvent::Settled(settlement) => Some(settlement.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: GameEvent) {
        lock(&self.events).push(event);
    }
}

/// Memory ledger with switchable failures and call counters.
pub struct FlakyLedger {
    inner: MemoryLedger,
    fail_balance: AtomicBool,
    fail_debits: AtomicBool,
    fail_credits: AtomicBool,
    debit_calls: AtomicUsize,
    credit_calls: AtomicUsize,
}

impl FlakyLedger {
    pub fn new(opening_balance: u64) -> Self {
        Self {
            inner: MemoryLedger::new(opening_balance),
            fail_balance: AtomicBool::new(false),
            fail_debits: AtomicBool::new(false),
            fail_credits: AtomicBool::new(false),
            debit_calls: AtomicUsize::new(0),
            credit_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_balance(&self, player: &PlayerId, balance: u64) {
        self.inner.set_balance(player, balance);
    }

    pub fn fail_balance(&self, fail: bool) {
        self.fail_balance.store(fail, Ordering::SeqCst);
    }

    pub fn fail_debits(&self, fail: bool) {
        self.fail_debits.store(fail, Ordering::SeqCst);
    }

    pub fn fail_credits(&self, fail: bool) {
        self.fail_credits.store(fail, Ordering::SeqCst);
    }

    pub fn debit_calls(&self) -> usize {
        self.debit_calls.load(Ordering::SeqCst)
    }

    pub fn credit_calls(&self) -> usize {
        self.credit_calls.load(Ordering::SeqCst)
    }
}

impl CreditLedger for FlakyLedger {
    fn balance(&self, player: &PlayerId) -> Result<u64, LedgerError> {
        if self.fail_balance.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("balance lookup failed".into()));
        }
        self.inner.balance(player)
    }

    fn adjust(&self, player: &PlayerId, delta: i64) -> Result<(), LedgerError> {
        let (calls, fail) = if delta < 0 {
            (&self.debit_calls, &self.fail_debits)
        } else {
            (&self.credit_calls, &self.fail_credits)
        };
        calls.fetch_add(1, Ordering::SeqCst);
        if fail.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("injected ledger failure".into()));
        }
        self.inner.adjust(player, delta)
    }
}

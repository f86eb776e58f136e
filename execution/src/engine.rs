//! Command surface of the wagering engine.
//!
//! A wager goes through the same steps for every game:
//!
//! 1. bounds (and the crash target) are validated,
//! 2. the ledger balance is checked,
//! 3. the game's cooldown is acquired,
//! 4. the wager is debited,
//! 5. the session is created.
//!
//! Failures after step 3 release the cooldown; losing the creation race after step 4 refunds
//! the debit. From then on the session is driven by the periodic tick (crash, slot display),
//! one-shot reel timers (slot) or player guesses (hi-lo). The step that reaches a terminal state
//! marks the session resolved and takes it out of the store under its entry lock, then settles
//! it with no lock held.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use wagerhall_types::{
    arcade::{format_multiplier, multiplier_to_bps, ArcadeConfig, ConfigError, WagerBounds},
    Card, GameType, PlayerId,
};

use crate::casino::{
    Advance, Context, CrashRound, Event, GameError, GameState, Guess, HiLoRun, SlotSpin,
};
use crate::cooldown::{Acquire, CooldownTracker};
use crate::error::{ValidationError, WagerError};
use crate::events::{EventSink, GameEvent};
use crate::ledger::CreditLedger;
use crate::payout::{PayoutResolver, Settlement};
use crate::sampler::{draw_card, sample_crash_point, sample_symbol, RandomSource};
use crate::scheduler::Scheduler;
use crate::session::{Session, SessionId};
use crate::store::SessionStore;

/// Result of a hi-lo guess.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct {
        drawn: Card,
        streak: u32,
        multiplier: u64,
    },
    Busted {
        drawn: Card,
        settlement: Settlement,
    },
}

pub struct WagerEngine {
    config: Arc<ArcadeConfig>,
    ledger: Arc<dyn CreditLedger>,
    scheduler: Arc<dyn Scheduler>,
    events: Arc<dyn EventSink>,
    rng: Mutex<Box<dyn RandomSource>>,
    sessions: SessionStore,
    crash_cooldowns: CooldownTracker,
    slot_cooldowns: CooldownTracker,
    hilo_cooldowns: CooldownTracker,
    resolver: PayoutResolver,
}

impl WagerEngine {
    /// Build an engine from a raw configuration. Wager bounds are normalized and every table is
    /// validated first.
    pub fn new(
        config: ArcadeConfig,
        ledger: Arc<dyn CreditLedger>,
        scheduler: Arc<dyn Scheduler>,
        events: Arc<dyn EventSink>,
        rng: Box<dyn RandomSource>,
    ) -> Result<Arc<Self>, ConfigError> {
        let config = Arc::new(config.prepare()?);
        let resolver = PayoutResolver::new(config.clone(), ledger.clone());
        Ok(Arc::new(Self {
            config,
            ledger,
            scheduler,
            events,
            rng: Mutex::new(rng),
            sessions: SessionStore::new(),
            crash_cooldowns: CooldownTracker::new(),
            slot_cooldowns: CooldownTracker::new(),
            hilo_cooldowns: CooldownTracker::new(),
            resolver,
        }))
    }

    /// Register the periodic tick with the scheduler.
    pub fn start(self: &Arc<Self>) {
        let engine = Arc::downgrade(self);
        self.scheduler.every_tick(Box::new(move || {
            if let Some(engine) = engine.upgrade() {
                engine.on_tick();
            }
        }));
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }

    pub fn session(&self, player: &PlayerId) -> Option<Session> {
        self.sessions.get(player)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.active_count()
    }

    pub fn balance(&self, player: &PlayerId) -> Result<u64, WagerError> {
        Ok(self.ledger.balance(player)?)
    }

    /// Bet `wager` that the crash multiplier reaches `target` (e.g. `2.5`).
    pub fn start_crash(
        &self,
        player: &PlayerId,
        wager: u64,
        target: f64,
    ) -> Result<Session, WagerError> {
        let crash = &self.config.crash;
        let session = self.place(player, GameType::Crash, wager, |rng| {
            let target = multiplier_to_bps(target).ok_or(ValidationError::InvalidTarget)?;
            let (min, max) = crash.target_bounds_bps();
            if target < min || target > max {
                return Err(ValidationError::TargetOutOfRange { target, min, max }.into());
            }
            let crash_point = sample_crash_point(&crash.multiplier_ranges, rng)
                .ok_or(GameError::EmptyTable)?;
            Ok(GameState::Crash(CrashRound::new(
                target,
                crash_point,
                crash.increment_bps(),
            )))
        })?;
        debug!(
            %player,
            session_id = session.id,
            target = %format_multiplier(session.target().unwrap_or_default()),
            "crash round started"
        );
        Ok(session)
    }

    /// Spin the slot machine. Reels stop on the scheduler's one-shot timers.
    pub fn start_slot(self: &Arc<Self>, player: &PlayerId, wager: u64) -> Result<Session, WagerError> {
        let symbols = &self.config.slot.symbols;
        let session = self.place(player, GameType::Slot, wager, |rng| {
            let mut draw = || sample_symbol(symbols, &mut *rng).ok_or(GameError::EmptyTable);
            let result = [draw()?, draw()?, draw()?];
            let display = [draw()?, draw()?, draw()?];
            Ok(GameState::Slot(SlotSpin::new(result, display)))
        })?;

        self.events.publish(progress_event(&session, &self.config));
        for (reel, delay) in self.config.slot.reel_stops.as_array().into_iter().enumerate() {
            let engine = Arc::downgrade(self);
            let player = player.clone();
            let session_id = session.id;
            self.scheduler.once_after(
                Duration::from_secs_f64(delay),
                Box::new(move || {
                    if let Some(engine) = engine.upgrade() {
                        engine.stop_reel(&player, session_id, reel);
                    }
                }),
            );
        }
        Ok(session)
    }

    /// Deal the first hi-lo card.
    pub fn start_hilo(&self, player: &PlayerId, wager: u64) -> Result<Session, WagerError> {
        let session = self.place(player, GameType::HiLo, wager, |rng| {
            Ok(GameState::HiLo(HiLoRun::new(draw_card(rng))))
        })?;
        self.events.publish(progress_event(&session, &self.config));
        Ok(session)
    }

    pub fn guess(&self, player: &PlayerId, guess: Guess) -> Result<GuessOutcome, WagerError> {
        let (session_id, run, finished) = self.step_hilo(player, Event::Guess(guess))?;
        let drawn = run.last_draw.unwrap_or(run.card);
        match finished {
            None => {
                debug!(%player, session_id, ?guess, %drawn, streak = run.streak, "correct guess");
                self.events.publish(GameEvent::HiLoCard {
                    player: player.clone(),
                    session_id,
                    card: run.card,
                    streak: run.streak,
                    multiplier: run.multiplier,
                });
                Ok(GuessOutcome::Correct {
                    drawn,
                    streak: run.streak,
                    multiplier: run.multiplier,
                })
            }
            Some(session) => {
                let settlement = self.settle(session)?;
                Ok(GuessOutcome::Busted { drawn, settlement })
            }
        }
    }

    /// Close the hi-lo run and pay `floor(wager * multiplier)`.
    pub fn cash_out(&self, player: &PlayerId) -> Result<Settlement, WagerError> {
        match self.step_hilo(player, Event::CashOut)? {
            (_, _, Some(session)) => self.settle(session),
            (_, _, None) => Err(WagerError::NoActiveSession {
                player: player.clone(),
                expected: GameType::HiLo,
            }),
        }
    }

    /// Advance every ticked session by one step and settle the ones that finished.
    pub fn on_tick(&self) {
        let mut events = Vec::new();
        let finished = self.sessions.for_each_active(|session| {
            if !session.game.is_ticked() {
                return;
            }
            let status = {
                let mut rng = self.rng();
                let mut ctx = Context {
                    config: &self.config,
                    rng: &mut **rng,
                };
                session.game.advance(Event::Tick, &mut ctx)
            };
            match status {
                Ok(status) => {
                    session.status = status;
                    events.push(progress_event(session, &self.config));
                }
                Err(err) => {
                    warn!(player = %session.player, session_id = session.id, ?err, "tick rejected")
                }
            }
        });

        for event in events {
            self.events.publish(event);
        }
        for session in finished {
            let (player, session_id) = (session.player.clone(), session.id);
            if let Err(err) = self.settle(session) {
                warn!(%player, session_id, code = err.code(), "tick settlement not paid");
            }
        }
    }

    /// Stop one reel of a slot session. Timers for a session that has since resolved, been
    /// removed or been replaced do nothing.
    pub fn stop_reel(
        &self,
        player: &PlayerId,
        session_id: SessionId,
        reel: usize,
    ) -> Option<Settlement> {
        let (event, finished) = self.sessions.with_active(player, |session| {
            if session.id != session_id {
                return None;
            }
            let mut rng = self.rng();
            let mut ctx = Context {
                config: &self.config,
                rng: &mut **rng,
            };
            match session.game.advance(Event::StopReel(reel), &mut ctx) {
                Ok(status) => {
                    session.status = status;
                    Some(progress_event(session, &self.config))
                }
                Err(err) => {
                    warn!(%player, session_id, reel, ?err, "reel stop rejected");
                    None
                }
            }
        })?;
        let event = event?;

        debug!(%player, session_id, reel, "reel stopped");
        self.events.publish(event);
        self.settle(finished?).ok()
    }

    fn rng(&self) -> MutexGuard<'_, Box<dyn RandomSource>> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bounds(&self, game: GameType) -> &WagerBounds {
        match game {
            GameType::Crash => &self.config.crash.bets,
            GameType::Slot => &self.config.slot.bets,
            GameType::HiLo => &self.config.hilo.bets,
        }
    }

    fn cooldowns(&self, game: GameType) -> (&CooldownTracker, Duration) {
        match game {
            GameType::Crash => (
                &self.crash_cooldowns,
                Duration::from_secs(self.config.crash.cooldown_secs),
            ),
            GameType::Slot => (
                &self.slot_cooldowns,
                Duration::from_secs(self.config.slot.cooldown_secs),
            ),
            GameType::HiLo => (
                &self.hilo_cooldowns,
                Duration::from_secs(self.config.hilo.cooldown_secs),
            ),
        }
    }

    /// Validate the amount and return it as a ledger debit.
    fn check_wager(&self, game: GameType, wager: u64) -> Result<i64, ValidationError> {
        let bounds = self.bounds(game);
        if wager == 0 {
            return Err(ValidationError::ZeroWager);
        }
        if !bounds.contains(wager) {
            return Err(if wager < bounds.min_bet {
                ValidationError::BelowMinimum {
                    amount: wager,
                    min: bounds.min_bet,
                }
            } else {
                ValidationError::AboveMaximum {
                    amount: wager,
                    max: bounds.max_bet,
                }
            });
        }
        i64::try_from(wager).map_err(|_| ValidationError::AboveMaximum {
            amount: wager,
            max: i64::MAX as u64,
        })
    }

    fn place(
        &self,
        player: &PlayerId,
        game: GameType,
        wager: u64,
        build: impl FnOnce(&mut dyn RandomSource) -> Result<GameState, WagerError>,
    ) -> Result<Session, WagerError> {
        let result = self
            .check_wager(game, wager)
            .map_err(WagerError::from)
            .and_then(|debit| {
                let state = {
                    let mut rng = self.rng();
                    build(&mut **rng)?
                };
                self.open_session(player, game, wager, debit, state)
            });
        if let Err(err) = &result {
            warn!(%player, %game, wager, %err, "wager rejected");
        }
        result
    }

    fn open_session(
        &self,
        player: &PlayerId,
        game: GameType,
        wager: u64,
        debit: i64,
        state: GameState,
    ) -> Result<Session, WagerError> {
        if let Some(existing) = self.sessions.active(player) {
            return Err(WagerError::SessionConflict {
                player: player.clone(),
                game: existing.game_type(),
            });
        }
        let balance = self.ledger.balance(player)?;
        if balance < wager {
            return Err(ValidationError::InsufficientBalance { balance, wager }.into());
        }

        let (cooldowns, window) = self.cooldowns(game);
        let stamp = match cooldowns.try_acquire(player, Instant::now(), window) {
            Acquire::Granted(stamp) => stamp,
            Acquire::Denied { remaining_secs } => {
                return Err(WagerError::CooldownActive { remaining_secs })
            }
        };

        if let Err(err) = self.ledger.adjust(player, -debit) {
            cooldowns.release(player, stamp);
            return Err(err.into());
        }

        let created = self
            .sessions
            .try_create(player, |id| Session::new(id, player.clone(), wager, state));
        match created {
            Ok(session) => {
                info!(%player, %game, session_id = session.id, wager, "wager accepted");
                self.events.publish(GameEvent::WagerPlaced {
                    player: player.clone(),
                    session_id: session.id,
                    game,
                    wager,
                    target: session.target(),
                });
                Ok(session)
            }
            Err(conflict) => {
                if let Err(err) = self.ledger.adjust(player, debit) {
                    error!(%player, wager, ?err, "refund after session conflict failed");
                }
                cooldowns.release(player, stamp);
                Err(WagerError::SessionConflict {
                    player: player.clone(),
                    game: conflict.game,
                })
            }
        }
    }

    /// Apply a hi-lo event to the player's active run. A run that ends is returned already
    /// taken out of the store.
    fn step_hilo(
        &self,
        player: &PlayerId,
        event: Event,
    ) -> Result<(SessionId, HiLoRun, Option<Session>), WagerError> {
        let (stepped, finished) = self
            .sessions
            .with_active(player, |session| {
                let actual = session.game_type();
                let GameState::HiLo(run) = &mut session.game else {
                    return Err(WagerError::WrongGame {
                        player: player.clone(),
                        expected: GameType::HiLo,
                        actual,
                    });
                };
                let status = {
                    let mut rng = self.rng();
                    let mut ctx = Context {
                        config: &self.config,
                        rng: &mut **rng,
                    };
                    run.advance(event, &mut ctx)?
                };
                let run = run.clone();
                session.status = status;
                Ok((session.id, run))
            })
            .ok_or_else(|| WagerError::NoActiveSession {
                player: player.clone(),
                expected: GameType::HiLo,
            })?;
        let (session_id, run) = stepped?;
        Ok((session_id, run, finished))
    }

    /// Pay out a session already taken out of the store and announce the result.
    fn settle(&self, session: Session) -> Result<Settlement, WagerError> {
        let (player, session_id, game) = (session.player.clone(), session.id, session.game_type());
        match self.resolver.resolve(session) {
            Ok(settlement) => {
                info!(
                    %player,
                    %game,
                    session_id,
                    wager = settlement.wager,
                    winnings = settlement.winnings,
                    outcome = ?settlement.outcome,
                    "session settled"
                );
                self.events.publish(GameEvent::Settled(settlement.clone()));
                Ok(settlement)
            }
            Err(err) => {
                if let WagerError::CreditFailed { settlement, source } = &err {
                    error!(
                        %player,
                        %game,
                        session_id,
                        winnings = settlement.winnings,
                        ?source,
                        "credit failed after resolution"
                    );
                    self.events.publish(GameEvent::CreditFailed {
                        player: player.clone(),
                        session_id,
                        amount: settlement.winnings,
                        reason: source.to_string(),
                    });
                }
                Err(err)
            }
        }
    }
}

/// Display event for the session's current progress.
fn progress_event(session: &Session, config: &ArcadeConfig) -> GameEvent {
    let player = session.player.clone();
    let session_id = session.id;
    match &session.game {
        GameState::Crash(round) => GameEvent::CrashProgress {
            player,
            session_id,
            multiplier: round.current,
            crashed: round.has_crashed(),
        },
        GameState::Slot(spin) => GameEvent::SlotReels {
            player,
            session_id,
            reels: spin.displayed_symbols(&config.slot),
            stopped: spin.stopped,
        },
        GameState::HiLo(run) => GameEvent::HiLoCard {
            player,
            session_id,
            card: run.card,
            streak: run.streak,
            multiplier: run.multiplier,
        },
    }
}

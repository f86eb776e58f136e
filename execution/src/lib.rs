//! Wagerhall execution layer.
//!
//! This crate runs the session-based wagering games (crash, slot, hi-lo) on top of an external
//! credit ledger. The primary entrypoint is [`WagerEngine`].
//!
//! ## Guarantees
//! - At most one active session per player across all games.
//! - Exactly one debit when a wager is accepted and at most one credit when it settles.
//! - No session, cooldown or RNG lock is held while the ledger is called.
//! - All randomness comes from the injected [`RandomSource`]; all time comes from the injected
//!   [`Scheduler`].
//!
//! ## Minimal wiring
//! ```rust,ignore
//! use std::sync::Arc;
//! use wagerhall_execution::{GameRng, MemoryLedger, NullSink, WagerEngine};
//!
//! let engine = WagerEngine::new(
//!     config,
//!     Arc::new(MemoryLedger::new(1_000)),
//!     scheduler,
//!     Arc::new(NullSink),
//!     Box::new(GameRng::from_entropy()),
//! )?;
//! engine.start();
//! engine.start_crash(&"alice".into(), 100, 2.0)?;
//! ```

pub mod casino;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod payout;
pub mod sampler;
pub mod scheduler;
pub mod session;
pub mod store;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;


pub use casino::{GameError, GameState, Guess, Outcome};
pub use engine::{GuessOutcome, WagerEngine};
pub use error::{ValidationError, WagerError};
pub use events::{EventSink, GameEvent, NullSink};
pub use ledger::{CreditLedger, LedgerError, MemoryLedger};
pub use payout::{Settlement, SettlementDetail};
pub use sampler::{GameRng, RandomSource};
pub use scheduler::{RepeatingTask, Scheduler, Task};
pub use session::{Session, SessionId, SessionStatus};

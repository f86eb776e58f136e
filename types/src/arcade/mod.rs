//! Arcade domain types.
//!
//! Defines identities, cards, game tags, multiplier constants and configuration used by the
//! execution layer and the host service.

mod cards;
mod config;
mod constants;
mod game;
mod player;

pub use cards::*;
pub use config::*;
pub use constants::*;
pub use game::*;
pub use player::*;

#[cfg(test)]
mod tests;

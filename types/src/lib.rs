//! Common types shared by the wagerhall engine and its host service.
//!
//! Everything here is plain data: player identities, playing cards, fixed-point
//! multiplier helpers and the per-game configuration loaded by the host.

pub mod arcade;

pub use arcade::{Card, GameType, PlayerId};

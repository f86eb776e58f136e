//! Active sessions keyed by player.
//!
//! The store enforces one active session per player with a per-key entry lock. A step that
//! resolves a session removes it under the same lock and hands it back to the caller, so a
//! resolved session is never visible to (or replaced by) a new wager before it is settled.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{mapref::entry::Entry, DashMap};
use thiserror::Error;
use wagerhall_types::{GameType, PlayerId};

use crate::session::{Session, SessionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{player} already has an active {game} session ({session_id})")]
pub struct AlreadyActive {
    pub player: PlayerId,
    pub game: GameType,
    pub session_id: SessionId,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<PlayerId, Session>,
    next_id: AtomicU64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for `player` unless one already exists.
    ///
    /// `factory` runs under the entry lock and receives the new session's id; it must not block.
    pub fn try_create(
        &self,
        player: &PlayerId,
        factory: impl FnOnce(SessionId) -> Session,
    ) -> Result<Session, AlreadyActive> {
        match self.sessions.entry(player.clone()) {
            Entry::Occupied(entry) => Err(AlreadyActive {
                player: player.clone(),
                game: entry.get().game_type(),
                session_id: entry.get().id,
            }),
            Entry::Vacant(entry) => {
                let session = factory(self.allocate_id());
                entry.insert(session.clone());
                Ok(session)
            }
        }
    }

    fn allocate_id(&self) -> SessionId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Snapshot of the player's current session.
    pub fn get(&self, player: &PlayerId) -> Option<Session> {
        self.sessions.get(player).map(|entry| entry.value().clone())
    }

    pub fn active(&self, player: &PlayerId) -> Option<Session> {
        self.get(player).filter(Session::is_active)
    }

    /// Remove whatever session the player has. Removing nothing is fine.
    pub fn remove(&self, player: &PlayerId) -> Option<Session> {
        self.sessions.remove(player).map(|(_, session)| session)
    }

    /// Run `f` with exclusive access to the player's active session.
    ///
    /// When `f` leaves the session resolved it is removed before the lock is released and
    /// returned next to `f`'s result.
    pub fn with_active<R>(
        &self,
        player: &PlayerId,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<(R, Option<Session>)> {
        let Entry::Occupied(mut entry) = self.sessions.entry(player.clone()) else {
            return None;
        };
        if !entry.get().is_active() {
            return None;
        }
        let value = f(entry.get_mut());
        let finished = (!entry.get().is_active()).then(|| entry.remove());
        Some((value, finished))
    }

    /// Visit every active session with exclusive access to it and return the sessions the
    /// visitor resolved, already removed from the store.
    ///
    /// Keys are snapshotted first and each visit takes its own entry lock, so no shard lock is
    /// held between visits. Sessions removed after the snapshot are skipped.
    pub fn for_each_active(&self, mut visitor: impl FnMut(&mut Session)) -> Vec<Session> {
        let players: Vec<PlayerId> = self
            .sessions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        let mut finished = Vec::new();
        for player in players {
            let Entry::Occupied(mut entry) = self.sessions.entry(player) else {
                continue;
            };
            if !entry.get().is_active() {
                continue;
            }
            visitor(entry.get_mut());
            if !entry.get().is_active() {
                finished.push(entry.remove());
            }
        }
        finished
    }

    pub fn active_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.value().is_active())
            .count()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

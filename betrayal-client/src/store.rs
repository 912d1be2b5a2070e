//! Shared slot holding the current match snapshot
//!
//! The session holds the only `MatchStore` and swaps whole snapshots in.
//! Renderers hold `MatchReader`s and get an `Arc` to one complete snapshot,
//! never a half-replaced roster. Selection edits copy the snapshot first, so
//! an `Arc` already handed out never changes under its reader.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use betrayal_core::{Hex, MatchState};

type Slot = Option<Arc<MatchState>>;

/// Write handle, owned by the session driver
#[derive(Debug, Default)]
pub struct MatchStore {
    slot: Arc<RwLock<Slot>>,
}

/// Read-only handle for render surfaces
#[derive(Clone, Debug)]
pub struct MatchReader {
    slot: Arc<RwLock<Slot>>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reader(&self) -> MatchReader {
        MatchReader {
            slot: Arc::clone(&self.slot),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Option<Arc<MatchState>> {
        read(&self.slot).clone()
    }

    /// Swap in a whole new state, returning the one it replaced
    pub fn replace(&self, state: MatchState) -> Option<Arc<MatchState>> {
        self.write().replace(Arc::new(state))
    }

    pub fn clear(&self) -> Option<Arc<MatchState>> {
        self.write().take()
    }

    /// Change the local selection. Returns false when no match is installed.
    pub fn select(&self, hex: Option<Hex>) -> bool {
        match self.write().as_mut() {
            Some(state) => {
                Arc::make_mut(state).select(hex);
                true
            }
            None => false,
        }
    }
}

impl MatchReader {
    pub fn snapshot(&self) -> Option<Arc<MatchState>> {
        read(&self.slot).clone()
    }
}

fn read(slot: &RwLock<Slot>) -> RwLockReadGuard<'_, Slot> {
    slot.read().unwrap_or_else(PoisonError::into_inner)
}

//! Session Registry Module
//!
//! Owns one piece of per-session state per session id, with activity tracking
//! so idle sessions can be swept.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

// == Session Slot ==
/// A session's state plus its bookkeeping timestamps.
#[derive(Debug, Clone)]
pub struct SessionSlot<S> {
    pub state: S,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Last time the session was touched (Unix milliseconds)
    pub last_active_at: u64,
}

impl<S> SessionSlot<S> {
    fn new(state: S, now: u64) -> Self {
        Self {
            state,
            created_at: now,
            last_active_at: now,
        }
    }

    /// Returns true if the slot has been idle for longer than `idle_ms`.
    pub fn is_idle(&self, now: u64, idle_ms: u64) -> bool {
        now.saturating_sub(self.last_active_at) > idle_ms
    }
}

// == Session Registry ==
/// Map from session id to per-session state.
#[derive(Debug)]
pub struct SessionRegistry<S> {
    slots: HashMap<String, SessionSlot<S>>,
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SessionRegistry<S> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    // == Create ==
    /// Installs fresh state for a session, replacing anything already there.
    pub fn create(&mut self, session_id: &str, now: u64, state: S) -> &mut S {
        let slot = SessionSlot::new(state, now);
        match self.slots.entry(session_id.to_string()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(slot);
                &mut occupied.into_mut().state
            }
            Entry::Vacant(vacant) => &mut vacant.insert(slot).state,
        }
    }

    // == Get Or Create ==
    /// Returns the session's state, creating it with `init` on first use.
    ///
    /// Refreshes the session's last-active timestamp.
    pub fn get_or_create<F>(&mut self, session_id: &str, now: u64, init: F) -> &mut S
    where
        F: FnOnce() -> S,
    {
        let slot = self
            .slots
            .entry(session_id.to_string())
            .or_insert_with(|| SessionSlot::new(init(), now));
        slot.last_active_at = now;
        &mut slot.state
    }

    // == Get ==
    /// Returns the session's state without refreshing its activity.
    pub fn get(&self, session_id: &str) -> Option<&S> {
        self.slots.get(session_id).map(|slot| &slot.state)
    }

    /// Returns the full slot, including timestamps.
    pub fn slot(&self, session_id: &str) -> Option<&SessionSlot<S>> {
        self.slots.get(session_id)
    }

    // == Destroy ==
    /// Removes a session. Returns true if it existed.
    pub fn destroy(&mut self, session_id: &str) -> bool {
        self.slots.remove(session_id).is_some()
    }

    // == Sweep ==
    /// Removes every session idle for longer than `idle_ms`.
    ///
    /// Returns the number of sessions removed.
    pub fn sweep(&mut self, now: u64, idle_ms: u64) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| !slot.is_idle(now, idle_ms));
        before - self.slots.len()
    }

    /// Iterates over every live session's state.
    pub fn states_mut(&mut self) -> impl Iterator<Item = &mut S> {
        self.slots.values_mut().map(|slot| &mut slot.state)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.slots.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

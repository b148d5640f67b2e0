//! Notification counters.
//!
//! Three independent monotonic accumulators (chat, requests, posts). Each is
//! seeded once per session from an authoritative fetch, incremented by live
//! events, and consumed by an explicit reset when the user opens the
//! corresponding view. Nothing else ever decrements them.

/// Counter categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    /// Unread chat messages.
    Chat,
    /// Pending connection requests.
    Requests,
    /// New community posts.
    Posts,
}

/// Point-in-time counter values, handed to the view layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Unread chat messages.
    pub chat: u64,
    /// Pending connection requests.
    pub requests: u64,
    /// New community posts.
    pub posts: u64,
}

/// Monotonic accumulators for the three notification categories.
///
/// # Invariants
///
/// - Values are non-negative and only move upward between `seed`/`reset`
///   calls.
/// - Categories are independent; seeding one never touches another (the two
///   session seeds may land in either order).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationCounters {
    chat: u64,
    requests: u64,
    posts: u64,
}

impl NotificationCounters {
    /// Fresh counters, all zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one counter with an authoritative value.
    pub fn seed(&mut self, kind: CounterKind, value: u64) {
        *self.slot(kind) = value;
    }

    /// Record one live event; returns the new value.
    pub fn record(&mut self, kind: CounterKind) -> u64 {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Consume one counter (view opened).
    pub fn reset(&mut self, kind: CounterKind) {
        *self.slot(kind) = 0;
    }

    /// Reset every counter (session teardown).
    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Current value of one counter.
    pub fn get(&self, kind: CounterKind) -> u64 {
        match kind {
            CounterKind::Chat => self.chat,
            CounterKind::Requests => self.requests,
            CounterKind::Posts => self.posts,
        }
    }

    /// Snapshot of all three counters.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot { chat: self.chat, requests: self.requests, posts: self.posts }
    }

    fn slot(&mut self, kind: CounterKind) -> &mut u64 {
        match kind {
            CounterKind::Chat => &mut self.chat,
            CounterKind::Requests => &mut self.requests,
            CounterKind::Posts => &mut self.posts,
        }
    }
}

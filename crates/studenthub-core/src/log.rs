//! Conversation message log with optimistic reconciliation.
//!
//! A send appends an optimistic entry immediately; the server's confirmed
//! echo carries the same correlation id and replaces that entry in place, so
//! the sender never sees their own message twice. Confirmed messages without
//! a matching pending correlation id always append — the log deliberately
//! does not dedup independent server deliveries.

use std::collections::HashMap;

use studenthub_proto::Message;

/// Delivery status of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Client-generated, not yet confirmed by the server.
    Optimistic,
    /// Echoed back by the server; canonical.
    Confirmed,
}

/// One message in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// The message itself.
    pub message: Message,
    /// Whether the server has confirmed it.
    pub status: DeliveryStatus,
}

/// Outcome of applying a confirmed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Replaced the optimistic entry with the matching correlation id.
    Replaced,
    /// Appended as a new entry.
    Appended,
}

/// Ordered message log for one conversation.
///
/// Entries keep arrival order. Pending optimistic entries are indexed by
/// correlation id; indices stay valid because entries are only ever appended
/// or replaced in place between history loads.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
    pending: HashMap<String, usize>,
}

impl MessageLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in arrival order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of optimistic entries awaiting confirmation.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Replace the log with authoritative history (view open).
    ///
    /// Drops any pending optimistic entries; the fetch is canonical.
    pub fn load_history(&mut self, messages: Vec<Message>) {
        self.pending.clear();
        self.entries = messages
            .into_iter()
            .map(|message| LogEntry { message, status: DeliveryStatus::Confirmed })
            .collect();
    }

    /// Append an optimistic entry for a message this client just sent.
    ///
    /// The message's correlation id (when present) is registered so the
    /// server echo can be reconciled.
    pub fn push_optimistic(&mut self, message: Message) {
        if let Some(correlation_id) = message.correlation_id.clone() {
            self.pending.insert(correlation_id, self.entries.len());
        }
        self.entries.push(LogEntry { message, status: DeliveryStatus::Optimistic });
    }

    /// Apply a server-confirmed message.
    ///
    /// If it carries a correlation id matching a pending optimistic entry,
    /// that entry is replaced in place (idempotent for the sender's own
    /// echo). Otherwise it appends.
    pub fn apply_confirmed(&mut self, message: Message) -> Applied {
        if let Some(correlation_id) = message.correlation_id.as_deref()
            && let Some(index) = self.pending.remove(correlation_id)
            && let Some(entry) = self.entries.get_mut(index)
        {
            *entry = LogEntry { message, status: DeliveryStatus::Confirmed };
            return Applied::Replaced;
        }

        self.entries.push(LogEntry { message, status: DeliveryStatus::Confirmed });
        Applied::Appended
    }

    /// Drop everything (view closed or session ended).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending.clear();
    }
}

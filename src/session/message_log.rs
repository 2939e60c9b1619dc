//! Running log of events received while in a room.

// Rust guideline compliant 2026-02

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::protocol::Event;

/// One received event with its arrival metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Arrival sequence number, strictly increasing for the session lifetime.
    pub seq: u64,
    /// Local wall-clock time the event was applied.
    pub received_at: DateTime<Local>,
    /// The event itself.
    pub event: Event,
}

/// Arrival-ordered event log with an optional size cap.
///
/// Sequence numbers keep increasing across [`MessageLog::clear`], so a
/// consumer that remembers the last `seq` it printed never re-prints or skips
/// entries after a new room attempt.
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<LogEntry>,
    limit: Option<usize>,
    next_seq: u64,
}

impl MessageLog {
    /// Create a log. `limit` of `None` (or zero) keeps every entry.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.filter(|&n| n > 0),
            next_seq: 1,
        }
    }

    /// Entry with sequence number `seq`, if still retained.
    pub fn get(&self, seq: u64) -> Option<&LogEntry> {
        let index = self
            .entries
            .binary_search_by_key(&seq, |entry| entry.seq)
            .ok()?;
        self.entries.get(index)
    }

    /// Append an event, evicting the oldest entry when over the cap.
    pub fn push(&mut self, event: Event) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back(LogEntry {
            seq,
            received_at: Local::now(),
            event,
        });
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
        seq
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All retained entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Entries with `seq` greater than `after`.
    pub fn since(&self, after: u64) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |entry| entry.seq > after)
    }

    /// Only the chat `message` entries, in arrival order.
    pub fn chat_messages(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|entry| entry.event.is_chat_message())
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(None)
    }
}

use chrono::{DateTime, FixedOffset};

use logsieve_types::ParsedLogEntry;

/// A matching entry paired with its parsed timestamp
#[derive(Clone, Debug)]
pub struct TimedEntry {
    pub timestamp: DateTime<FixedOffset>,
    pub entry: ParsedLogEntry,
}

/// Order entries most recent first.
///
/// Timestamps are compared as instants, so offsets are taken into account.
/// The sort is stable: entries with equal instants keep their stream order.
pub fn sort_descending(entries: &mut [TimedEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

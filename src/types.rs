use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Number of entries the monitoring view retains by default.
pub const DEFAULT_CAPACITY: usize = 100;

/// Severity of a simulated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Success,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Success => "success",
        }
    }

    /// Case-insensitive lookup, `None` for anything outside the closed set.
    pub fn parse(value: &str) -> Option<LogLevel> {
        let value = value.trim();
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogId(pub u64);

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single simulated monitoring event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogId,
    /// Serialized as RFC 3339
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    /// Subsystem that produced the event
    pub source: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(
        id: LogId,
        timestamp: DateTime<Utc>,
        level: LogLevel,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id,
            timestamp,
            level,
            source: source.into(),
            message: message.into(),
        }
    }
}

/// Fixed-capacity FIFO of log entries. Oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_size: usize,
}

impl LogBuffer {
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        while self.entries.len() >= self.max_size {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = LogEntry>) {
        for entry in entries {
            self.push(entry);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    pub fn front(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn back(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Aggregate counts over every retained entry.
    pub fn stats(&self) -> LogStats {
        let mut stats = LogStats {
            total: self.entries.len(),
            ..LogStats::default()
        };
        for entry in &self.entries {
            match entry.level {
                LogLevel::Error => stats.errors += 1,
                LogLevel::Warning => stats.warnings += 1,
                LogLevel::Success => stats.successes += 1,
                LogLevel::Info => {}
            }
        }
        stats
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Counts shown next to the event list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LogStats {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub successes: usize,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn entry(id: u64, level: LogLevel, source: &str, message: &str) -> LogEntry {
        LogEntry::new(LogId(id), Utc::now(), level, source, message)
    }

    #[test]
    fn level_parse_is_case_insensitive() {
        assert_eq!(LogLevel::parse("ERROR"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse(" Warning "), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("warn"), None);
        assert_eq!(LogLevel::parse(""), None);
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_string(&LogLevel::Success).unwrap();
        assert_eq!(json, "\"success\"");
    }

    #[test]
    fn buffer_never_exceeds_capacity() {
        let mut buffer = LogBuffer::new(100);
        for i in 0..250 {
            buffer.push(entry(i, LogLevel::Info, "src", "msg"));
            assert!(buffer.len() <= 100);
        }
        assert_eq!(buffer.len(), 100);
    }

    #[test]
    fn buffer_evicts_oldest_first() {
        let mut buffer = LogBuffer::new(100);
        for i in 1..=101 {
            buffer.push(entry(i, LogLevel::Info, "src", "msg"));
        }
        assert_eq!(buffer.len(), 100);
        assert_eq!(buffer.front().map(|e| e.id), Some(LogId(2)));
        assert_eq!(buffer.back().map(|e| e.id), Some(LogId(101)));

        let ids: Vec<u64> = buffer.iter().map(|e| e.id.0).collect();
        let expected: Vec<u64> = (2..=101).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut buffer = LogBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.push(entry(1, LogLevel::Info, "a", "b"));
        buffer.push(entry(2, LogLevel::Info, "a", "b"));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.front().map(|e| e.id), Some(LogId(2)));
    }

    #[test]
    fn stats_count_whole_buffer() {
        let mut buffer = LogBuffer::default();
        buffer.extend([
            entry(1, LogLevel::Error, "a", "x"),
            entry(2, LogLevel::Error, "a", "x"),
            entry(3, LogLevel::Warning, "a", "x"),
            entry(4, LogLevel::Success, "a", "x"),
            entry(5, LogLevel::Info, "a", "x"),
        ]);
        let stats = buffer.stats();
        assert_eq!(
            stats,
            LogStats {
                total: 5,
                errors: 2,
                warnings: 1,
                successes: 1
            }
        );
    }
}

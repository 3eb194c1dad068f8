use crate::types::{LogBuffer, LogEntry, LogLevel};
use log::warn;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Severity predicate of the monitoring view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LevelFilter {
    #[default]
    All,
    Only(LogLevel),
    /// Unrecognised level text; matches no entry
    Nothing,
}

impl LevelFilter {
    pub fn matches(&self, level: LogLevel) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Only(wanted) => *wanted == level,
            LevelFilter::Nothing => false,
        }
    }
}

impl FromStr for LevelFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(LevelFilter::All);
        }
        match LogLevel::parse(s) {
            Some(level) => Ok(LevelFilter::Only(level)),
            None => {
                warn!("Unknown level filter {:?}, no entries will match", s);
                Ok(LevelFilter::Nothing)
            }
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelFilter::All => f.write_str("all"),
            LevelFilter::Only(level) => write!(f, "{}", level),
            LevelFilter::Nothing => f.write_str("none"),
        }
    }
}

/// Free-text search plus severity filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    search: String,
    needle: String,
    level: LevelFilter,
}

impl FilterState {
    pub fn new(search: impl Into<String>, level: LevelFilter) -> Self {
        let search = search.into();
        let needle = search.to_lowercase();
        Self {
            search,
            needle,
            level,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Search text is matched literally, case-insensitively, against
    /// message and source. Empty text matches everything.
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if !self.level.matches(entry.level) {
            return false;
        }
        if self.needle.is_empty() {
            return true;
        }
        entry.message.to_lowercase().contains(&self.needle)
            || entry.source.to_lowercase().contains(&self.needle)
    }

    /// Entries of `buffer` passing the filter, in buffer order.
    pub fn apply<'a>(&'a self, buffer: &'a LogBuffer) -> impl Iterator<Item = &'a LogEntry> + 'a {
        buffer.iter().filter(move |entry| self.matches(entry))
    }
}

use crate::types::{LogEntry, LogId, LogLevel};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use std::time::Duration;

pub const SOURCES: [&str; 7] = [
    "System Monitor",
    "Backup Service",
    "AWS Storage Gateway",
    "Network Monitor",
    "DR Orchestrator",
    "Database Service",
    "Application Server",
];

const INFO_MESSAGES: &[&str] = &[
    "Health check completed successfully",
    "Service status: operational",
    "Connection established to AWS services",
    "Monitoring threshold updated",
    "System maintenance completed",
    "Configuration backup created",
];

const WARNING_MESSAGES: &[&str] = &[
    "High CPU utilization detected: 85%",
    "Network latency above threshold",
    "Disk space warning: 15% remaining",
    "Backup window approaching deadline",
    "SSL certificate expires in 30 days",
];

const ERROR_MESSAGES: &[&str] = &[
    "Connection timeout to primary database",
    "Backup job failed: network unreachable",
    "Authentication failed for service account",
    "Disk space critical: 5% remaining",
    "Service unavailable: 503 error",
];

const SUCCESS_MESSAGES: &[&str] = &[
    "Backup completed successfully",
    "Failover test passed with flying colors",
    "System restored from backup",
    "Performance optimization applied",
    "Security patch installed successfully",
];

/// Message templates for a level.
pub fn messages_for(level: LogLevel) -> &'static [&'static str] {
    match level {
        LogLevel::Info => INFO_MESSAGES,
        LogLevel::Warning => WARNING_MESSAGES,
        LogLevel::Error => ERROR_MESSAGES,
        LogLevel::Success => SUCCESS_MESSAGES,
    }
}

/// (seconds before start, level, source, message)
const HISTORY: [(i64, LogLevel, &str, &str); 5] = [
    (
        300,
        LogLevel::Info,
        "System Monitor",
        "System health check completed - All services operational",
    ),
    (
        240,
        LogLevel::Success,
        "Backup Service",
        "Scheduled backup completed successfully - 2.5TB transferred",
    ),
    (
        180,
        LogLevel::Info,
        "AWS Storage Gateway",
        "Connection established to S3 bucket: dr-backup-primary",
    ),
    (
        120,
        LogLevel::Warning,
        "Network Monitor",
        "Latency spike detected: 250ms (threshold: 200ms)",
    ),
    (
        60,
        LogLevel::Info,
        "DR Orchestrator",
        "Disaster recovery test scheduled for next maintenance window",
    ),
];

/// Bounds of the randomized delay between two live emissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub min: Duration,
    pub max: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(3000),
            max: Duration::from_millis(5000),
        }
    }
}

/// Produces synthetic entries from an injected random source.
///
/// Ids are handed out monotonically, so every entry produced by one
/// generator is unique.
pub struct LogGenerator<R> {
    rng: R,
    next_id: u64,
}

impl<R: Rng> LogGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, next_id: 1 }
    }

    /// The fixed historical entries shown when the view opens, stamped
    /// relative to `now`.
    pub fn history(&mut self, now: DateTime<Utc>) -> Vec<LogEntry> {
        HISTORY
            .iter()
            .map(|&(ago, level, source, message)| {
                let id = self.next_id();
                LogEntry::new(id, now - ChronoDuration::seconds(ago), level, source, message)
            })
            .collect()
    }

    pub fn generate_entry(&mut self) -> LogEntry {
        self.generate_entry_at(Utc::now())
    }

    pub fn generate_entry_at(&mut self, timestamp: DateTime<Utc>) -> LogEntry {
        let level = LogLevel::ALL[self.rng.gen_range(0..LogLevel::ALL.len())];
        let source = SOURCES[self.rng.gen_range(0..SOURCES.len())];
        let pool = messages_for(level);
        let message = pool[self.rng.gen_range(0..pool.len())];

        let id = self.next_id();
        LogEntry::new(id, timestamp, level, source, message)
    }

    /// Delay to wait before the next live emission.
    pub fn next_delay(&mut self, cadence: &Cadence) -> Duration {
        let min = cadence.min.as_millis() as u64;
        let max = cadence.max.as_millis() as u64;
        if max <= min {
            return cadence.min;
        }
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    fn next_id(&mut self) -> LogId {
        let id = LogId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn same_seed_reproduces_sequence() {
        let mut a = LogGenerator::new(StdRng::seed_from_u64(7));
        let mut b = LogGenerator::new(StdRng::seed_from_u64(7));
        for _ in 0..50 {
            assert_eq!(a.generate_entry_at(fixed_time()), b.generate_entry_at(fixed_time()));
        }
    }

    #[test]
    fn message_belongs_to_level_pool() {
        let mut generator = LogGenerator::new(StdRng::seed_from_u64(42));
        for _ in 0..200 {
            let entry = generator.generate_entry_at(fixed_time());
            assert!(messages_for(entry.level).contains(&entry.message.as_str()));
            assert!(SOURCES.contains(&entry.source.as_str()));
            assert_eq!(entry.timestamp, fixed_time());
        }
    }

    #[test]
    fn every_level_eventually_appears() {
        let mut generator = LogGenerator::new(StdRng::seed_from_u64(3));
        let levels: HashSet<LogLevel> = (0..200)
            .map(|_| generator.generate_entry_at(fixed_time()).level)
            .collect();
        assert_eq!(levels.len(), 4);
    }

    #[test]
    fn ids_are_unique_and_follow_history() {
        let mut generator = LogGenerator::new(StdRng::seed_from_u64(1));
        let history = generator.history(fixed_time());
        let ids: Vec<u64> = history.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let next = generator.generate_entry_at(fixed_time());
        assert_eq!(next.id, LogId(6));

        let seen: HashSet<LogId> = (0..500)
            .map(|_| generator.generate_entry_at(fixed_time()).id)
            .collect();
        assert_eq!(seen.len(), 500);
    }

    #[test]
    fn history_is_chronological() {
        let mut generator = LogGenerator::new(StdRng::seed_from_u64(1));
        let history = generator.history(fixed_time());
        assert_eq!(history[0].timestamp, fixed_time() - ChronoDuration::seconds(300));
        assert_eq!(history[4].timestamp, fixed_time() - ChronoDuration::seconds(60));
        assert!(history.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(history[3].level, LogLevel::Warning);
    }

    #[test]
    fn delay_stays_within_cadence() {
        let mut generator = LogGenerator::new(StdRng::seed_from_u64(9));
        let cadence = Cadence::default();
        for _ in 0..200 {
            let delay = generator.next_delay(&cadence);
            assert!(delay >= cadence.min && delay <= cadence.max);
        }

        let fixed = Cadence {
            min: Duration::from_millis(250),
            max: Duration::from_millis(250),
        };
        assert_eq!(generator.next_delay(&fixed), Duration::from_millis(250));
    }
}

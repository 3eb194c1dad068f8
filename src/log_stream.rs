use crate::config::LogsConfig;
use crate::error::Result;
use crate::export;
use crate::filter::{FilterState, LevelFilter};
use crate::generator::{Cadence, LogGenerator};
use crate::types::{LogBuffer, LogEntry, LogStats};
use chrono::{TimeZone, Utc};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::sleep;

struct StreamState<R> {
    buffer: LogBuffer,
    filter: FilterState,
    generator: LogGenerator<R>,
}

/// Snapshot handed to the rendering layer.
#[derive(Debug, Clone)]
pub struct LogView {
    pub entries: Vec<LogEntry>,
    pub stats: LogStats,
    pub live: bool,
}

/// Live-updating, filterable stream of synthetic monitoring events.
///
/// Buffer, filter and generator sit behind one mutex; every emission and
/// every filter change happens entirely under that lock. The emitter's
/// epoch and abort handle live outside it so that dropping the stream can
/// always cancel the emitter.
pub struct LogStream<R = StdRng> {
    state: Arc<Mutex<StreamState<R>>>,
    /// Bumped on every start, stop and drop; an emission from an older epoch is dropped
    epoch: Arc<AtomicU64>,
    emitter: StdMutex<Option<AbortHandle>>,
    cadence: Cadence,
}

impl LogStream<StdRng> {
    /// Builds a stream from configuration, seeded when `seed` is set.
    pub fn from_config(config: &LogsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config.capacity, config.cadence(), rng)
    }
}

impl<R> LogStream<R> {
    fn emitter_slot(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.emitter.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R> LogStream<R>
where
    R: Rng + Send + 'static,
{
    /// Creates a paused stream holding the seeded history.
    pub fn new(capacity: usize, cadence: Cadence, rng: R) -> Self {
        let mut generator = LogGenerator::new(rng);
        let mut buffer = LogBuffer::new(capacity);
        buffer.extend(generator.history(Utc::now()));
        debug!(
            "Log stream created: capacity={} cadence={:?}..{:?}",
            buffer.capacity(),
            cadence.min,
            cadence.max
        );

        Self {
            state: Arc::new(Mutex::new(StreamState {
                buffer,
                filter: FilterState::default(),
                generator,
            })),
            epoch: Arc::new(AtomicU64::new(0)),
            emitter: StdMutex::new(None),
            cadence,
        }
    }

    /// Enables live generation. No-op if already live.
    pub async fn start(&self) {
        let _state = self.state.lock().await;
        let mut emitter = self.emitter_slot();
        if emitter.is_some() {
            return;
        }
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let shared = Arc::clone(&self.state);
        let current = Arc::clone(&self.epoch);
        let cadence = self.cadence;
        let handle = tokio::spawn(async move {
            emission_cycle(shared, current, epoch, cadence).await
        });
        *emitter = Some(handle.abort_handle());
        info!("Live log stream started");
    }

    /// Disables live generation. Once this returns no further entry is
    /// appended, even if an emission timer already fired.
    pub async fn stop(&self) {
        let _state = self.state.lock().await;
        if let Some(emitter) = self.emitter_slot().take() {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            emitter.abort();
            info!("Live log stream stopped");
        }
    }

    pub async fn is_live(&self) -> bool {
        self.emitter_slot().is_some()
    }

    pub async fn generate_entry(&self) -> LogEntry {
        self.state.lock().await.generator.generate_entry()
    }

    pub async fn append(&self, entry: LogEntry) {
        self.state.lock().await.buffer.push(entry);
    }

    pub async fn set_filter(&self, search: impl Into<String>, level: LevelFilter) {
        let filter = FilterState::new(search, level);
        debug!("Filter set: search={:?} level={}", filter.search(), filter.level());
        self.state.lock().await.filter = filter;
    }

    /// Entries passing the current filter, in buffer order.
    pub async fn filtered(&self) -> Vec<LogEntry> {
        let state = self.state.lock().await;
        state.filter.apply(&state.buffer).cloned().collect()
    }

    /// Every retained entry, oldest first.
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.state.lock().await.buffer.iter().cloned().collect()
    }

    pub async fn view(&self) -> LogView {
        let state = self.state.lock().await;
        let live = self.emitter_slot().is_some();
        LogView {
            entries: state.filter.apply(&state.buffer).cloned().collect(),
            stats: state.buffer.stats(),
            live,
        }
    }

    /// CSV of the currently filtered entries, local time.
    pub async fn export_csv(&self) -> Result<String> {
        let state = self.state.lock().await;
        export::to_csv(state.filter.apply(&state.buffer))
    }

    pub async fn export_csv_in<Tz>(&self, tz: &Tz) -> Result<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let state = self.state.lock().await;
        export::to_csv_in(state.filter.apply(&state.buffer), tz)
    }
}

impl<R> Drop for LogStream<R> {
    fn drop(&mut self) {
        if let Some(emitter) = self.emitter_slot().take() {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            emitter.abort();
            debug!("Log stream dropped, emitter cancelled");
        }
    }
}

async fn emission_cycle<R: Rng>(
    state: Arc<Mutex<StreamState<R>>>,
    current: Arc<AtomicU64>,
    epoch: u64,
    cadence: Cadence,
) {
    loop {
        let delay = {
            let mut guard = state.lock().await;
            if current.load(Ordering::SeqCst) != epoch {
                return;
            }
            guard.generator.next_delay(&cadence)
        };

        debug!("Next log emission in {:?}", delay);
        sleep(delay).await;

        let mut guard = state.lock().await;
        if current.load(Ordering::SeqCst) != epoch {
            return;
        }
        let entry = guard.generator.generate_entry();
        debug!("Emitting [{}] {}: {}", entry.level, entry.source, entry.message);
        guard.buffer.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LogId, LogLevel};
    use std::time::Duration;

    fn seeded(seed: u64) -> LogStream {
        LogStream::new(100, Cadence::default(), StdRng::seed_from_u64(seed))
    }

    fn entry(id: u64, level: LogLevel) -> LogEntry {
        LogEntry::new(LogId(id), Utc::now(), level, "Test Source", "test message")
    }

    #[tokio::test]
    async fn starts_paused_with_history() {
        let stream = seeded(1);
        assert!(!stream.is_live().await);

        let view = stream.view().await;
        assert_eq!(view.entries.len(), 5);
        assert_eq!(view.stats.total, 5);
        assert_eq!(view.stats.warnings, 1);
        assert_eq!(view.stats.successes, 1);
        assert_eq!(view.stats.errors, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn live_stream_emits_within_cadence() {
        let stream = seeded(2);
        stream.start().await;
        assert!(stream.is_live().await);

        sleep(Duration::from_secs(60)).await;
        let total = stream.entries().await.len();
        // 60s at one entry every 3-5s
        assert!((5 + 11..=5 + 20).contains(&total), "got {}", total);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_emitted_before_minimum_delay() {
        let stream = seeded(3);
        stream.start().await;
        sleep(Duration::from_millis(2999)).await;
        assert_eq!(stream.entries().await.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_emission() {
        let stream = seeded(4);
        stream.start().await;
        sleep(Duration::from_secs(20)).await;
        stream.stop().await;
        assert!(!stream.is_live().await);

        let frozen = stream.entries().await;
        sleep(Duration::from_secs(120)).await;
        assert_eq!(stream.entries().await, frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_does_not_replay_missed_entries() {
        let stream = seeded(5);
        stream.start().await;
        sleep(Duration::from_secs(10)).await;
        stream.stop().await;
        let before = stream.entries().await.len();

        sleep(Duration::from_secs(600)).await;
        stream.start().await;
        sleep(Duration::from_millis(2999)).await;
        assert_eq!(stream.entries().await.len(), before);

        sleep(Duration::from_millis(2002)).await;
        assert_eq!(stream.entries().await.len(), before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_and_stop_are_idempotent() {
        let stream = seeded(6);
        stream.start().await;
        stream.start().await;
        sleep(Duration::from_secs(30)).await;
        // a second emitter would roughly double the count
        let total = stream.entries().await.len();
        assert!(total <= 5 + 10, "got {}", total);

        stream.stop().await;
        stream.stop().await;
        assert!(!stream.is_live().await);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stream_ends_emission() {
        let stream = seeded(11);
        stream.start().await;
        sleep(Duration::from_secs(10)).await;

        let state = Arc::clone(&stream.state);
        let before = state.lock().await.buffer.len();
        drop(stream);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(state.lock().await.buffer.len(), before);
        // the aborted emitter released its handle on the state
        assert_eq!(Arc::strong_count(&state), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stream_while_state_is_locked_ends_emission() {
        let stream = seeded(12);
        stream.start().await;

        let state = Arc::clone(&stream.state);
        {
            let _held = state.lock().await;
            drop(stream);
        }

        sleep(Duration::from_secs(60)).await;
        assert_eq!(state.lock().await.buffer.len(), 5);
        assert_eq!(Arc::strong_count(&state), 1);
    }

    #[tokio::test]
    async fn append_past_capacity_evicts_history_first() {
        let stream = seeded(7);
        for id in 100..196 {
            stream.append(entry(id, LogLevel::Info)).await;
        }
        let entries = stream.entries().await;
        assert_eq!(entries.len(), 100);
        // 5 seeded + 96 appended, so the first seeded entry is gone
        assert_eq!(entries[0].id, LogId(2));
        assert_eq!(entries[99].id, LogId(195));
    }

    #[tokio::test]
    async fn filter_applies_to_view_and_export() {
        let stream = seeded(8);
        stream.append(entry(10, LogLevel::Error)).await;
        stream.append(entry(11, LogLevel::Info)).await;
        stream.append(entry(12, LogLevel::Error)).await;

        stream.set_filter("", LevelFilter::Only(LogLevel::Error)).await;
        let ids: Vec<LogId> = stream.filtered().await.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![LogId(10), LogId(12)]);

        let csv = stream.export_csv_in(&Utc).await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("\"ERROR\",\"Test Source\",\"test message\""));

        // stats still reflect the whole buffer
        let view = stream.view().await;
        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.stats.total, 8);
        assert_eq!(view.stats.errors, 2);
    }

    #[tokio::test]
    async fn search_matching_nothing_exports_header_only() {
        let stream = seeded(9);
        stream.set_filter("no such text", LevelFilter::All).await;
        assert!(stream.filtered().await.is_empty());
        assert_eq!(
            stream.export_csv_in(&Utc).await.unwrap(),
            "\"Timestamp\",\"Level\",\"Source\",\"Message\""
        );
    }

    #[tokio::test]
    async fn generated_ids_continue_after_history() {
        let stream = seeded(10);
        let entry = stream.generate_entry().await;
        assert_eq!(entry.id, LogId(6));
    }
}

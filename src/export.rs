//! CSV export of the monitoring view.
//!
//! Every field is wrapped in double quotes and rows are joined with `\n`
//! without a trailing newline. Embedded double quotes are doubled.

use crate::error::Result;
use crate::types::LogEntry;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use log::info;
use std::fmt::Display;
use std::path::{Path, PathBuf};

pub const CSV_CONTENT_TYPE: &str = "text/csv";

const HEADER: [&str; 4] = ["Timestamp", "Level", "Source", "Message"];

/// Human-readable timestamp, e.g. `1/1/2024, 12:00:00 AM`.
pub fn format_timestamp<Tz>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp
        .with_timezone(tz)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

/// Serializes `entries` with timestamps rendered in `tz`.
pub fn to_csv_in<'a, Tz>(entries: impl IntoIterator<Item = &'a LogEntry>, tz: &Tz) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut writer = csv_writer();
    writer.write_record(HEADER)?;
    for entry in entries {
        writer.write_record([
            format_timestamp(&entry.timestamp, tz),
            entry.level.as_str().to_uppercase(),
            entry.source.clone(),
            entry.message.clone(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut csv = String::from_utf8(bytes)?;
    // rows are separated, not terminated
    if csv.ends_with('\n') {
        csv.pop();
    }
    Ok(csv)
}

/// Serializes `entries` with timestamps rendered in the local zone.
pub fn to_csv<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> Result<String> {
    to_csv_in(entries, &Local)
}

pub fn file_name(date: NaiveDate) -> String {
    format!("monitoring-logs-{}.csv", date.format("%Y-%m-%d"))
}

/// Writes `csv` into `dir` under today's (UTC) export file name.
pub async fn save(dir: &Path, csv: &str) -> Result<PathBuf> {
    save_dated(dir, csv, Utc::now().date_naive()).await
}

pub async fn save_dated(dir: &Path, csv: &str, date: NaiveDate) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name(date));
    tokio::fs::write(&path, csv).await?;
    info!(
        "Exported {} bytes ({}) to {}",
        csv.len(),
        CSV_CONTENT_TYPE,
        path.display()
    );
    Ok(path)
}

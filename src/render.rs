use crate::error::Result;
use crate::export::format_timestamp;
use crate::types::{LogEntry, LogStats};
use crate::workflow::{Phase, WorkflowKind, WorkflowRun};
use chrono::Local;

pub fn entry_line(entry: &LogEntry) -> String {
    format!(
        "[{}] {} • {} {}",
        entry.level.as_str().to_uppercase(),
        entry.source,
        format_timestamp(&entry.timestamp, &Local),
        entry.message
    )
}

pub fn entry_json(entry: &LogEntry) -> Result<String> {
    Ok(serde_json::to_string(entry)?)
}

pub fn stats_line(shown: usize, stats: &LogStats) -> String {
    format!(
        "Showing {} of {} logs (errors: {}, warnings: {}, success: {})",
        shown, stats.total, stats.errors, stats.warnings, stats.successes
    )
}

pub fn empty_line() -> &'static str {
    "No logs match your current filters"
}

pub fn phase_line(run: &WorkflowRun, left: &Phase) -> String {
    let mut line = format!(
        "[{:>3.0}%] {} - {}",
        run.progress_percent(),
        left.name,
        left.description
    );
    if run.kind() == WorkflowKind::Failover {
        line.push_str(&format!(
            " | on-prem: {}, aws: {}",
            run.on_prem_site(),
            run.aws_site()
        ));
    }
    line
}

pub fn dashboard_line(run: &WorkflowRun) -> String {
    let status = run.dashboard();
    format!(
        "Dashboard: on-prem {}, aws {}, storage {}, network {}",
        status.on_prem, status.aws, status.storage, status.network
    )
}

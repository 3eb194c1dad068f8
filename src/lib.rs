//! Simulated hybrid-cloud disaster-recovery console: a synthetic event-log
//! stream plus canned backup and failover workflows.

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod generator;
pub mod log_stream;
pub mod render;
pub mod types;
pub mod workflow;

pub use error::{MonitorError, Result};
pub use log_stream::{LogStream, LogView};
pub use types::{LogBuffer, LogEntry, LogId, LogLevel, LogStats};

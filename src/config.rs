use crate::error::MonitorError;
use crate::filter::LevelFilter;
use crate::generator::Cadence;
use crate::types::DEFAULT_CAPACITY;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(name = "hybrid-dr-monitor", version, about)]
pub struct Cli {
    /// Path to configuration file
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Override the random seed of the log generator
    #[clap(long)]
    pub seed: Option<u64>,

    /// Console log level (error, warn, info, debug, trace)
    #[clap(long, default_value = "info")]
    pub log_level: log::LevelFilter,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream synthetic monitoring logs
    Logs(LogsArgs),
    /// Run the hybrid-cloud backup simulation
    Backup,
    /// Run the disaster-recovery failover simulation
    Failover,
}

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// How long to stream, in seconds
    #[clap(long, default_value_t = 30)]
    pub duration: u64,

    /// Case-insensitive text matched against message and source
    #[clap(long, default_value = "")]
    pub search: String,

    /// all, info, warning, error or success
    #[clap(long, default_value = "all")]
    pub level: String,

    /// Show the seeded history without starting live generation
    #[clap(long)]
    pub paused: bool,

    /// Print entries as JSON lines
    #[clap(long)]
    pub json: bool,

    /// Write the filtered view to a CSV file when done
    #[clap(long)]
    pub export: bool,
}

impl LogsArgs {
    /// Parsed after the logger is up, so an unknown level is reported.
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logs: LogsConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    pub capacity: usize,
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    pub seed: Option<u64>,
    pub export_dir: PathBuf,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            min_interval_ms: 3000,
            max_interval_ms: 5000,
            seed: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl LogsConfig {
    pub fn cadence(&self) -> Cadence {
        Cadence {
            min: Duration::from_millis(self.min_interval_ms),
            max: Duration::from_millis(self.max_interval_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub backup_step_ms: u64,
    pub failover_step_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            backup_step_ms: 2000,
            failover_step_ms: 2500,
        }
    }
}

impl SimulationConfig {
    pub fn backup_step(&self) -> Duration {
        Duration::from_millis(self.backup_step_ms)
    }

    pub fn failover_step(&self) -> Duration {
        Duration::from_millis(self.failover_step_ms)
    }
}

impl Config {
    pub fn validate(&self) -> std::result::Result<(), MonitorError> {
        if self.logs.capacity == 0 {
            return Err(MonitorError::ConfigError(
                "logs.capacity must be at least 1".to_string(),
            ));
        }
        if self.logs.min_interval_ms > self.logs.max_interval_ms {
            return Err(MonitorError::ConfigError(format!(
                "logs.min_interval_ms ({}) exceeds logs.max_interval_ms ({})",
                self.logs.min_interval_ms, self.logs.max_interval_ms
            )));
        }
        if self.simulation.backup_step_ms == 0 || self.simulation.failover_step_ms == 0 {
            return Err(MonitorError::ConfigError(
                "simulation step durations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> std::result::Result<Config, MonitorError> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => {
            let config_content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            parse_config(&config_content).context("Failed to parse config file")?
        }
        None => Config::default(),
    };

    // Apply CLI overrides
    if let Some(seed) = cli.seed {
        config.logs.seed = Some(seed);
    }

    config.validate().context("Invalid configuration")?;

    Ok(config)
}

use anyhow::{Context, Result};
use clap::Parser;
use hybrid_dr_monitor::config::{self, Command, Config, LogsArgs};
use hybrid_dr_monitor::workflow::{self, WorkflowKind, WorkflowRun};
use hybrid_dr_monitor::{export, render, LogEntry, LogId, LogStream};
use log::{info, warn};
use simple_logger::SimpleLogger;
use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};

const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = config::Cli::parse();

    SimpleLogger::new()
        .with_level(cli.log_level)
        .env()
        .init()
        .context("Failed to initialize logger")?;

    info!("Starting hybrid-dr-monitor");

    // Load configuration
    let config = config::load_config(&cli)?;
    info!("Configuration loaded successfully");

    match cli.command {
        Command::Logs(ref args) => run_logs(&config, args).await,
        Command::Backup => {
            run_workflow(WorkflowKind::Backup, config.simulation.backup_step()).await;
            Ok(())
        }
        Command::Failover => {
            run_workflow(WorkflowKind::Failover, config.simulation.failover_step()).await;
            Ok(())
        }
    }
}

fn print_entry(entry: &LogEntry, json: bool) -> Result<()> {
    if json {
        println!("{}", render::entry_json(entry)?);
    } else {
        println!("{}", render::entry_line(entry));
    }
    Ok(())
}

async fn run_logs(config: &Config, args: &LogsArgs) -> Result<()> {
    let stream = LogStream::from_config(&config.logs);
    stream.set_filter(args.search.as_str(), args.level_filter()).await;

    let initial = stream.view().await;
    if initial.entries.is_empty() {
        println!("{}", render::empty_line());
    }
    for entry in &initial.entries {
        print_entry(entry, args.json)?;
    }
    let mut last_seen = initial.entries.last().map(|e| e.id).unwrap_or(LogId(0));

    if args.paused {
        info!("Live generation disabled");
    } else {
        stream.start().await;
    }

    let deadline = sleep(Duration::from_secs(args.duration));
    tokio::pin!(deadline);
    let mut refresh = interval(REFRESH_INTERVAL);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                info!("Stream duration elapsed");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, stopping live stream");
                break;
            }
            _ = refresh.tick() => {
                let view = stream.view().await;
                for entry in view.entries.iter().filter(|e| e.id > last_seen) {
                    print_entry(entry, args.json)?;
                }
                if let Some(newest) = view.entries.last() {
                    last_seen = last_seen.max(newest.id);
                }
            }
        }
    }

    stream.stop().await;

    let view = stream.view().await;
    println!("{}", render::stats_line(view.entries.len(), &view.stats));

    if args.export {
        let csv = stream.export_csv().await?;
        let path = export::save(&config.logs.export_dir, &csv)
            .await
            .context("Failed to export logs")?;
        println!("Exported {} entries to {}", view.entries.len(), path.display());
    }

    Ok(())
}

async fn run_workflow(kind: WorkflowKind, step: Duration) {
    let mut run = WorkflowRun::new(kind);
    let total = kind.phases().len();
    println!("Running {} simulation ({} phases, {:?} each)", kind, total, step);

    let interrupted = {
        let drive = workflow::drive(&mut run, step, |run, left| {
            println!("{}", render::phase_line(run, left));
        });
        tokio::pin!(drive);
        tokio::select! {
            _ = &mut drive => false,
            _ = tokio::signal::ctrl_c() => true,
        }
    };

    if interrupted {
        warn!("Interrupted during {} simulation", kind);
        run.reset();
    }
    println!("{}", render::dashboard_line(&run));
}

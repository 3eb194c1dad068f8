//! Canned backup and failover workflows.
//!
//! Each workflow is a linear state machine over a fixed list of phases. A
//! run only moves on an explicit [`WorkflowRun::advance`]; [`drive`] feeds
//! those events from `tokio::time`, one per step interval.

use log::info;
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub name: &'static str,
    pub description: &'static str,
}

const fn phase(name: &'static str, description: &'static str) -> Phase {
    Phase { name, description }
}

pub const BACKUP_STEPS: [Phase; 6] = [
    phase("Initiating Backup", "Scanning on-premises data"),
    phase("Data Transfer", "Transferring to Storage Gateway"),
    phase("Gateway Processing", "Processing through AWS Storage Gateway"),
    phase("S3 Storage", "Storing in Amazon S3"),
    phase("Verification", "Verifying backup integrity"),
    phase("Complete", "Backup successfully completed"),
];

pub const FAILOVER_PHASES: [Phase; 7] = [
    phase("Failure Detection", "On-premises failure detected"),
    phase("Alert Generation", "Critical alerts generated"),
    phase("Failover Initiation", "Starting failover process"),
    phase("AWS DRS Activation", "Elastic Disaster Recovery activated"),
    phase("Workload Migration", "Migrating workloads to AWS"),
    phase("Verification", "Verifying failover success"),
    phase("Complete", "Failover completed successfully"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    Backup,
    Failover,
}

impl WorkflowKind {
    pub fn phases(&self) -> &'static [Phase] {
        match self {
            WorkflowKind::Backup => &BACKUP_STEPS,
            WorkflowKind::Failover => &FAILOVER_PHASES,
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowKind::Backup => f.write_str("backup"),
            WorkflowKind::Failover => f.write_str("failover"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Warning,
    Failed,
    /// Serving production traffic after failover
    Active,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Health::Healthy => "healthy",
            Health::Warning => "warning",
            Health::Failed => "failed",
            Health::Active => "active",
        };
        f.write_str(s)
    }
}

/// Health shown on the dashboard overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemStatus {
    pub on_prem: Health,
    pub aws: Health,
    pub storage: Health,
    pub network: Health,
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self {
            on_prem: Health::Healthy,
            aws: Health::Healthy,
            storage: Health::Healthy,
            network: Health::Healthy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running { step: usize },
    Complete,
}

#[derive(Debug, Clone)]
pub struct WorkflowRun {
    kind: WorkflowKind,
    state: RunState,
    on_prem_site: Health,
    aws_site: Health,
    dashboard: SystemStatus,
    failover_complete: bool,
}

impl WorkflowRun {
    pub fn new(kind: WorkflowKind) -> Self {
        Self {
            kind,
            state: RunState::Idle,
            on_prem_site: Health::Healthy,
            aws_site: Health::Healthy,
            dashboard: SystemStatus::default(),
            failover_complete: false,
        }
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    /// Number of phases already passed.
    pub fn completed_steps(&self) -> usize {
        match self.state {
            RunState::Idle => 0,
            RunState::Running { step } => step,
            RunState::Complete => self.kind.phases().len(),
        }
    }

    /// Phase currently in progress, `None` when idle or complete.
    pub fn current_phase(&self) -> Option<&'static Phase> {
        match self.state {
            RunState::Running { step } => self.kind.phases().get(step),
            _ => None,
        }
    }

    pub fn progress_percent(&self) -> f64 {
        self.completed_steps() as f64 * 100.0 / self.kind.phases().len() as f64
    }

    pub fn on_prem_site(&self) -> Health {
        self.on_prem_site
    }

    pub fn aws_site(&self) -> Health {
        self.aws_site
    }

    pub fn dashboard(&self) -> SystemStatus {
        self.dashboard
    }

    pub fn failover_complete(&self) -> bool {
        self.failover_complete
    }

    /// Starts (or restarts) the run from the first phase.
    pub fn start(&mut self) {
        self.clear();
        self.state = RunState::Running { step: 0 };
        info!("{} simulation started", self.kind);
    }

    /// Returns to idle and reports all components healthy.
    pub fn reset(&mut self) {
        self.clear();
        self.state = RunState::Idle;
        info!("{} simulation reset", self.kind);
    }

    fn clear(&mut self) {
        self.on_prem_site = Health::Healthy;
        self.aws_site = Health::Healthy;
        self.failover_complete = false;
        self.dashboard = SystemStatus::default();
    }

    /// Elapsed-step event. Leaves the current phase and returns it, or
    /// `None` when the run is not in progress.
    pub fn advance(&mut self) -> Option<&'static Phase> {
        let RunState::Running { step } = self.state else {
            return None;
        };
        let phases = self.kind.phases();
        let left = phases.get(step)?;

        if self.kind == WorkflowKind::Failover {
            self.apply_failover_effects(step);
        }

        let next = step + 1;
        self.state = if next >= phases.len() {
            info!("{} simulation complete", self.kind);
            RunState::Complete
        } else {
            RunState::Running { step: next }
        };
        Some(left)
    }

    fn apply_failover_effects(&mut self, leaving: usize) {
        match leaving {
            1 => {
                self.on_prem_site = Health::Failed;
                self.dashboard = SystemStatus {
                    on_prem: Health::Failed,
                    aws: Health::Healthy,
                    storage: Health::Warning,
                    network: Health::Warning,
                };
            }
            4 => self.aws_site = Health::Active,
            n if n >= 6 => {
                self.failover_complete = true;
                self.dashboard = SystemStatus {
                    on_prem: Health::Failed,
                    aws: Health::Healthy,
                    storage: Health::Healthy,
                    network: Health::Healthy,
                };
            }
            _ => {}
        }
    }
}

/// Starts `run` and advances it once per `step` until complete, calling
/// `observe` after every transition. Dropping the future cancels the run
/// at its current phase.
pub async fn drive<F>(run: &mut WorkflowRun, step: Duration, mut observe: F)
where
    F: FnMut(&WorkflowRun, &Phase),
{
    run.start();
    while run.is_running() {
        sleep(step).await;
        if let Some(left) = run.advance() {
            info!(
                "{}: {} done ({:.0}%)",
                run.kind(),
                left.name,
                run.progress_percent()
            );
            observe(run, left);
        }
    }
}

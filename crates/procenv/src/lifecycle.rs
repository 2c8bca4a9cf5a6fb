//! The supervisor lifecycle: preboot, launch, monitor, wait.

use crate::launcher::Launcher;
use checks::{Check, MainLoopScheduler, MonitorSet, PrebootRunner};
use common::{Error, Reporter, Result};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Exit code used when preboot fails and nothing overrides it
pub const DEFAULT_ABORT_EXIT_CODE: i32 = 40;

/// Lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    PrebootValidating,
    Aborted,
    Launching,
    Running,
    Terminated,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Idle => "IDLE",
            LifecycleState::PrebootValidating => "PREBOOT_VALIDATING",
            LifecycleState::Aborted => "ABORTED",
            LifecycleState::Launching => "LAUNCHING",
            LifecycleState::Running => "RUNNING",
            LifecycleState::Terminated => "TERMINATED",
        };
        write!(f, "{}", s)
    }
}

/// How a lifecycle run ended.
#[derive(Debug)]
pub enum LifecycleResult {
    /// Preboot failed; the application was never launched
    Aborted { code: i32, failures: usize },
    /// The application ran and exited. Monitors may still be running.
    Exited { code: i32, monitors: MonitorSet },
}

impl LifecycleResult {
    /// Exit code for the supervisor process
    pub fn exit_code(&self) -> i32 {
        match self {
            LifecycleResult::Aborted { code, .. } | LifecycleResult::Exited { code, .. } => *code,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, LifecycleResult::Aborted { .. })
    }
}

/// Drives one run of the supervised application.
///
/// `Idle -> PrebootValidating -> Aborted` when any preboot check fails,
/// otherwise `Idle -> PrebootValidating -> Launching -> Running -> Terminated`.
/// Only the application's exit ends `Running`; monitors never do.
pub struct Lifecycle {
    checks: Vec<Box<dyn Check>>,
    procfile: Option<PathBuf>,
    launcher: Arc<dyn Launcher>,
    reporter: Reporter,
    abort_exit_code: i32,
    state: LifecycleState,
}

impl Lifecycle {
    pub fn new(
        checks: Vec<Box<dyn Check>>,
        procfile: Option<PathBuf>,
        launcher: Arc<dyn Launcher>,
        reporter: Reporter,
    ) -> Self {
        Self {
            checks,
            procfile,
            launcher,
            reporter,
            abort_exit_code: DEFAULT_ABORT_EXIT_CODE,
            state: LifecycleState::Idle,
        }
    }

    /// Override the exit code used when preboot fails
    pub fn with_abort_exit_code(mut self, code: i32) -> Self {
        self.abort_exit_code = code;
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    fn transition(&mut self, next: LifecycleState) {
        debug!(from = %self.state, to = %next, "Lifecycle transition");
        self.state = next;
    }

    /// Run preboot, then launch the application and its monitors.
    ///
    /// Returns once the application exits, or right after preboot when any
    /// check failed. A preboot check returning `Err` or a failed launch is
    /// returned as an error.
    pub async fn run(mut self) -> Result<LifecycleResult> {
        self.transition(LifecycleState::PrebootValidating);
        let report = PrebootRunner::new(self.reporter.clone()).run(&self.checks)?;

        if !report.passed() {
            self.transition(LifecycleState::Aborted);
            return Ok(LifecycleResult::Aborted {
                code: self.abort_exit_code,
                failures: report.failures.len(),
            });
        }

        self.transition(LifecycleState::Launching);
        let procfile = self
            .procfile
            .clone()
            .ok_or_else(|| Error::launch("no Procfile to run"))?;
        self.reporter.log(
            "PE10",
            format!("Running application with Procfile \"{}\"", procfile.display()),
        );

        let mut app = self.launcher.launch(&procfile).await?;
        let app_task = tokio::spawn(async move { app.wait().await });

        let monitors = std::mem::take(&mut self.checks)
            .into_iter()
            .filter_map(|check| check.into_monitor())
            .collect();
        let monitors = MainLoopScheduler::new(self.reporter.clone()).spawn(monitors);
        self.transition(LifecycleState::Running);
        info!(monitors = monitors.len(), "Application running");

        let code = app_task
            .await
            .map_err(|e| Error::launch(format!("application task failed: {}", e)))?
            .map_err(|e| match e {
                Error::Io(io) => Error::launch(format!("waiting for application: {}", io)),
                other => other,
            })?;

        self.transition(LifecycleState::Terminated);
        self.reporter
            .log("PE12", format!("Application exited with status {}", code));

        Ok(LifecycleResult::Exited { code, monitors })
    }
}

//! Main loop scheduling for monitoring checks.
//!
//! Every monitor gets its own task with its own period and state; nothing is
//! shared between them. Tasks are fire-and-forget: the scheduler hands back a
//! [`MonitorSet`] of join handles that nobody is required to await, and
//! dropping it detaches the tasks without cancelling them.

use crate::check::Monitor;
use crate::types::{MonitorExit, Tick};
use common::Reporter;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A zero period would spin the loop
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A running monitor task
#[derive(Debug)]
pub struct MonitorTask {
    /// Name of the monitored check
    pub name: String,
    /// Handle to the task
    pub handle: JoinHandle<MonitorExit>,
}

/// Set of background monitor tasks.
///
/// Dropping the set abandons the tasks; they keep running until they stop
/// themselves or the runtime shuts down.
#[derive(Debug, Default)]
pub struct MonitorSet {
    tasks: Vec<MonitorTask>,
}

impl MonitorSet {
    /// Number of tasks ever spawned into this set
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Names of the monitored checks, in spawn order
    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    /// Number of tasks that have not finished yet
    pub fn running(&self) -> usize {
        self.tasks.iter().filter(|t| !t.handle.is_finished()).count()
    }

    /// Take the underlying tasks
    pub fn into_tasks(self) -> Vec<MonitorTask> {
        self.tasks
    }

    /// Detach every task without waiting for or cancelling it
    pub fn abandon(self) {
        debug!(tasks = self.tasks.len(), running = self.running(), "Abandoning monitor tasks");
    }
}

/// Spawns one independent task per monitor.
pub struct MainLoopScheduler {
    reporter: Reporter,
}

impl MainLoopScheduler {
    /// Create a new scheduler
    pub fn new(reporter: Reporter) -> Self {
        Self { reporter }
    }

    /// Start a task for each monitor
    pub fn spawn(&self, monitors: Vec<Box<dyn Monitor>>) -> MonitorSet {
        let tasks = monitors
            .into_iter()
            .map(|monitor| {
                let name = monitor.name().to_string();
                let reporter = self.reporter.clone();
                debug!(check = %name, period_ms = monitor.period().as_millis(), "Spawning monitor");
                MonitorTask {
                    name,
                    handle: tokio::spawn(run_monitor(monitor, reporter)),
                }
            })
            .collect();

        MonitorSet { tasks }
    }
}

/// Drive one monitor until it stops itself.
///
/// Evaluates the static gate once, runs setup once, then alternates sleeping
/// for a full period and ticking, so a slow tick never eats into the rest
/// before the next one. A failed tick is reported under `PE41` and the loop carries on; only
/// [`Tick::Stop`] ends it.
pub async fn run_monitor(mut monitor: Box<dyn Monitor>, reporter: Reporter) -> MonitorExit {
    let name = monitor.name().to_string();

    if !monitor.should_run() {
        debug!(check = %name, "Monitor gate closed");
        return MonitorExit::Gated;
    }

    if let Err(e) = monitor.setup().await {
        reporter.log(
            "PE42",
            format!("Check {name}.setup() failed: {}", e.detail()),
        );
        return MonitorExit::SetupFailed;
    }

    let period = monitor.period().max(MIN_PERIOD);

    let mut ticks = 0u64;
    loop {
        tokio::time::sleep(period).await;
        ticks += 1;

        match monitor.tick().await {
            Ok(Tick::Continue) => {}
            Ok(Tick::Stop) => {
                info!(check = %name, ticks, "Monitor stopped");
                return MonitorExit::Stopped { ticks };
            }
            Err(e) => {
                reporter.log(
                    "PE41",
                    format!("Check {name}.tick() failed: {}", e.detail()),
                );
            }
        }
    }
}

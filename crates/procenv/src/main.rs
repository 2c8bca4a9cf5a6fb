//! Procenv binary

use checks::{CheckContext, CheckRegistry, Environment, detect_procfile};
use clap::Parser;
use common::Reporter;
use procenv::{Cli, Config, Lifecycle, LifecycleResult, ProcessLauncher};
use std::sync::Arc;

/// Exit code for errors that stop procenv before or around the launch
const STARTUP_ERROR_EXIT_CODE: i32 = 1;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let reporter = Reporter::stderr();

    let code = match run(&cli, reporter.clone()).await {
        Ok(result) => {
            let code = result.exit_code();
            if let LifecycleResult::Exited { monitors, .. } = result {
                monitors.abandon();
            }
            code
        }
        Err(e) => {
            reporter.log(e.code(), e.to_string());
            STARTUP_ERROR_EXIT_CODE
        }
    };

    std::process::exit(code);
}

async fn run(cli: &Cli, reporter: Reporter) -> common::Result<LifecycleResult> {
    // Load configuration first (needed for logging settings)
    let config = Config::load(cli.config.as_deref())?;
    config.logging.init();
    tracing::debug!(?config, "Configuration loaded");

    reporter.log("PE00", "👋 Welcome to Procenv");

    let env = Environment::from_process();
    let root = std::env::current_dir()?;
    let procfile = detect_procfile(env.procfile.as_deref(), &root, &reporter);

    let ctx = CheckContext::new(env, procfile.clone(), reporter.clone())
        .with_interval(config.checks.interval);
    let checks = CheckRegistry::with_defaults().resolve_all(&cli.checks, &ctx)?;

    let launcher = Arc::new(ProcessLauncher::from_settings(&config.launcher));

    Lifecycle::new(checks, procfile, launcher, reporter)
        .with_abort_exit_code(config.lifecycle.abort_exit_code)
        .run()
        .await
}

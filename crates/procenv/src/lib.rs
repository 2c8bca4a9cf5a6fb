//! Procenv runs a Procfile-based application behind a set of environment
//! checks.
//!
//! Preboot checks run first and may veto the launch. Once they all pass the
//! application starts through a [`Launcher`] and monitoring checks tick in the
//! background until it exits. See [`Lifecycle`] for the state machine.

pub mod cli;
pub mod config;
pub mod launcher;
pub mod lifecycle;

pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use launcher::{Application, Launcher, ProcessLauncher};
pub use lifecycle::{Lifecycle, LifecycleResult, LifecycleState};

//! Environment checks run around a Procfile-based application.
//!
//! A check can validate the environment once before launch (preboot), watch
//! it periodically while the application runs (monitor), or both:
//! - [`PrebootRunner`] runs every preboot in order, reports every failure,
//!   and tells the caller whether startup may proceed
//! - [`MainLoopScheduler`] gives every monitor its own task and period
//! - [`CheckRegistry`] maps textual identifiers to check factories
//!
//! # Example
//!
//! ```no_run
//! use checks::{CheckContext, CheckRegistry, Environment, MainLoopScheduler, PrebootRunner};
//! use common::Reporter;
//!
//! # async fn example() -> common::Result<()> {
//! let reporter = Reporter::stderr();
//! let ctx = CheckContext::new(Environment::from_process(), None, reporter.clone());
//! let checks = CheckRegistry::with_defaults().resolve_all(&checks::DEFAULT_CHECKS, &ctx)?;
//!
//! if PrebootRunner::new(reporter.clone()).run(&checks)?.passed() {
//!     let monitors = checks.into_iter().filter_map(|c| c.into_monitor()).collect();
//!     let _tasks = MainLoopScheduler::new(reporter).spawn(monitors);
//! }
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod checkers;
pub mod context;
pub mod manifest;
pub mod monitor;
pub mod preboot;
pub mod registry;
pub mod types;

pub use check::{Check, Monitor, Preboot};
pub use checkers::{DatabaseUrlCheck, PortBindCheck, ProcfileCheck, RedisUrlCheck};
pub use context::{CheckContext, Environment};
pub use manifest::detect_procfile;
pub use monitor::{MainLoopScheduler, MonitorSet, MonitorTask};
pub use preboot::{PrebootFailure, PrebootReport, PrebootRunner};
pub use registry::{CheckRegistry, DEFAULT_CHECKS, LEGACY_ALIASES};
pub use types::{CheckOutcome, FailureReason, MonitorExit, Tick};

//! The check abstraction.
//!
//! A check has a name and up to two capabilities:
//! - [`Preboot`]: a one-shot validation run before the application launches.
//!   A check without it passes automatically.
//! - [`Monitor`]: a periodic observation running alongside the application.
//!   A check without it never runs concurrently.
//!
//! Capabilities are exposed through [`Check::as_preboot`] and
//! [`Check::into_monitor`], so which ones a check has is fixed by its type.

use crate::types::{CheckOutcome, Tick};
use async_trait::async_trait;
use common::Result;
use std::time::Duration;

/// A unit of validation and/or monitoring.
pub trait Check: Send {
    /// Type name used in operator messages, e.g. `PortBindCheck`
    fn name(&self) -> &str;

    /// The preboot capability, if this check has one
    fn as_preboot(&self) -> Option<&dyn Preboot> {
        None
    }

    /// Hand the monitor capability over to the scheduler, if this check has one
    fn into_monitor(self: Box<Self>) -> Option<Box<dyn Monitor>> {
        None
    }
}

/// One-shot validation before launch.
///
/// Preboot runs synchronously; a slow implementation delays startup.
pub trait Preboot {
    /// Validate the environment.
    ///
    /// `Ok(CheckOutcome::Fail(_))` is a reported failure. `Err(_)` means the
    /// check itself broke and aborts startup as a fatal error.
    fn preboot(&self) -> Result<CheckOutcome>;
}

/// Periodic monitoring for the life of the application.
#[async_trait]
pub trait Monitor: Check {
    /// Time between ticks
    fn period(&self) -> Duration;

    /// Static gate, evaluated once when the monitor task starts.
    ///
    /// When it returns false neither `setup` nor `tick` is ever called.
    fn should_run(&self) -> bool {
        true
    }

    /// Runs once before the first period elapses
    async fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Runs once per period.
    ///
    /// Returning an error reports the failure and keeps the loop going; a
    /// failed tick must leave the monitor usable for the next one.
    async fn tick(&mut self) -> Result<Tick>;
}

//! Check outcome types.

use std::fmt;

/// Why a preboot check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    /// Short code for scripted grepping, e.g. `PF40`
    pub code: String,
    /// Human readable explanation
    pub message: String,
}

/// Result of a preboot check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The check passed
    Pass,
    /// The check failed, with or without a reason
    Fail(Option<FailureReason>),
}

impl CheckOutcome {
    /// Create a failure with a code and message
    pub fn fail(code: impl Into<String>, message: impl Into<String>) -> Self {
        CheckOutcome::Fail(Some(FailureReason {
            code: code.into(),
            message: message.into(),
        }))
    }

    /// Create a failure carrying no reason
    pub fn fail_without_reason() -> Self {
        CheckOutcome::Fail(None)
    }

    /// Check if the outcome is a pass
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckOutcome::Pass)
    }
}

impl From<bool> for CheckOutcome {
    fn from(passed: bool) -> Self {
        if passed {
            CheckOutcome::Pass
        } else {
            CheckOutcome::Fail(None)
        }
    }
}

/// What a monitor asks of its loop after a successful tick.
///
/// Errors travel separately as `Err(_)`, so a tick resolves to one of
/// continue, stop or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Keep monitoring
    Continue,
    /// Monitoring is complete; leave the loop without reporting a failure
    Stop,
}

/// How a monitor task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    /// The static gate was closed, setup and tick never ran
    Gated,
    /// Setup failed, the loop never started
    SetupFailed,
    /// The monitor stopped itself after `ticks` ticks
    Stopped { ticks: u64 },
}

impl fmt::Display for MonitorExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorExit::Gated => write!(f, "GATED"),
            MonitorExit::SetupFailed => write!(f, "SETUP_FAILED"),
            MonitorExit::Stopped { ticks } => write!(f, "STOPPED after {ticks} ticks"),
        }
    }
}

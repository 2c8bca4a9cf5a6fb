//! Preboot phase: run every preboot check in order, then decide.

use crate::check::Check;
use crate::types::CheckOutcome;
use common::{Reporter, Result};
use tracing::debug;

/// A preboot failure attributed to its check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrebootFailure {
    /// Name of the failed check
    pub check: String,
    /// Code the failure was reported under
    pub code: String,
    /// Full operator line text
    pub message: String,
}

/// Result of a full preboot pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrebootReport {
    /// Number of checks whose preboot ran
    pub ran: usize,
    /// Failures in check order
    pub failures: Vec<PrebootFailure>,
}

impl PrebootReport {
    /// True when no preboot check failed
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs preboot checks sequentially.
///
/// Every check runs even after a failure so the operator sees every problem
/// in one pass. Emits a `PE01` banner first and, if anything failed, a single
/// `PE11` summary last.
pub struct PrebootRunner {
    reporter: Reporter,
}

impl PrebootRunner {
    /// Create a new preboot runner
    pub fn new(reporter: Reporter) -> Self {
        Self { reporter }
    }

    /// Run the preboot capability of every check, in input order.
    ///
    /// A check returning `Err` stops the pass immediately and the error is
    /// returned as is; that is a broken check, not a reported failure.
    pub fn run(&self, checks: &[Box<dyn Check>]) -> Result<PrebootReport> {
        self.reporter
            .log("PE01", "Running preboot checks for your application");

        let mut report = PrebootReport::default();

        for check in checks {
            let Some(preboot) = check.as_preboot() else {
                debug!(check = check.name(), "No preboot capability, skipping");
                continue;
            };

            report.ran += 1;
            let outcome = preboot.preboot()?;

            if let CheckOutcome::Fail(reason) = outcome {
                let (code, message) = match reason {
                    Some(reason) => (
                        reason.code,
                        format!("Check {}.preboot() failed: {}", check.name(), reason.message),
                    ),
                    None => (
                        "PE40".to_string(),
                        format!("Check {}.preboot() failed", check.name()),
                    ),
                };

                self.reporter.log(&code, message.as_str());
                report.failures.push(PrebootFailure {
                    check: check.name().to_string(),
                    code,
                    message,
                });
            }
        }

        if !report.passed() {
            self.reporter
                .log("PE11", "Exiting because at least one preboot check failed");
        }

        debug!(
            ran = report.ran,
            failures = report.failures.len(),
            "Preboot checks finished"
        );
        Ok(report)
    }
}

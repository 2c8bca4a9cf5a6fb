//! Inputs shared by every check at construction time.

use common::Reporter;
use std::path::PathBuf;
use std::time::Duration;

/// Variable naming a Procfile to use instead of `./Procfile`
pub const PROCFILE_VAR: &str = "PROCFILE";
/// Variable naming the port the application should bind
pub const PORT_VAR: &str = "PORT";
/// Variable naming the application's database
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Variable naming the application's Redis instance
pub const REDIS_URL_VAR: &str = "REDIS_URL";

/// Default monitor period for catalog checks
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Snapshot of the environment variables checks care about.
///
/// Taken once at startup; checks never re-read the process environment.
/// Empty values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub procfile: Option<String>,
    pub port: Option<String>,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
}

impl Environment {
    /// Snapshot the current process environment
    pub fn from_process() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary lookup function
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            procfile: get(PROCFILE_VAR),
            port: get(PORT_VAR),
            database_url: get(DATABASE_URL_VAR),
            redis_url: get(REDIS_URL_VAR),
        }
    }
}

/// Everything a check factory may need.
#[derive(Debug, Clone)]
pub struct CheckContext {
    /// Environment snapshot
    pub env: Environment,
    /// Resolved manifest, `None` when no Procfile was found
    pub procfile: Option<PathBuf>,
    /// Monitor period for catalog checks
    pub interval: Duration,
    /// Operator message channel
    pub reporter: Reporter,
}

impl CheckContext {
    /// Create a context with the default monitor period
    pub fn new(env: Environment, procfile: Option<PathBuf>, reporter: Reporter) -> Self {
        Self {
            env,
            procfile,
            interval: DEFAULT_INTERVAL,
            reporter,
        }
    }

    /// Override the monitor period
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

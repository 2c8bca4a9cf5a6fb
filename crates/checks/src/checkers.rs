//! Built-in checks.

use crate::check::{Check, Monitor, Preboot};
use crate::context::{CheckContext, PORT_VAR};
use crate::types::{CheckOutcome, Tick};
use async_trait::async_trait;
use common::{Error, Reporter, Result};
use std::io;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::debug;

/// Fails preboot when there is no Procfile to run.
pub struct ProcfileCheck {
    procfile: Option<PathBuf>,
}

impl ProcfileCheck {
    /// Create a new Procfile check for an already resolved manifest
    pub fn new(procfile: Option<PathBuf>) -> Self {
        Self { procfile }
    }

    pub fn from_context(ctx: &CheckContext) -> Result<Self> {
        Ok(Self::new(ctx.procfile.clone()))
    }
}

impl Check for ProcfileCheck {
    fn name(&self) -> &str {
        "ProcfileCheck"
    }

    fn as_preboot(&self) -> Option<&dyn Preboot> {
        Some(self)
    }
}

impl Preboot for ProcfileCheck {
    fn preboot(&self) -> Result<CheckOutcome> {
        if self.procfile.is_none() {
            return Ok(CheckOutcome::fail(
                "PF40",
                "Cannot find a Procfile to run your application.",
            ));
        }

        Ok(CheckOutcome::Pass)
    }
}

/// Tells the operator which database the application will use.
pub struct DatabaseUrlCheck {
    url: Option<String>,
    reporter: Reporter,
}

impl DatabaseUrlCheck {
    /// Create a new database URL check
    pub fn new(url: Option<String>, reporter: Reporter) -> Self {
        Self { url, reporter }
    }

    pub fn from_context(ctx: &CheckContext) -> Result<Self> {
        Ok(Self::new(ctx.env.database_url.clone(), ctx.reporter.clone()))
    }
}

impl Check for DatabaseUrlCheck {
    fn name(&self) -> &str {
        "DatabaseURLCheck"
    }

    fn as_preboot(&self) -> Option<&dyn Preboot> {
        Some(self)
    }
}

impl Preboot for DatabaseUrlCheck {
    fn preboot(&self) -> Result<CheckOutcome> {
        if let Some(url) = &self.url {
            self.reporter.log(
                "DB10",
                format!("Your application is expected to connect to its database at \"{url}\"."),
            );
        }

        Ok(CheckOutcome::Pass)
    }
}

/// Tells the operator which Redis instance the application will use.
pub struct RedisUrlCheck {
    url: Option<String>,
    reporter: Reporter,
}

impl RedisUrlCheck {
    /// Create a new Redis URL check
    pub fn new(url: Option<String>, reporter: Reporter) -> Self {
        Self { url, reporter }
    }

    pub fn from_context(ctx: &CheckContext) -> Result<Self> {
        Ok(Self::new(ctx.env.redis_url.clone(), ctx.reporter.clone()))
    }
}

impl Check for RedisUrlCheck {
    fn name(&self) -> &str {
        "RedisURLCheck"
    }

    fn as_preboot(&self) -> Option<&dyn Preboot> {
        Some(self)
    }
}

impl Preboot for RedisUrlCheck {
    fn preboot(&self) -> Result<CheckOutcome> {
        if let Some(url) = &self.url {
            self.reporter.log(
                "RD10",
                format!("Your application is expected to connect to Redis \"{url}\"."),
            );
        }

        Ok(CheckOutcome::Pass)
    }
}

/// Watches that the application binds the port it was given.
///
/// Gated on `PORT` being set. Each tick tries to bind the port itself: while
/// that succeeds the application is not listening and a `PB40` line is
/// logged; once the port is taken the check stops.
pub struct PortBindCheck {
    port: Option<u16>,
    interval: Duration,
    reporter: Reporter,
    misses: u64,
}

impl PortBindCheck {
    /// Create a new port bind check. Port 0 counts as unset.
    pub fn new(port: Option<u16>, interval: Duration, reporter: Reporter) -> Self {
        Self {
            port: port.filter(|p| *p != 0),
            interval,
            reporter,
            misses: 0,
        }
    }

    pub fn from_context(ctx: &CheckContext) -> Result<Self> {
        let port = ctx
            .env
            .port
            .as_deref()
            .map(|raw| {
                raw.trim().parse::<u16>().map_err(|_| {
                    Error::config(format!("{PORT_VAR} must be a port number, got \"{raw}\""))
                })
            })
            .transpose()?;

        Ok(Self::new(port, ctx.interval, ctx.reporter.clone()))
    }

    /// Configured port, if any
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Number of ticks that found the port unbound
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Whether something is already listening on `port` on any interface.
pub async fn port_in_use(port: u16) -> io::Result<bool> {
    match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
        Ok(_listener) => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => Ok(true),
        Err(e) => Err(e),
    }
}

impl Check for PortBindCheck {
    fn name(&self) -> &str {
        "PortBindCheck"
    }

    fn as_preboot(&self) -> Option<&dyn Preboot> {
        Some(self)
    }

    fn into_monitor(self: Box<Self>) -> Option<Box<dyn Monitor>> {
        Some(self)
    }
}

impl Preboot for PortBindCheck {
    fn preboot(&self) -> Result<CheckOutcome> {
        if let Some(port) = self.port {
            self.reporter.log(
                "PB10",
                format!("Application is expected to bind to port {port}."),
            );
        }

        Ok(CheckOutcome::Pass)
    }
}

#[async_trait]
impl Monitor for PortBindCheck {
    fn period(&self) -> Duration {
        self.interval
    }

    fn should_run(&self) -> bool {
        self.port.is_some()
    }

    async fn tick(&mut self) -> Result<Tick> {
        let Some(port) = self.port else {
            return Ok(Tick::Stop);
        };

        if port_in_use(port)
            .await
            .map_err(|e| Error::check(self.name(), format!("probing port {port}: {e}")))?
        {
            debug!(port, misses = self.misses, "Application bound its port");
            return Ok(Tick::Stop);
        }

        self.misses += 1;
        self.reporter.log(
            "PB40",
            format!("Application is not binding to port {port}."),
        );
        Ok(Tick::Continue)
    }
}

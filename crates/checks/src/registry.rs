//! Maps check identifiers to factories.

use crate::check::Check;
use crate::checkers::{DatabaseUrlCheck, PortBindCheck, ProcfileCheck, RedisUrlCheck};
use crate::context::CheckContext;
use common::{Error, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Builds a check from the shared context
pub type CheckFactory = Box<dyn Fn(&CheckContext) -> Result<Box<dyn Check>> + Send + Sync>;

/// Identifier of [`ProcfileCheck`]
pub const PROCFILE: &str = "procfile";
/// Identifier of [`PortBindCheck`]
pub const PORT_BIND: &str = "port-bind";
/// Identifier of [`DatabaseUrlCheck`]
pub const DATABASE_URL: &str = "database-url";
/// Identifier of [`RedisUrlCheck`]
pub const REDIS_URL: &str = "redis-url";

/// Checks run when none are requested explicitly
pub const DEFAULT_CHECKS: [&str; 4] = [PROCFILE, PORT_BIND, DATABASE_URL, REDIS_URL];

/// Dotted import paths earlier releases accepted for `--check`
pub const LEGACY_ALIASES: [(&str, &str); 4] = [
    ("procenv.checks.ProcfileCheck", PROCFILE),
    ("procenv.checks.PortBindCheck", PORT_BIND),
    ("procenv.checks.DatabaseURLCheck", DATABASE_URL),
    ("procenv.checks.RedisURLCheck", REDIS_URL),
];

/// Registry of known checks.
pub struct CheckRegistry {
    factories: BTreeMap<String, CheckFactory>,
    aliases: BTreeMap<String, String>,
}

impl CheckRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }

    /// Create a registry holding the built-in catalog
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PROCFILE, |ctx| Ok(Box::new(ProcfileCheck::from_context(ctx)?)));
        registry.register(PORT_BIND, |ctx| Ok(Box::new(PortBindCheck::from_context(ctx)?)));
        registry.register(DATABASE_URL, |ctx| {
            Ok(Box::new(DatabaseUrlCheck::from_context(ctx)?))
        });
        registry.register(REDIS_URL, |ctx| Ok(Box::new(RedisUrlCheck::from_context(ctx)?)));
        for (alias, id) in LEGACY_ALIASES {
            registry.alias(alias, id);
        }
        registry
    }

    /// Register a factory, replacing any previous one under `id`
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(&CheckContext) -> Result<Box<dyn Check>> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
    }

    /// Make `alias` resolve to whatever is registered under `id`
    pub fn alias(&mut self, alias: impl Into<String>, id: impl Into<String>) {
        self.aliases.insert(alias.into(), id.into());
    }

    /// Known identifiers without aliases, sorted
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the check registered under `id`
    pub fn resolve(&self, id: &str, ctx: &CheckContext) -> Result<Box<dyn Check>> {
        let target = self.aliases.get(id).map(String::as_str).unwrap_or(id);
        let factory = self
            .factories
            .get(target)
            .ok_or_else(|| Error::InvalidCheckIdentifier(id.to_string()))?;
        let check = factory(ctx)?;
        debug!(id, check = check.name(), "Resolved check");
        Ok(check)
    }

    /// Build every check in `ids`, in order. Fails on the first bad identifier.
    pub fn resolve_all<S: AsRef<str>>(
        &self,
        ids: &[S],
        ctx: &CheckContext,
    ) -> Result<Vec<Box<dyn Check>>> {
        ids.iter().map(|id| self.resolve(id.as_ref(), ctx)).collect()
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

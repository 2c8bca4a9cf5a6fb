//! Diagnostic logging for Procenv components.
//!
//! Operator-facing lines go through [`crate::message`]; this module only wires
//! up `tracing` for internal diagnostics. Both write to stderr.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default level when neither RUST_LOG nor the config sets one.
pub const DEFAULT_LEVEL: &str = "warn";

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize tracing with human readable output.
///
/// Uses the RUST_LOG environment variable to control log levels, falling
/// back to `level`.
pub fn init(level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter(level))
        .init();
}

/// Initialize tracing with JSON formatting (useful for structured logging).
pub fn init_json(level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .with(filter(level))
        .init();
}

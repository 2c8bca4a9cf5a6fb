//! Common error types for Procenv components.

use std::fmt;

/// A specialized Result type for Procenv operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for Procenv operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Check identifier \"{0}\" does not resolve to a known check")]
    InvalidCheckIdentifier(String),

    #[error("Check {check} raised an error: {message}")]
    Check { check: String, message: String },

    #[error("Failed to launch application: {0}")]
    Launch(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl fmt::Display) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new error raised from inside a check.
    pub fn check(check: impl Into<String>, msg: impl fmt::Display) -> Self {
        Error::Check {
            check: check.into(),
            message: msg.to_string(),
        }
    }

    /// Create a new launch error.
    pub fn launch(msg: impl fmt::Display) -> Self {
        Error::Launch(msg.to_string())
    }

    /// Error text without the check attribution.
    pub fn detail(&self) -> String {
        match self {
            Error::Check { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Operator message code used when this error aborts the run.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Check { .. } => "PE21",
            Error::Launch(_) => "PE22",
            Error::Io(_) | Error::Config(_) | Error::InvalidCheckIdentifier(_) => "PE20",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidCheckIdentifier("nope".to_string());
        assert_eq!(
            err.to_string(),
            "Check identifier \"nope\" does not resolve to a known check"
        );

        let err = Error::check("PortBindCheck", "boom");
        assert_eq!(err.to_string(), "Check PortBindCheck raised an error: boom");
        assert_eq!(err.detail(), "boom");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::config("bad").code(), "PE20");
        assert_eq!(Error::InvalidCheckIdentifier("x".into()).code(), "PE20");
        assert_eq!(Error::check("X", "y").code(), "PE21");
        assert_eq!(Error::launch("z").code(), "PE22");
    }
}

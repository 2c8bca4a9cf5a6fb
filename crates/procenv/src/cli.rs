//! Command line interface.

use checks::DEFAULT_CHECKS;
use clap::Parser;
use std::path::PathBuf;

/// Procenv lets you run, manage and monitor Procfile-based applications
#[derive(Parser, Debug, Clone)]
#[command(name = "procenv", version, about, long_about = None)]
pub struct Cli {
    /// Check to use when running the application. Repeat for more than one.
    #[arg(
        short = 'c',
        long = "check",
        value_name = "ID",
        default_values_t = DEFAULT_CHECKS.map(String::from)
    )]
    pub checks: Vec<String>,

    /// Configuration file, instead of the default search paths
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_checks() {
        let cli = Cli::try_parse_from(["procenv"]).unwrap();
        assert_eq!(
            cli.checks,
            vec!["procfile", "port-bind", "database-url", "redis-url"]
        );
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_explicit_checks_replace_defaults() {
        let cli = Cli::try_parse_from([
            "procenv",
            "-c",
            "procfile",
            "--check",
            "redis-url",
            "--config",
            "/etc/procenv/custom.yaml",
        ])
        .unwrap();

        assert_eq!(cli.checks, vec!["procfile", "redis-url"]);
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("/etc/procenv/custom.yaml"))
        );
    }
}

//! Starting the Procfile-based application.

use crate::config::LauncherSettings;
use async_trait::async_trait;
use common::{Error, Result};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// Exit code reported when the child's status carries neither a code nor a signal
const UNKNOWN_EXIT_CODE: i32 = 1;

/// A running application.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Application: Send {
    /// Wait for the application to exit and return its exit code
    async fn wait(&mut self) -> Result<i32>;
}

/// Starts the application described by a Procfile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Start the application and return a handle to it
    async fn launch(&self, procfile: &Path) -> Result<Box<dyn Application>>;
}

/// Launches a Procfile runner as a child process.
///
/// The child is invoked as `<program> -f <procfile> <args...>` and inherits
/// stdin, stdout and stderr.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: String,
    args: Vec<String>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_settings(settings: &LauncherSettings) -> Self {
        Self::new(settings.program.clone(), settings.args.clone())
    }

    /// The command `launch` spawns for `procfile`
    pub fn command(&self, procfile: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-f")
            .arg(procfile)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::from_settings(&LauncherSettings::default())
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, procfile: &Path) -> Result<Box<dyn Application>> {
        let child = self
            .command(procfile)
            .spawn()
            .map_err(|e| Error::launch(format!("{}: {}", self.program, e)))?;

        info!(program = %self.program, pid = child.id(), "Application started");
        Ok(Box::new(ChildApplication { child }))
    }
}

/// Application running as a child process
#[derive(Debug)]
pub struct ChildApplication {
    child: Child,
}

#[async_trait]
impl Application for ChildApplication {
    async fn wait(&mut self) -> Result<i32> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| Error::launch(format!("waiting for application: {}", e)))?;
        debug!(%status, "Application exited");
        Ok(exit_code(status))
    }
}

/// Map a child's exit status to a process exit code.
///
/// A normal exit passes its code through. Death by signal maps to
/// `128 + signal`, as shells report it.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    UNKNOWN_EXIT_CODE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::path::PathBuf;

    fn argv(command: &Command) -> Vec<&OsStr> {
        let inner = command.as_std();
        std::iter::once(inner.get_program())
            .chain(inner.get_args())
            .collect()
    }

    #[test]
    fn test_spawned_command() {
        let launcher = ProcessLauncher::default();
        let command = launcher.command(&PathBuf::from("/srv/app/Procfile"));
        assert_eq!(
            argv(&command),
            ["honcho", "-f", "/srv/app/Procfile", "start"].map(OsStr::new)
        );

        let launcher = ProcessLauncher::new("foreman", vec!["start".into(), "web".into()]);
        let command = launcher.command(&PathBuf::from("Procfile.dev"));
        assert_eq!(
            argv(&command),
            ["foreman", "-f", "Procfile.dev", "start", "web"].map(OsStr::new)
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let launcher = ProcessLauncher::new("procenv-no-such-program", vec![]);
        let err = launcher
            .launch(Path::new("Procfile"))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, Error::Launch(_)));
        assert_eq!(err.code(), "PE22");
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::process::ExitStatusExt;

        // `sh -f <file>` runs <file> as a script, so the Procfile doubles as one
        fn shell_procfile(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("Procfile");
            std::fs::write(&path, format!("{body}\n")).unwrap();
            path
        }

        #[test]
        fn test_exit_code_mapping() {
            // Raw wait statuses: code in the high byte, signal in the low bits
            assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
            assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
            assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
            assert_eq!(exit_code(ExitStatus::from_raw(15)), 143);
        }

        #[tokio::test]
        async fn test_child_exit_code_passes_through() {
            let dir = tempfile::tempdir().unwrap();
            let procfile = shell_procfile(dir.path(), "exit 3");
            let launcher = ProcessLauncher::new("sh", vec![]);

            let mut app = launcher.launch(&procfile).await.unwrap();
            assert_eq!(app.wait().await.unwrap(), 3);
        }

        #[tokio::test]
        async fn test_child_receives_args() {
            let dir = tempfile::tempdir().unwrap();
            let procfile = shell_procfile(dir.path(), r#"[ "$1" = start ] && [ "$2" = web ] || exit 9"#);
            let launcher = ProcessLauncher::new("sh", vec!["start".into(), "web".into()]);

            let mut app = launcher.launch(&procfile).await.unwrap();
            assert_eq!(app.wait().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_killed_child_maps_to_signal_code() {
            let dir = tempfile::tempdir().unwrap();
            let procfile = shell_procfile(dir.path(), "kill -9 $$");
            let launcher = ProcessLauncher::new("sh", vec![]);

            let mut app = launcher.launch(&procfile).await.unwrap();
            assert_eq!(app.wait().await.unwrap(), 137);
        }
    }
}

//! Procfile lookup.

use crate::context::PROCFILE_VAR;
use common::Reporter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Procfile used when `PROCFILE` is unset or points nowhere
pub const DEFAULT_PROCFILE: &str = "Procfile";

/// Find the Procfile to run the application with.
///
/// `requested` is the value of `PROCFILE`, if any. Relative paths are
/// resolved against `root`; the returned path is left as given. Returns
/// `None` when no usable Procfile exists.
pub fn detect_procfile(
    requested: Option<&str>,
    root: &Path,
    reporter: &Reporter,
) -> Option<PathBuf> {
    let mut procfile = PathBuf::from(DEFAULT_PROCFILE);

    if let Some(requested) = requested {
        let candidate = PathBuf::from(requested);
        if root.join(&candidate).is_file() {
            procfile = candidate;
        } else {
            reporter.log(
                "PF10",
                format!(
                    "Cannot find the Procfile \"{requested}\" defined in the {PROCFILE_VAR} \
                     environment variable. Falling back to \"{DEFAULT_PROCFILE}\""
                ),
            );
        }
    }

    if !root.join(&procfile).is_file() {
        debug!(procfile = %procfile.display(), "No Procfile found");
        return None;
    }

    Some(procfile)
}

#![forbid(unsafe_code)]

//! Log file setup.
//!
//! The terminal belongs to the animation while the demo runs, so logs go to a
//! file or nowhere.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::DemoError;

/// Build the filter from `directives` (`TYPIST_LOG` syntax).
pub fn filter(directives: &str) -> Result<EnvFilter, DemoError> {
    EnvFilter::try_new(directives)
        .map_err(|err| DemoError::Usage(format!("Invalid TYPIST_LOG value: {err}")))
}

/// Install a global `fmt` subscriber appending to `path`.
///
/// Returns `Ok(false)` if another subscriber was already installed.
pub fn init(path: &Path, directives: &str) -> Result<bool, DemoError> {
    let filter = filter(directives)?;
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(path = %path.display(), "logging initialized");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_level_and_target_directives() {
        assert!(filter("info").is_ok());
        assert!(filter("typist_core=trace,typist_demo=debug").is_ok());
    }

    #[test]
    fn rejects_malformed_directives() {
        assert!(matches!(filter("typist_core=loud"), Err(DemoError::Usage(_))));
    }

    #[test]
    fn writes_to_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typist.log");
        if init(&path, "info").unwrap() {
            tracing::info!("hello from the test");
            let contents = std::fs::read_to_string(&path).unwrap();
            assert!(contents.contains("logging initialized"));
            assert!(contents.contains("hello from the test"));
        }
        assert!(path.exists());
    }
}

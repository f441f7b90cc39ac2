#![forbid(unsafe_code)]

//! Errors surfaced by the demo binary.

use std::fmt;
use std::io;
use std::path::PathBuf;

use typist_core::ConfigError;

/// Anything that can stop the demo.
#[derive(Debug)]
pub enum DemoError {
    /// Terminal or file I/O failed.
    Io(io::Error),
    /// A region file could not be parsed.
    Json {
        /// File that was being read.
        path: PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },
    /// A region's typing configuration was rejected.
    Config {
        /// Label of the offending region.
        label: String,
        /// Validation error.
        source: ConfigError,
    },
    /// Bad command-line input.
    Usage(String),
}

impl DemoError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Json { path, source } => {
                write!(f, "invalid region file {}: {source}", path.display())
            }
            Self::Config { label, source } => write!(f, "region '{label}': {source}"),
            Self::Usage(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json { source, .. } => Some(source),
            Self::Config { source, .. } => Some(source),
            Self::Usage(_) => None,
        }
    }
}

impl From<io::Error> for DemoError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

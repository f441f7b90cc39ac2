#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! With the `tracing` feature the engine's events go through the `tracing`
//! macros re-exported here. Without it, no-op macros with the same names keep
//! call sites (`crate::debug!(...)`) compiling unchanged.

#[cfg(feature = "tracing")]
pub use tracing::{debug, info, trace, warn};

// When tracing is not enabled, provide no-op macros
#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op info macro when tracing is disabled.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op warn macro when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

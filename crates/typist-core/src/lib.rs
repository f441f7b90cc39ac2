#![forbid(unsafe_code)]

//! Typing engine: sequential type/delete text animation.
//!
//! # Role in Typist
//! `typist-core` owns the animation logic and nothing else. It renders no
//! pixels and reads no clocks: the host advances a virtual clock, reports
//! where the output region is, and paints the [`RenderSnapshot`] it is handed.
//!
//! # How it fits together
//! - [`config`]: [`TypingConfig`] and its validation.
//! - [`script`]: sentences prepared for display (graphemes, optional reversal).
//! - [`machine`]: the pure typing state machine.
//! - [`scheduler`]: one pending tick at a time over a virtual clock.
//! - [`visibility`]: the one-shot gate that defers activation until seen.
//! - [`color`]: per-sentence color cycling.
//! - [`engine`]: [`TypingEngine`], which drives all of the above.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tracing` | Structured logging through the `tracing` crate |
//! | `serde` | `Serialize`/`Deserialize` for configuration types |

pub mod color;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod logging;
pub mod machine;
pub mod scheduler;
pub mod script;
pub mod snapshot;
pub mod visibility;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, info, trace, warn};

pub use color::{ActiveColor, ColorToken, Rgb};
pub use config::{ConfigError, SpeedRange, Timing, TypingConfig};
pub use engine::{EngineEvent, MAX_TICKS_PER_ADVANCE, TypingEngine};
pub use geometry::Rect;
pub use machine::{EngineState, Phase};
pub use snapshot::RenderSnapshot;
pub use visibility::{
    AlwaysVisible, GateState, Viewport, ViewportObserver, VisibilityGate, VisibilityObserver,
};

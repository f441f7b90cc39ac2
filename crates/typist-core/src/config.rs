#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! [`TypingConfig`] is the consumer-owned description of an animation. It is
//! compared by value: a configuration that differs in any field is a new
//! identity and resets the engine.
//!
//! # Failure Modes
//!
//! - Empty `sequence`: [`ConfigError::EmptySequence`].
//! - `variable_speed` with `min > max`: [`ConfigError::InvertedSpeedRange`].
//! - Negative durations: normalized to zero by [`TypingConfig::timing`].

use std::fmt;
use std::time::Duration;

use crate::color::ColorToken;

/// Uniform per-keystroke delay range in milliseconds, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedRange {
    /// Shortest delay.
    pub min: i64,
    /// Longest delay.
    pub max: i64,
}

impl SpeedRange {
    /// Create a range.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

/// Configuration for one typing animation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct TypingConfig {
    /// Sentences typed and deleted in order. Must not be empty.
    pub sequence: Vec<String>,
    /// Per-character delay while typing (ignored when `variable_speed` is set).
    pub typing_speed_ms: i64,
    /// Per-character delay while deleting.
    pub deleting_speed_ms: i64,
    /// Delay before the first character of an activation.
    pub initial_delay_ms: i64,
    /// Hold after a sentence is typed and after it is deleted.
    pub pause_after_sentence_ms: i64,
    /// Wrap to the first sentence instead of completing.
    #[cfg_attr(feature = "serde", serde(rename = "loop"))]
    pub looping: bool,
    /// Random per-keystroke typing delay.
    pub variable_speed: Option<SpeedRange>,
    /// Type each sentence back to front.
    pub reverse_text: bool,
    /// Wait for the output region to become visible before starting.
    pub start_on_visible: bool,
    /// Render a cursor glyph.
    pub show_cursor: bool,
    /// Hide the cursor while characters are being typed or deleted.
    pub hide_cursor_during_reveal: bool,
    /// Colors cycled per sentence.
    pub colors: Vec<ColorToken>,
    /// Cursor glyph.
    pub cursor_char: char,
    /// Blink half-period of the cursor; 0 keeps it steady.
    pub cursor_blink_ms: i64,
    /// Seed for variable-speed draws. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            sequence: Vec::new(),
            typing_speed_ms: 50,
            deleting_speed_ms: 30,
            initial_delay_ms: 0,
            pause_after_sentence_ms: 2000,
            looping: true,
            variable_speed: None,
            reverse_text: false,
            start_on_visible: false,
            show_cursor: true,
            hide_cursor_during_reveal: false,
            colors: Vec::new(),
            cursor_char: '|',
            cursor_blink_ms: 500,
            seed: None,
        }
    }
}

impl TypingConfig {
    /// Create a configuration for `sequence` with default timing.
    #[must_use]
    pub fn new<I, S>(sequence: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sequence: sequence.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the typing delay (builder pattern).
    #[must_use]
    pub fn typing_speed(mut self, ms: i64) -> Self {
        self.typing_speed_ms = ms;
        self
    }

    /// Set the deleting delay (builder pattern).
    #[must_use]
    pub fn deleting_speed(mut self, ms: i64) -> Self {
        self.deleting_speed_ms = ms;
        self
    }

    /// Set the initial delay (builder pattern).
    #[must_use]
    pub fn initial_delay(mut self, ms: i64) -> Self {
        self.initial_delay_ms = ms;
        self
    }

    /// Set the pause after each sentence (builder pattern).
    #[must_use]
    pub fn pause_after_sentence(mut self, ms: i64) -> Self {
        self.pause_after_sentence_ms = ms;
        self
    }

    /// Enable or disable looping (builder pattern).
    #[must_use]
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Draw typing delays uniformly from `[min, max]` (builder pattern).
    #[must_use]
    pub fn variable_speed(mut self, min: i64, max: i64) -> Self {
        self.variable_speed = Some(SpeedRange::new(min, max));
        self
    }

    /// Type sentences in reverse (builder pattern).
    #[must_use]
    pub fn reverse_text(mut self, reverse: bool) -> Self {
        self.reverse_text = reverse;
        self
    }

    /// Gate activation on visibility (builder pattern).
    #[must_use]
    pub fn start_on_visible(mut self, gated: bool) -> Self {
        self.start_on_visible = gated;
        self
    }

    /// Set the cursor visibility policy (builder pattern).
    #[must_use]
    pub fn cursor(mut self, show: bool, hide_during_reveal: bool) -> Self {
        self.show_cursor = show;
        self.hide_cursor_during_reveal = hide_during_reveal;
        self
    }

    /// Set the cursor glyph (builder pattern).
    #[must_use]
    pub fn cursor_char(mut self, glyph: char) -> Self {
        self.cursor_char = glyph;
        self
    }

    /// Set the cursor blink half-period (builder pattern).
    #[must_use]
    pub fn cursor_blink(mut self, ms: i64) -> Self {
        self.cursor_blink_ms = ms;
        self
    }

    /// Set the color palette (builder pattern).
    #[must_use]
    pub fn colors<I, C>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColorToken>,
    {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    /// Fix the variable-speed seed (builder pattern).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the configuration and return its normalized timing.
    pub fn validate(&self) -> Result<Timing, ConfigError> {
        if self.sequence.is_empty() {
            return Err(ConfigError::EmptySequence);
        }
        if let Some(range) = self.variable_speed
            && range.min > range.max
        {
            return Err(ConfigError::InvertedSpeedRange {
                min: range.min,
                max: range.max,
            });
        }
        Ok(self.timing())
    }

    /// Timing with negative values clamped to zero. Does not validate.
    #[must_use]
    pub fn timing(&self) -> Timing {
        Timing {
            typing: millis(self.typing_speed_ms),
            deleting: millis(self.deleting_speed_ms),
            initial_delay: millis(self.initial_delay_ms),
            pause: millis(self.pause_after_sentence_ms),
            variable: self
                .variable_speed
                .map(|range| (clamp_ms(range.min), clamp_ms(range.max))),
            cursor_blink: millis(self.cursor_blink_ms),
        }
    }
}

/// Normalized, non-negative timing derived from a [`TypingConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Fixed keystroke delay.
    pub typing: Duration,
    /// Per-character delete delay.
    pub deleting: Duration,
    /// Delay before the first keystroke of an activation.
    pub initial_delay: Duration,
    /// Hold between phases.
    pub pause: Duration,
    /// Inclusive millisecond range for random keystroke delays.
    pub variable: Option<(u64, u64)>,
    /// Cursor blink half-period.
    pub cursor_blink: Duration,
}

fn clamp_ms(ms: i64) -> u64 {
    u64::try_from(ms).unwrap_or(0)
}

fn millis(ms: i64) -> Duration {
    Duration::from_millis(clamp_ms(ms))
}

/// Configuration rejected at activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `sequence` has no entries.
    EmptySequence,
    /// `variable_speed.min` exceeds `variable_speed.max`.
    InvertedSpeedRange {
        /// Configured minimum.
        min: i64,
        /// Configured maximum.
        max: i64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySequence => f.write_str("sequence must contain at least one sentence"),
            Self::InvertedSpeedRange { min, max } => {
                write!(f, "variable speed range is inverted (min {min} > max {max})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

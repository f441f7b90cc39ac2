#![forbid(unsafe_code)]

//! Render snapshot: what the consumer paints after every tick.

use std::time::Duration;

use crate::color::{ActiveColor, active_color};
use crate::config::TypingConfig;
use crate::machine::EngineState;
use crate::script::Script;

/// Text, color and cursor policy for one frame.
///
/// Borrowed from the engine; copy out what you need to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSnapshot<'a> {
    /// Revealed prefix of the current sentence (already reversed if configured).
    pub text: &'a str,
    /// Color for the current sentence.
    pub color: ActiveColor<'a>,
    /// Whether a cursor glyph should be painted.
    pub cursor_visible: bool,
    /// The cursor glyph.
    pub cursor_char: char,
}

impl RenderSnapshot<'_> {
    /// The revealed text followed by the cursor glyph when it is visible.
    #[must_use]
    pub fn line(&self) -> String {
        let mut out = String::with_capacity(self.text.len() + 4);
        out.push_str(self.text);
        if self.cursor_visible {
            out.push(self.cursor_char);
        }
        out
    }
}

/// Assemble the snapshot for `state`.
pub(crate) fn assemble<'a>(
    config: &'a TypingConfig,
    script: &'a Script,
    state: &EngineState,
) -> RenderSnapshot<'a> {
    let text = script
        .get(state.sentence_index)
        .map_or("", |sentence| sentence.prefix(state.revealed));
    let hidden_for_reveal = config.hide_cursor_during_reveal && state.is_revealing(script);
    RenderSnapshot {
        text,
        color: active_color(state.sentence_index, &config.colors),
        cursor_visible: config.show_cursor && !state.complete && !hidden_for_reveal,
        cursor_char: config.cursor_char,
    }
}

/// Blink phase at `elapsed`: on for the first half-period, off for the
/// second. A zero half-period never blinks.
#[must_use]
pub fn blink_on(elapsed: Duration, half_period: Duration) -> bool {
    if half_period.is_zero() {
        return true;
    }
    (elapsed.as_nanos() / half_period.as_nanos()) % 2 == 0
}

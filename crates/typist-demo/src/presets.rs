#![forbid(unsafe_code)]

//! Built-in pages and the JSON region file format.
//!
//! A page is a list of [`RegionSpec`]s: a label painted above the text, the
//! page row the text starts on, and the region's [`TypingConfig`]. A region
//! file holds the same list as JSON:
//!
//! ```json
//! [
//!   {
//!     "label": "Hero",
//!     "row": 2,
//!     "config": { "sequence": ["Hello", "World"], "typingSpeedMs": 80, "loop": false }
//!   }
//! ]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use typist_core::TypingConfig;

use crate::error::DemoError;

/// One animated region of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Caption painted on the row above the text.
    #[serde(default)]
    pub label: String,
    /// Page row of the first text line.
    #[serde(default)]
    pub row: u16,
    /// Typing configuration.
    pub config: TypingConfig,
}

impl RegionSpec {
    /// Create a region spec.
    #[must_use]
    pub fn new(label: impl Into<String>, row: u16, config: TypingConfig) -> Self {
        Self {
            label: label.into(),
            row,
            config,
        }
    }
}

/// Built-in pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Multi-line hero paragraph, typed once.
    Landing,
    /// Looping, colored, variable-speed lines.
    Showcase,
    /// A region below the first screen, gated on visibility.
    Fold,
}

impl Preset {
    /// Every preset, in help order.
    pub const ALL: [Preset; 3] = [Preset::Landing, Preset::Showcase, Preset::Fold];

    /// Command-line name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::Showcase => "showcase",
            Self::Fold => "fold",
        }
    }

    /// Look a preset up by command-line name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name.trim()))
    }

    /// The regions making up this page.
    #[must_use]
    pub fn regions(self) -> Vec<RegionSpec> {
        match self {
            Self::Landing => landing(),
            Self::Showcase => showcase(),
            Self::Fold => fold(),
        }
    }
}

const HERO: &str = "Welcome to Play Economy.\n\
                    Cloud-native, event-driven architecture.\n\
                    Identity • Catalog • Inventory • Trading.\n\
                    Secure and observable end-to-end.";

fn landing() -> Vec<RegionSpec> {
    vec![RegionSpec::new(
        "Developer Showcase",
        3,
        TypingConfig::new([HERO])
            .looping(false)
            .typing_speed(90)
            .pause_after_sentence(900)
            .cursor(true, true)
            .cursor_blink(800)
            .cursor_char('▍'),
    )]
}

fn showcase() -> Vec<RegionSpec> {
    vec![
        RegionSpec::new(
            "Tagline",
            3,
            TypingConfig::new([
                "Type it out.",
                "Take it back.",
                "Try another line.",
                "Loop forever.",
            ])
            .variable_speed(40, 160)
            .deleting_speed(25)
            .pause_after_sentence(1200)
            .colors(["#ff6b6b", "#feca57", "#48dbfb", "#1dd1a1"]),
        ),
        RegionSpec::new(
            "Mirror",
            7,
            TypingConfig::new(["stressed", "drawer", "live on time"])
                .reverse_text(true)
                .typing_speed(110)
                .deleting_speed(60)
                .pause_after_sentence(1500)
                .colors(["magenta", "cyan"])
                .cursor_char('_'),
        ),
        RegionSpec::new(
            "Once",
            11,
            TypingConfig::new(["Queued.", "Delivered.", "Done."])
                .looping(false)
                .initial_delay(1500)
                .typing_speed(70)
                .deleting_speed(40)
                .pause_after_sentence(700)
                .colors(["#9aa5b1"]),
        ),
    ]
}

fn fold() -> Vec<RegionSpec> {
    vec![
        RegionSpec::new(
            "Above the fold",
            3,
            TypingConfig::new(["Scroll down with PgDn or the arrow keys."])
                .looping(false)
                .typing_speed(45),
        ),
        RegionSpec::new(
            "Below the fold",
            60,
            TypingConfig::new(["You scrolled far enough.", "This line waited for you."])
                .start_on_visible(true)
                .initial_delay(300)
                .typing_speed(60)
                .colors(["green", "#ffa94d"]),
        ),
    ]
}

/// Read a JSON region file.
pub fn load_regions(path: &Path) -> Result<Vec<RegionSpec>, DemoError> {
    let raw = fs::read_to_string(path)?;
    parse_regions(&raw).map_err(|source| DemoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse the JSON region list.
pub fn parse_regions(raw: &str) -> Result<Vec<RegionSpec>, serde_json::Error> {
    serde_json::from_str(raw)
}

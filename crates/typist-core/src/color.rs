#![forbid(unsafe_code)]

//! Color tokens and the per-sentence color cycler.

use std::fmt;

/// RGB color (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel (0–255).
    pub r: u8,
    /// Green channel (0–255).
    pub g: u8,
    /// Blue channel (0–255).
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Named colors accepted in tokens, besides hex notation.
const NAMED: &[(&str, Rgb)] = &[
    ("black", Rgb::new(0, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("lime", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("orange", Rgb::new(255, 165, 0)),
    ("purple", Rgb::new(128, 0, 128)),
    ("pink", Rgb::new(255, 192, 203)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
];

/// An opaque color token as written in configuration (`"#ff8800"`, `"#f80"`,
/// `"orange"`, ...).
///
/// The engine only cycles tokens; interpreting them is up to the host, with
/// [`ColorToken::to_rgb`] covering hex and a handful of common names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ColorToken(String);

impl ColorToken {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the token as an RGB color, if it is hex or a known name.
    #[must_use]
    pub fn to_rgb(&self) -> Option<Rgb> {
        let token = self.0.trim();
        if let Some(hex) = token.strip_prefix('#') {
            return parse_hex(hex);
        }
        NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|&(_, rgb)| rgb)
    }
}

impl From<&str> for ColorToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for ColorToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (slot, digit) in channels.iter_mut().zip(hex.chars()) {
                let v = digit.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(Rgb::new(channels[0], channels[1], channels[2]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb::new(r, g, b))
        }
        _ => None,
    }
}

/// Color applied to the text currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveColor<'a> {
    /// No colors configured; use the surrounding/default color.
    Inherit,
    /// The token selected for the current sentence.
    Token(&'a ColorToken),
}

impl<'a> ActiveColor<'a> {
    /// The token, if one is active.
    #[must_use]
    pub fn token(self) -> Option<&'a ColorToken> {
        match self {
            Self::Inherit => None,
            Self::Token(token) => Some(token),
        }
    }

    /// Resolve to RGB, using `default` for `Inherit` and unrecognized tokens.
    #[must_use]
    pub fn rgb_or(self, default: Rgb) -> Rgb {
        self.token().and_then(ColorToken::to_rgb).unwrap_or(default)
    }
}

/// Color for the sentence at `sentence_index`: `colors[index mod len]`, or
/// `None` when no colors are configured.
#[must_use]
pub fn color_for(sentence_index: usize, colors: &[ColorToken]) -> Option<&ColorToken> {
    if colors.is_empty() {
        None
    } else {
        colors.get(sentence_index % colors.len())
    }
}

/// [`color_for`] wrapped as an [`ActiveColor`].
#[must_use]
pub fn active_color(sentence_index: usize, colors: &[ColorToken]) -> ActiveColor<'_> {
    color_for(sentence_index, colors).map_or(ActiveColor::Inherit, ActiveColor::Token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<ColorToken> {
        list.iter().copied().map(ColorToken::from).collect()
    }

    #[test]
    fn empty_palette_inherits() {
        assert_eq!(color_for(0, &[]), None);
        assert_eq!(active_color(7, &[]), ActiveColor::Inherit);
    }

    #[test]
    fn cycles_by_sentence_index() {
        let colors = tokens(&["red", "green", "blue"]);
        assert_eq!(color_for(0, &colors).map(ColorToken::as_str), Some("red"));
        assert_eq!(color_for(2, &colors).map(ColorToken::as_str), Some("blue"));
        assert_eq!(color_for(3, &colors).map(ColorToken::as_str), Some("red"));
        assert_eq!(color_for(301, &colors).map(ColorToken::as_str), Some("green"));
    }

    #[test]
    fn single_color_always_selected() {
        let colors = tokens(&["#123456"]);
        for i in 0..5 {
            assert_eq!(color_for(i, &colors), Some(&colors[0]));
        }
    }

    #[test]
    fn hex_tokens_parse() {
        assert_eq!(ColorToken::from("#ff8800").to_rgb(), Some(Rgb::new(255, 136, 0)));
        assert_eq!(ColorToken::from("#f80").to_rgb(), Some(Rgb::new(255, 136, 0)));
        assert_eq!(ColorToken::from(" #000000 ").to_rgb(), Some(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn malformed_hex_is_none() {
        assert_eq!(ColorToken::from("#ff88").to_rgb(), None);
        assert_eq!(ColorToken::from("#gg0000").to_rgb(), None);
        assert_eq!(ColorToken::from("#ééé").to_rgb(), None);
    }

    #[test]
    fn named_tokens_are_case_insensitive() {
        assert_eq!(ColorToken::from("Orange").to_rgb(), Some(Rgb::new(255, 165, 0)));
        assert_eq!(ColorToken::from("currentColor").to_rgb(), None);
    }

    #[test]
    fn rgb_or_falls_back() {
        let fallback = Rgb::new(1, 2, 3);
        assert_eq!(ActiveColor::Inherit.rgb_or(fallback), fallback);
        let odd = ColorToken::from("chartreuse-ish");
        assert_eq!(ActiveColor::Token(&odd).rgb_or(fallback), fallback);
        let red = ColorToken::from("red");
        assert_eq!(ActiveColor::Token(&red).rgb_or(fallback), Rgb::new(255, 0, 0));
    }
}

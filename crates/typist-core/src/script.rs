#![forbid(unsafe_code)]

//! Prepared sentences.
//!
//! A [`Script`] holds every configured sentence in the form it is typed
//! (reversed when `reverse_text` is set) together with the byte offset of each
//! grapheme boundary, so a displayed prefix is a slice and never allocates.
//!
//! "Character" throughout the engine means an extended grapheme cluster:
//! `"e\u{301}"` and `"👍🏽"` are each revealed, deleted and reversed as one unit.

use unicode_segmentation::UnicodeSegmentation;

/// One sentence, ready to be typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// The sentence as configured.
    source: String,
    /// The sentence as it is revealed (reversed when requested).
    shown: String,
    /// `stops[n]` is the byte length of the first `n` graphemes of `shown`.
    stops: Vec<usize>,
}

impl Sentence {
    /// Prepare `source`, reversing its graphemes when `reverse` is set.
    pub fn new(source: &str, reverse: bool) -> Self {
        let shown: String = if reverse {
            source.graphemes(true).rev().collect()
        } else {
            source.to_owned()
        };
        let mut stops = Vec::with_capacity(shown.len() + 1);
        stops.push(0);
        stops.extend(
            shown
                .grapheme_indices(true)
                .map(|(offset, grapheme)| offset + grapheme.len()),
        );
        Self {
            source: source.to_owned(),
            shown,
            stops,
        }
    }

    /// The sentence as configured.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The full text that typing converges to.
    #[must_use]
    pub fn shown(&self) -> &str {
        &self.shown
    }

    /// Number of characters (graphemes).
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len() - 1
    }

    /// Whether the sentence has no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first `count` characters, clamped to the sentence length.
    #[must_use]
    pub fn prefix(&self, count: usize) -> &str {
        let end = self.stops[count.min(self.len())];
        &self.shown[..end]
    }
}

/// The ordered, prepared sentences of one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    sentences: Vec<Sentence>,
}

impl Script {
    /// Prepare every sentence in `sequence`.
    pub fn new<S: AsRef<str>>(sequence: &[S], reverse: bool) -> Self {
        Self {
            sentences: sequence
                .iter()
                .map(|s| Sentence::new(s.as_ref(), reverse))
                .collect(),
        }
    }

    /// Number of sentences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Whether there are no sentences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Sentence at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    /// Character count of the sentence at `index` (0 when out of range).
    #[must_use]
    pub fn len_of(&self, index: usize) -> usize {
        self.get(index).map_or(0, Sentence::len)
    }

    /// Iterate over the sentences.
    pub fn iter(&self) -> impl Iterator<Item = &Sentence> {
        self.sentences.iter()
    }
}

//! Unicode Word Tokenizer - splits text on Unicode word boundaries.

use std::ops::Range;

use textdoc_common::Result;
use unicode_segmentation::UnicodeSegmentation;

use super::{Tokenizer, TokenizerKind};

/// Word Tokenizer - splits text on UAX #29 word boundaries.
///
/// Every segment between two boundaries that is not pure whitespace becomes a token, so
/// punctuation marks are tokens of their own (`"world."` yields `"world"` and `"."`),
/// while contractions and decimal numbers stay whole (`"can't"`, `"3.14"`).
#[derive(Default)]
pub struct UnicodeWordTokenizer;

impl UnicodeWordTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, input: &str) -> Result<Vec<Range<usize>>> {
        Ok(input
            .split_word_bound_indices()
            .filter(|(_, segment)| !segment.chars().all(char::is_whitespace))
            .map(|(start, segment)| start..start + segment.len())
            .collect())
    }

    fn name(&self) -> &str {
        TokenizerKind::UnicodeWord.name()
    }
}

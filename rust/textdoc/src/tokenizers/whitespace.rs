//! Whitespace Tokenizer - splits on runs of whitespace.

use std::ops::Range;

use textdoc_common::Result;

use super::{Tokenizer, TokenizerKind};

/// Whitespace Tokenizer - every maximal run of non-whitespace characters is a token.
///
/// Punctuation stays attached to the word it touches (`"world."` is one token).
#[derive(Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, input: &str) -> Result<Vec<Range<usize>>> {
        let mut spans = Vec::new();
        let mut token_start = None;
        for (pos, ch) in input.char_indices() {
            if ch.is_whitespace() {
                if let Some(start) = token_start.take() {
                    spans.push(start..pos);
                }
            } else if token_start.is_none() {
                token_start = Some(pos);
            }
        }
        if let Some(start) = token_start {
            spans.push(start..input.len());
        }
        Ok(spans)
    }

    fn name(&self) -> &str {
        TokenizerKind::Whitespace.name()
    }
}

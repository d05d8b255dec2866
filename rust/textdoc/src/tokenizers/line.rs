//! Line Tokenizer - one token per non-blank line.

use std::ops::Range;

use textdoc_common::Result;

use super::{Tokenizer, TokenizerKind, trim_span};

/// Line Tokenizer - each non-blank line, minus surrounding whitespace, is a token.
///
/// Useful as a sentence tokenizer for inputs that are already split one sentence per
/// line.
#[derive(Default)]
pub struct LineTokenizer;

impl LineTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for LineTokenizer {
    fn tokenize(&self, input: &str) -> Result<Vec<Range<usize>>> {
        let mut spans = Vec::new();
        let mut line_start = 0;
        for line in input.split('\n') {
            let line_end = line_start + line.len();
            spans.extend(trim_span(input, line_start..line_end));
            line_start = line_end + 1;
        }
        Ok(spans)
    }

    fn name(&self) -> &str {
        TokenizerKind::Line.name()
    }
}

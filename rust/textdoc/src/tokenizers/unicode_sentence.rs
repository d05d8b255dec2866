//! Unicode Sentence Tokenizer - splits text on Unicode sentence boundaries.

use std::ops::Range;

use textdoc_common::Result;
use unicode_segmentation::UnicodeSegmentation;

use super::{Tokenizer, TokenizerKind, trim_span};

/// Sentence Tokenizer - splits text on UAX #29 sentence boundaries.
///
/// The whitespace that UAX #29 attaches to the end of a sentence is excluded from the
/// token, so the builder sees it as the gap between two sentences. Blank segments are
/// dropped.
#[derive(Default)]
pub struct UnicodeSentenceTokenizer;

impl UnicodeSentenceTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for UnicodeSentenceTokenizer {
    fn tokenize(&self, input: &str) -> Result<Vec<Range<usize>>> {
        Ok(input
            .split_sentence_bound_indices()
            .filter_map(|(start, segment)| trim_span(input, start..start + segment.len()))
            .collect())
    }

    fn name(&self) -> &str {
        TokenizerKind::UnicodeSentence.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizers::token_strs;

    #[test]
    fn test_unicode_sentence_tokenizer() {
        let tokenizer = UnicodeSentenceTokenizer::new();

        let input = "Hello world. Bye.";
        let spans = tokenizer.tokenize(input).unwrap();
        assert_eq!(spans, vec![0..12, 13..17]);
        assert_eq!(token_strs(input, &spans), vec!["Hello world.", "Bye."]);

        let input = "  Is it?  Yes!\n\nDone";
        let spans = tokenizer.tokenize(input).unwrap();
        assert_eq!(token_strs(input, &spans), vec!["Is it?", "Yes!", "Done"]);

        assert!(tokenizer.tokenize("").unwrap().is_empty());
        assert!(tokenizer.tokenize("   ").unwrap().is_empty());
    }
}

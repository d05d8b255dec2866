//! Trivial Tokenizer - returns the input as a single token.

use std::ops::Range;

use textdoc_common::Result;

use super::{Tokenizer, TokenizerKind, trim_span};

/// Trivial Tokenizer - returns the input, minus leading and trailing whitespace, as one
/// token.
///
/// Used as a sentence tokenizer it treats the whole text as a single sentence; used as a
/// word tokenizer it keeps each sentence as one term. A blank input yields no token.
#[derive(Default)]
pub struct TrivialTokenizer;

impl TrivialTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for TrivialTokenizer {
    fn tokenize(&self, input: &str) -> Result<Vec<Range<usize>>> {
        Ok(trim_span(input, 0..input.len()).into_iter().collect())
    }

    fn name(&self) -> &str {
        TokenizerKind::Trivial.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizers::token_strs;

    #[test]
    fn test_trivial_tokenizer() {
        let tokenizer = TrivialTokenizer::new();

        let input = "guid-12345-abcdef";
        let spans = tokenizer.tokenize(input).unwrap();
        assert_eq!(token_strs(input, &spans), vec!["guid-12345-abcdef"]);

        let input = "  padded value \n";
        let spans = tokenizer.tokenize(input).unwrap();
        assert_eq!(spans, vec![2..14]);

        assert!(tokenizer.tokenize("").unwrap().is_empty());
        assert!(tokenizer.tokenize(" \t ").unwrap().is_empty());
        assert_eq!(tokenizer.name(), "trivial");
    }
}

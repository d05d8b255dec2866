//! Tokenizers for splitting text into sentences and sentences into words.
//!
//! The document builder calls a tokenizer twice per document: once with a sentence
//! tokenizer over the whole text, then once per sentence with a word tokenizer.
//! Tokenizers report byte spans rather than substrings, so the builder can recover the
//! text lying between two tokens (the trailing whitespace of the first one).
//!
//! Any type implementing [`Tokenizer`] can be plugged into the builder; the built-in
//! implementations can be created by name through [`create_tokenizer`].

pub mod line;
pub mod trivial;
pub mod unicode_sentence;
pub mod unicode_word;
pub mod whitespace;

use std::ops::Range;

use textdoc_common::{Result, error::Error};

pub use line::LineTokenizer;
pub use trivial::TrivialTokenizer;
pub use unicode_sentence::UnicodeSentenceTokenizer;
pub use unicode_word::UnicodeWordTokenizer;
pub use whitespace::WhitespaceTokenizer;

/// A tokenizer splits an input string into an ordered sequence of tokens.
///
/// Each token is reported as a byte range into the input. Ranges must be non-empty, lie
/// on UTF-8 character boundaries, and be sorted and non-overlapping; whatever lies between
/// two consecutive ranges is not part of any token.
pub trait Tokenizer: Send + Sync {
    /// Splits `input` into token ranges.
    ///
    /// # Errors
    /// Implementations backed by fallible machinery (models, external processes) report
    /// their failure here; the builder wraps it into a tokenization error.
    fn tokenize(&self, input: &str) -> Result<Vec<Range<usize>>>;

    /// The name of the tokenizer, used in diagnostics.
    fn name(&self) -> &str;
}

/// Creates a tokenizer instance based on the provided name string.
///
/// # Errors
/// Returns an [`Error::invalid_arg`] if the provided tokenizer name is not recognized.
pub fn create_tokenizer(name: &str) -> Result<TokenizerType> {
    match name.try_into()? {
        TokenizerKind::Trivial => Ok(TokenizerType::Trivial(TrivialTokenizer::new())),
        TokenizerKind::Whitespace => Ok(TokenizerType::Whitespace(WhitespaceTokenizer::new())),
        TokenizerKind::UnicodeWord => Ok(TokenizerType::UnicodeWord(UnicodeWordTokenizer::new())),
        TokenizerKind::UnicodeSentence => Ok(TokenizerType::UnicodeSentence(
            UnicodeSentenceTokenizer::new(),
        )),
        TokenizerKind::Line => Ok(TokenizerType::Line(LineTokenizer::new())),
    }
}

/// Checks that `spans` satisfies the [`Tokenizer`] contract for `input`.
///
/// # Errors
/// Returns a tokenization error attributed to `tokenizer` describing the first offending
/// span.
pub fn verify_spans(tokenizer: &str, input: &str, spans: &[Range<usize>]) -> Result<()> {
    let mut prev_end = 0;
    for (i, span) in spans.iter().enumerate() {
        let problem = if span.start >= span.end {
            Some("is empty")
        } else if span.end > input.len() {
            Some("extends past the end of the input")
        } else if span.start < prev_end {
            Some("overlaps the previous span")
        } else if !input.is_char_boundary(span.start) || !input.is_char_boundary(span.end) {
            Some("does not lie on character boundaries")
        } else {
            None
        };
        if let Some(problem) = problem {
            return Err(Error::tokenization(
                tokenizer,
                format!("span #{i} {span:?} {problem} (input length {})", input.len()),
            ));
        }
        prev_end = span.end;
    }
    Ok(())
}

/// Narrows `span` so that it neither starts nor ends with whitespace.
/// Returns `None` if nothing but whitespace remains.
pub(crate) fn trim_span(input: &str, span: Range<usize>) -> Option<Range<usize>> {
    let slice = &input[span.clone()];
    let trimmed_start = slice.trim_start();
    let start = span.start + (slice.len() - trimmed_start.len());
    let end = start + trimmed_start.trim_end().len();
    (start < end).then_some(start..end)
}

/// Enum representing the built-in tokenizer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerKind {
    /// Returns the whole input, minus surrounding whitespace, as a single token.
    Trivial,
    /// Splits on runs of whitespace.
    Whitespace,
    /// Splits on Unicode word boundaries; punctuation becomes separate tokens.
    UnicodeWord,
    /// Splits on Unicode sentence boundaries.
    UnicodeSentence,
    /// Every non-blank line is a token.
    Line,
}

/// Convert a string name to a TokenizerKind enum variant.
impl TryFrom<&str> for TokenizerKind {
    type Error = textdoc_common::error::Error;

    fn try_from(name: &str) -> Result<Self> {
        match name {
            "trivial" => Ok(TokenizerKind::Trivial),
            "whitespace" => Ok(TokenizerKind::Whitespace),
            "unicode-word" => Ok(TokenizerKind::UnicodeWord),
            "unicode-sentence" => Ok(TokenizerKind::UnicodeSentence),
            "line" => Ok(TokenizerKind::Line),
            _ => Err(Error::invalid_arg(
                "name",
                format!("Unrecognized tokenizer: {name}"),
            )),
        }
    }
}

impl TokenizerKind {
    /// Get the name of the tokenizer kind as a static string.
    pub const fn name(&self) -> &'static str {
        match self {
            TokenizerKind::Trivial => "trivial",
            TokenizerKind::Whitespace => "whitespace",
            TokenizerKind::UnicodeWord => "unicode-word",
            TokenizerKind::UnicodeSentence => "unicode-sentence",
            TokenizerKind::Line => "line",
        }
    }
}

/// Enum that holds all built-in tokenizer types.
pub enum TokenizerType {
    Trivial(TrivialTokenizer),
    Whitespace(WhitespaceTokenizer),
    UnicodeWord(UnicodeWordTokenizer),
    UnicodeSentence(UnicodeSentenceTokenizer),
    Line(LineTokenizer),
}

impl TokenizerType {
    pub fn kind(&self) -> TokenizerKind {
        match self {
            TokenizerType::Trivial(_) => TokenizerKind::Trivial,
            TokenizerType::Whitespace(_) => TokenizerKind::Whitespace,
            TokenizerType::UnicodeWord(_) => TokenizerKind::UnicodeWord,
            TokenizerType::UnicodeSentence(_) => TokenizerKind::UnicodeSentence,
            TokenizerType::Line(_) => TokenizerKind::Line,
        }
    }
}

impl Tokenizer for TokenizerType {
    fn tokenize(&self, input: &str) -> Result<Vec<Range<usize>>> {
        match self {
            TokenizerType::Trivial(tokenizer) => tokenizer.tokenize(input),
            TokenizerType::Whitespace(tokenizer) => tokenizer.tokenize(input),
            TokenizerType::UnicodeWord(tokenizer) => tokenizer.tokenize(input),
            TokenizerType::UnicodeSentence(tokenizer) => tokenizer.tokenize(input),
            TokenizerType::Line(tokenizer) => tokenizer.tokenize(input),
        }
    }

    fn name(&self) -> &str {
        self.kind().name()
    }
}

#[cfg(test)]
pub(crate) fn token_strs<'a>(input: &'a str, spans: &[Range<usize>]) -> Vec<&'a str> {
    spans.iter().map(|span| &input[span.clone()]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tokenizer() {
        for name in ["trivial", "whitespace", "unicode-word", "unicode-sentence", "line"] {
            let tokenizer = create_tokenizer(name).unwrap();
            assert_eq!(tokenizer.name(), name);
        }
        assert!(create_tokenizer("unknown").is_err());
        assert_eq!(create_tokenizer("line").unwrap().kind(), TokenizerKind::Line);
    }

    #[test]
    fn test_trim_span() {
        let input = "  ab c \n";
        assert_eq!(trim_span(input, 0..input.len()), Some(2..6));
        assert_eq!(trim_span(input, 0..2), None);
        assert_eq!(trim_span(input, 2..4), Some(2..4));
        assert_eq!(trim_span("", 0..0), None);
    }

    #[test]
    fn test_verify_spans() {
        let input = "héllo world";
        assert!(verify_spans("t", input, &[0..6, 7..12]).is_ok());
        assert!(verify_spans("t", input, &[]).is_ok());
        // empty span
        assert!(verify_spans("t", input, &[3..3]).is_err());
        // past the end
        assert!(verify_spans("t", input, &[7..13]).is_err());
        // overlapping
        assert!(verify_spans("t", input, &[0..6, 5..8]).is_err());
        // inside the two-byte 'é'
        assert!(verify_spans("t", input, &[0..2]).is_err());
    }
}

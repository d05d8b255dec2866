//! Builds compact documents from raw text.
//!
//! The text is split twice: into sentence spans by the sentence tokenizer, then each
//! sentence into word spans by the word tokenizer. Whatever lies between the end of a
//! token and the start of the next one at the same level is that token's trailing
//! whitespace, so the concatenation of every word and its whitespace reproduces the text
//! from the first word onwards.
//!
//! ```text
//! "Hello world. Bye."
//!  |----------| |--|          sentences: 0..12, 13..17
//!  |---| |----| |--|          words: "Hello" + " ", "world." + " ", "Bye." + ""
//! ```

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use textdoc_common::{
    Result,
    error::{Error, ErrorKind},
};
use uuid::Uuid;

use crate::{
    document::CompactDocument,
    tokenizers::{self, Tokenizer, TokenizerKind},
    write::builder::DocumentBuilder,
};

/// Configuration of a [`TokenizingBuilder`].
///
/// Missing fields take their default values when deserialized, so `{}` is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizingBuilderConfig {
    /// Name of the tokenizer splitting the text into sentences.
    pub sentence_tokenizer: String,

    /// Name of the tokenizer splitting each sentence into words.
    pub word_tokenizer: String,

    /// Metadata entries added to every built document. Entries supplied with an
    /// individual input take precedence.
    pub metadata: BTreeMap<String, String>,
}

impl Default for TokenizingBuilderConfig {
    fn default() -> Self {
        TokenizingBuilderConfig {
            sentence_tokenizer: TokenizerKind::UnicodeSentence.name().to_string(),
            word_tokenizer: TokenizerKind::Whitespace.name().to_string(),
            metadata: BTreeMap::new(),
        }
    }
}

/// One document to build.
#[derive(Clone, Debug, Default)]
pub struct DocumentInput {
    /// Document identifier; a random one is generated when absent.
    pub id: Option<Uuid>,
    pub title: Option<String>,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

impl DocumentInput {
    pub fn new(text: impl Into<String>) -> DocumentInput {
        DocumentInput {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> DocumentInput {
        self.title = Some(title.into());
        self
    }

    pub fn with_id(mut self, id: Uuid) -> DocumentInput {
        self.id = Some(id);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Turns raw text into [`CompactDocument`]s.
///
/// The builder itself is stateless between documents and can be shared across threads.
/// Every word becomes an untagged, mutable compact term.
#[derive(Clone)]
pub struct TokenizingBuilder {
    sentence_tokenizer: Arc<dyn Tokenizer>,
    word_tokenizer: Arc<dyn Tokenizer>,
    /// Metadata added to every document.
    metadata: BTreeMap<String, String>,
}

impl Default for TokenizingBuilder {
    fn default() -> Self {
        TokenizingBuilder::new(
            Arc::new(tokenizers::UnicodeSentenceTokenizer::new()),
            Arc::new(tokenizers::WhitespaceTokenizer::new()),
        )
    }
}

impl TokenizingBuilder {
    /// Creates a builder using the given sentence and word tokenizers.
    pub fn new(
        sentence_tokenizer: Arc<dyn Tokenizer>,
        word_tokenizer: Arc<dyn Tokenizer>,
    ) -> TokenizingBuilder {
        TokenizingBuilder {
            sentence_tokenizer,
            word_tokenizer,
            metadata: BTreeMap::new(),
        }
    }

    /// Creates a builder from its configuration, resolving the tokenizers by name.
    ///
    /// # Errors
    /// Returns an invalid argument error if a tokenizer name is not recognized.
    pub fn from_config(config: &TokenizingBuilderConfig) -> Result<TokenizingBuilder> {
        let sentence_tokenizer = tokenizers::create_tokenizer(&config.sentence_tokenizer)?;
        let word_tokenizer = tokenizers::create_tokenizer(&config.word_tokenizer)?;
        Ok(TokenizingBuilder {
            sentence_tokenizer: Arc::new(sentence_tokenizer),
            word_tokenizer: Arc::new(word_tokenizer),
            metadata: config.metadata.clone(),
        })
    }

    /// Builds a document from `text`, with a randomly generated identifier.
    ///
    /// # Errors
    /// - empty input error if `text` is empty or whitespace only;
    /// - tokenization error if either tokenizer fails or reports invalid spans.
    pub fn build(&self, text: &str, title: Option<&str>) -> Result<CompactDocument> {
        self.build_parts(None, title, text, &BTreeMap::new())
    }

    /// Builds the document described by `input`.
    pub fn build_input(&self, input: &DocumentInput) -> Result<CompactDocument> {
        self.build_parts(input.id, input.title.as_deref(), &input.text, &input.metadata)
    }

    /// Builds independent documents in parallel.
    ///
    /// The results are in input order; a failure of one document does not affect the
    /// others.
    pub fn build_batch(&self, inputs: &[DocumentInput]) -> Vec<Result<CompactDocument>> {
        log::debug!("building a batch of {} documents", inputs.len());
        inputs
            .par_iter()
            .map(|input| self.build_input(input))
            .collect()
    }

    fn build_parts(
        &self,
        id: Option<Uuid>,
        title: Option<&str>,
        text: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<CompactDocument> {
        if text.trim().is_empty() {
            return Err(Error::empty_input("document text"));
        }

        let mut builder = DocumentBuilder::new();
        if let Some(id) = id {
            builder.id(id);
        }
        if let Some(title) = title {
            builder.title(title);
        }
        for (key, value) in self.metadata.iter().chain(metadata) {
            builder.metadata(key.as_str(), value.as_str());
        }

        let sentences = self.split(self.sentence_tokenizer.as_ref(), text)?;
        for (i, sentence) in sentences.iter().enumerate() {
            // The sentence extends to the next sentence's start (its trailing whitespace).
            let gap_end = sentences.get(i + 1).map_or(text.len(), |next| next.start);
            let sentence_text = &text[sentence.clone()];

            let words = self.split(self.word_tokenizer.as_ref(), sentence_text)?;
            for (j, word) in words.iter().enumerate() {
                let word_start = sentence.start + word.start;
                let word_end = sentence.start + word.end;
                let ws_end = words
                    .get(j + 1)
                    .map_or(gap_end, |next| sentence.start + next.start);
                builder.push_term(&text[word_start..word_end], &text[word_end..ws_end]);
            }
            builder.end_sentence();
        }

        builder.build()
    }

    /// Runs `tokenizer` over `input`, attributing any failure to it.
    fn split(&self, tokenizer: &dyn Tokenizer, input: &str) -> Result<Vec<Range<usize>>> {
        let spans = tokenizer.tokenize(input).map_err(|e| {
            if matches!(e.kind(), ErrorKind::Tokenization { .. }) {
                e
            } else {
                Error::tokenization(tokenizer.name(), e)
            }
        })?;
        tokenizers::verify_spans(tokenizer.name(), input, &spans)?;
        Ok(spans)
    }
}

impl std::fmt::Debug for TokenizingBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizingBuilder")
            .field("sentence_tokenizer", &self.sentence_tokenizer.name())
            .field("word_tokenizer", &self.word_tokenizer.name())
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingTokenizer;

    impl Tokenizer for FailingTokenizer {
        fn tokenize(&self, _input: &str) -> Result<Vec<Range<usize>>> {
            Err(Error::invalid_arg("model", "not loaded"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Reports a span past the end of its input.
    struct OverreachingTokenizer;

    impl Tokenizer for OverreachingTokenizer {
        fn tokenize(&self, input: &str) -> Result<Vec<Range<usize>>> {
            Ok(vec![0..input.len() + 1])
        }

        fn name(&self) -> &str {
            "overreaching"
        }
    }

    fn words(doc: &CompactDocument, sentence: usize) -> Vec<(&str, &str)> {
        doc.sentence(sentence)
            .unwrap()
            .terms()
            .iter()
            .map(|t| (doc.term_text(t), doc.whitespace_text(t)))
            .collect()
    }

    #[test]
    fn test_two_sentences() {
        let doc = TokenizingBuilder::default()
            .build("Hello world. Bye.", Some("t1"))
            .unwrap();
        assert_eq!(doc.title(), "t1");
        assert_eq!(doc.sentence_count(), 2);
        assert_eq!(doc.term_count(), 3);
        assert_eq!(words(&doc, 0), vec![("Hello", " "), ("world.", " ")]);
        assert_eq!(words(&doc, 1), vec![("Bye.", "")]);
        assert_eq!(
            doc.term_table().iter().collect::<Vec<_>>(),
            vec!["Hello", "world.", "Bye."]
        );
        assert_eq!(doc.whitespace_table().len(), 1);
        assert!(doc.term(1, 0).unwrap().whitespace_index().is_none());
    }

    #[test]
    fn test_whitespace_per_word() {
        // each word gets its own gap, not the gap of the sentence's first word
        let doc = TokenizingBuilder::default()
            .build("a  b\tc.\n\nNext one.", None)
            .unwrap();
        assert_eq!(words(&doc, 0), vec![("a", "  "), ("b", "\t"), ("c.", "\n\n")]);
        assert_eq!(words(&doc, 1), vec![("Next", " "), ("one.", "")]);
        assert_eq!(doc.title(), "");
    }

    #[test]
    fn test_deterministic() {
        let id = Uuid::from_u128(42);
        let builder = TokenizingBuilder::default();
        let input = DocumentInput::new("One two. Two one.").with_id(id);
        let a = builder.build_input(&input).unwrap();
        let b = builder.build_input(&input).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id(), id);
        assert_eq!(a.term_table().len(), 4);
    }

    #[test]
    fn test_random_ids() {
        let builder = TokenizingBuilder::default();
        let a = builder.build("x", None).unwrap();
        let b = builder.build("x", None).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_empty_input() {
        let builder = TokenizingBuilder::default();
        for text in ["", "   ", "\n\t"] {
            let err = builder.build(text, None).unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::EmptyInput { .. }));
        }
    }

    #[test]
    fn test_tokenizer_failure() {
        let builder = TokenizingBuilder::new(
            Arc::new(tokenizers::LineTokenizer::new()),
            Arc::new(FailingTokenizer),
        );
        let err = builder.build("some text", None).unwrap_err();
        match err.kind() {
            ErrorKind::Tokenization { tokenizer, source } => {
                assert_eq!(tokenizer, "failing");
                assert!(source.to_string().contains("not loaded"));
            }
            other => panic!("unexpected error {other:?}"),
        }

        let builder = TokenizingBuilder::new(
            Arc::new(OverreachingTokenizer),
            Arc::new(tokenizers::WhitespaceTokenizer::new()),
        );
        let err = builder.build("text", None).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Tokenization { tokenizer, .. } if tokenizer == "overreaching"
        ));
    }

    #[test]
    fn test_from_config() {
        let mut config = TokenizingBuilderConfig {
            sentence_tokenizer: "line".to_string(),
            word_tokenizer: "unicode-word".to_string(),
            ..Default::default()
        };
        config.metadata.insert("source".to_string(), "unit".to_string());
        let builder = TokenizingBuilder::from_config(&config).unwrap();

        let input = DocumentInput::new("Hi, there\nsecond line")
            .with_metadata("lang", "en")
            .with_metadata("source", "override");
        let doc = builder.build_input(&input).unwrap();
        assert_eq!(words(&doc, 0), vec![("Hi", ""), (",", " "), ("there", "\n")]);
        assert_eq!(words(&doc, 1), vec![("second", " "), ("line", "")]);
        assert_eq!(doc.metadata("lang"), Some("en"));
        assert_eq!(doc.metadata("source"), Some("override"));

        config.word_tokenizer = "bogus".to_string();
        let err = TokenizingBuilder::from_config(&config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
    }

    #[test]
    fn test_build_batch_preserves_order() {
        let builder = TokenizingBuilder::default();
        let inputs: Vec<_> = (0..32)
            .map(|i| DocumentInput::new(format!("doc {i}.")).with_title(format!("#{i}")))
            .chain(std::iter::once(DocumentInput::new(" ")))
            .collect();
        let results = builder.build_batch(&inputs);
        assert_eq!(results.len(), 33);
        for (i, result) in results.iter().take(32).enumerate() {
            let doc = result.as_ref().unwrap();
            assert_eq!(doc.title(), format!("#{i}"));
            assert_eq!(doc.term_text(doc.term(0, 1).unwrap()), format!("{i}."));
        }
        assert!(results[32].is_err());
    }
}

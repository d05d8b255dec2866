use std::iter::FusedIterator;
use std::ops::Range;
use std::sync::{Arc, OnceLock};

use textdoc_common::{Result, error::Error, verify_arg};

use crate::{
    document::{CompactDocument, CompactSentence, CompactTerm},
    tags::{Tag, TagBuilder, TagBuilderRegistry},
};

/// A word and the whitespace following it in the source text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Word {
    text: String,
    whitespace: String,
}

impl Word {
    pub fn new(text: impl Into<String>, whitespace: impl Into<String>) -> Word {
        Word {
            text: text.into(),
            whitespace: whitespace.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Trailing whitespace; empty when the word is directly followed by the next one or
    /// ends the text.
    pub fn whitespace(&self) -> &str {
        &self.whitespace
    }
}

/// A materialized term: one word, its tags and the immutable flag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Term {
    word: Word,
    tags: Vec<Tag>,
    immutable: bool,
}

impl Term {
    pub fn new(word: Word, tags: Vec<Tag>, immutable: bool) -> Term {
        Term {
            word,
            tags,
            immutable,
        }
    }

    pub fn word(&self) -> &Word {
        &self.word
    }

    pub fn text(&self) -> &str {
        self.word.text()
    }

    /// Tags in vocabulary slot order, then in code order within a slot.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Returns the first tag of the given type.
    pub fn tag(&self, tag_type: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.tag_type() == tag_type)
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }
}

/// Lazily decoded view over a shared [`CompactDocument`].
///
/// Each term position owns a `OnceLock` cell; the cells of a sentence are allocated when
/// the sentence is first accessed. Concurrent readers may decode the same position twice,
/// in which case one of the (identical) results is kept.
pub struct MaterializedDocument {
    document: Arc<CompactDocument>,
    /// Tag builder per vocabulary slot.
    builders: Box<[Arc<dyn TagBuilder>]>,
    cache: Box<[OnceLock<Box<[OnceLock<Term>]>>]>,
}

impl MaterializedDocument {
    /// Creates a view, resolving the document's vocabulary against `registry`.
    ///
    /// # Errors
    /// Returns an unknown tag type error if a vocabulary entry has no registered builder.
    pub fn new(
        document: Arc<CompactDocument>,
        registry: &TagBuilderRegistry,
    ) -> Result<MaterializedDocument> {
        let builders = document.vocabulary().resolve(registry)?.into_boxed_slice();
        let cache = (0..document.sentence_count())
            .map(|_| OnceLock::new())
            .collect();
        Ok(MaterializedDocument {
            document,
            builders,
            cache,
        })
    }

    pub fn document(&self) -> &Arc<CompactDocument> {
        &self.document
    }

    pub fn sentence_count(&self) -> usize {
        self.document.sentence_count()
    }

    pub fn sentence(&self, index: usize) -> Option<MaterializedSentence<'_>> {
        let compact = self.document.sentence(index)?;
        Some(MaterializedSentence {
            document: self,
            index,
            compact,
        })
    }

    pub fn sentences(&self) -> impl ExactSizeIterator<Item = MaterializedSentence<'_>> + '_ {
        self.document
            .sentences()
            .iter()
            .enumerate()
            .map(|(index, compact)| MaterializedSentence {
                document: self,
                index,
                compact,
            })
    }

    /// Reconstructs the text of the document (without the title) by concatenating every
    /// word and its trailing whitespace.
    ///
    /// This reads the string tables directly and does not populate the cache.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for sentence in self.document.sentences() {
            append_sentence_text(&self.document, sentence, &mut text);
        }
        text
    }

    /// Returns the term at (`sentence`, `term`), decoding it on first access.
    fn term_at(&self, sentence: usize, term: usize) -> Result<&Term> {
        let compact_sentence = self.document.sentence(sentence).ok_or_else(|| {
            Error::invalid_arg("sentence", format!("index {sentence} is out of bounds"))
        })?;
        let compact = compact_sentence.term(term).ok_or_else(|| {
            Error::invalid_arg(
                "index",
                format!(
                    "index {term} is out of bounds (sentence {sentence} has {} terms)",
                    compact_sentence.len()
                ),
            )
        })?;

        let cells = self.cache[sentence]
            .get_or_init(|| (0..compact_sentence.len()).map(|_| OnceLock::new()).collect());
        let cell = &cells[term];
        if let Some(cached) = cell.get() {
            return Ok(cached);
        }
        let decoded = self.decode(compact)?;
        Ok(cell.get_or_init(|| decoded))
    }

    fn decode(&self, compact: &CompactTerm) -> Result<Term> {
        let word = Word::new(
            self.document.term_text(compact),
            self.document.whitespace_text(compact),
        );
        let mut tags = Vec::new();
        for (slot, codes) in compact.tag_slots().iter().enumerate() {
            let builder = &self.builders[slot];
            for &code in codes.iter() {
                tags.push(builder.build(code)?);
            }
        }
        Ok(Term::new(word, tags, compact.is_immutable()))
    }
}

impl std::fmt::Debug for MaterializedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterializedDocument")
            .field("id", &self.document.id())
            .field("sentences", &self.document.sentence_count())
            .field(
                "cached_sentences",
                &self.cache.iter().filter(|c| c.get().is_some()).count(),
            )
            .finish()
    }
}

fn append_sentence_text(document: &CompactDocument, sentence: &CompactSentence, out: &mut String) {
    for term in sentence.terms() {
        out.push_str(document.term_text(term));
        out.push_str(document.whitespace_text(term));
    }
}

/// List-style change requests a host may issue against a sentence. Materialized
/// sentences are read-only, so [`MaterializedSentence::apply`] rejects all of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SentenceMutation {
    Push(Term),
    Insert(usize, Term),
    Replace(usize, Term),
    Remove(usize),
    Clear,
}

impl SentenceMutation {
    pub fn name(&self) -> &'static str {
        match self {
            SentenceMutation::Push(_) => "push",
            SentenceMutation::Insert(..) => "insert",
            SentenceMutation::Replace(..) => "replace",
            SentenceMutation::Remove(_) => "remove",
            SentenceMutation::Clear => "clear",
        }
    }
}

/// Read-only, fixed-size sequence of the terms of one sentence.
#[derive(Clone, Copy)]
pub struct MaterializedSentence<'a> {
    document: &'a MaterializedDocument,
    index: usize,
    compact: &'a CompactSentence,
}

impl<'a> MaterializedSentence<'a> {
    /// Position of the sentence in its document.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.compact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compact.is_empty()
    }

    pub fn compact(&self) -> &'a CompactSentence {
        self.compact
    }

    /// Returns the term at `index`, decoding it on first access.
    ///
    /// # Errors
    /// - invalid argument error if `index` is out of bounds;
    /// - corrupt document error if a tag code is rejected by its builder.
    pub fn get(&self, index: usize) -> Result<&'a Term> {
        self.document.term_at(self.index, index)
    }

    pub fn iter(&self) -> TermIter<'a> {
        TermIter {
            sentence: *self,
            range: 0..self.len(),
        }
    }

    pub fn contains(&self, term: &Term) -> Result<bool> {
        Ok(self.index_of(term)?.is_some())
    }

    /// Position of the first term equal to `term`.
    pub fn index_of(&self, term: &Term) -> Result<Option<usize>> {
        for (i, candidate) in self.iter().enumerate() {
            if candidate? == term {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Position of the last term equal to `term`.
    pub fn last_index_of(&self, term: &Term) -> Result<Option<usize>> {
        let len = self.len();
        for (i, candidate) in self.iter().rev().enumerate() {
            if candidate? == term {
                return Ok(Some(len - 1 - i));
            }
        }
        Ok(None)
    }

    /// Copies the terms in `range` into an ordinary vector independent of the view.
    pub fn to_vec(&self, range: Range<usize>) -> Result<Vec<Term>> {
        verify_arg!(range, range.start <= range.end && range.end <= self.len());
        range.map(|i| self.get(i).cloned()).collect()
    }

    /// Text of the sentence including the trailing whitespace of its last word.
    pub fn text(&self) -> String {
        let mut text = String::new();
        append_sentence_text(&self.document.document, self.compact, &mut text);
        text
    }

    /// Rejects `mutation`; the sentence is left unchanged.
    pub fn apply(&self, mutation: SentenceMutation) -> Result<()> {
        Err(Error::unsupported_mutation(mutation.name()))
    }
}

impl std::fmt::Debug for MaterializedSentence<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterializedSentence")
            .field("index", &self.index)
            .field("len", &self.len())
            .finish()
    }
}

impl<'a> IntoIterator for MaterializedSentence<'a> {
    type Item = Result<&'a Term>;
    type IntoIter = TermIter<'a>;

    fn into_iter(self) -> TermIter<'a> {
        self.iter()
    }
}

/// Iterator over the terms of a [`MaterializedSentence`].
pub struct TermIter<'a> {
    sentence: MaterializedSentence<'a>,
    range: Range<usize>,
}

impl<'a> Iterator for TermIter<'a> {
    type Item = Result<&'a Term>;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|i| self.sentence.get(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl DoubleEndedIterator for TermIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.range.next_back().map(|i| self.sentence.get(i))
    }
}

impl ExactSizeIterator for TermIter<'_> {}

impl FusedIterator for TermIter<'_> {}

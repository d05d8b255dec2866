//! Compact, interned representation of a processed document.
//!
//! A [`CompactDocument`] holds no per-term strings. Term texts and whitespace fragments
//! are interned into two [`StringTable`]s, tag types into a [`TagVocabulary`], and every
//! token is a [`CompactTerm`] of integer references grouped into [`CompactSentence`]s.
//!
//! Documents are produced by the builders in [`crate::write`] or by the codec, both of
//! which validate the structure before handing the document out, and are immutable from
//! then on. Decoding to word/term/tag objects is done by [`crate::read`].

use std::collections::BTreeMap;

use textdoc_common::{Result, error::Error};
use uuid::Uuid;

use crate::{string_table::StringTable, vocabulary::TagVocabulary};

/// Whitespace reference meaning "no trailing whitespace".
pub const NO_WHITESPACE: u32 = u32::MAX;

/// Integer-indexed encoding of one token.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompactTerm {
    term_index: u32,
    whitespace_index: u32,
    /// Tag codes per vocabulary slot; empty when the term carries no codes at all.
    tags: Box<[Box<[u32]>]>,
    immutable: bool,
}

impl CompactTerm {
    /// Creates an untagged compact term.
    pub fn new(term_index: u32, whitespace_index: Option<u32>, immutable: bool) -> CompactTerm {
        CompactTerm {
            term_index,
            whitespace_index: whitespace_index.unwrap_or(NO_WHITESPACE),
            tags: Box::default(),
            immutable,
        }
    }

    /// Attaches tag codes, one entry per vocabulary slot.
    ///
    /// A structure in which every slot is empty is stored as "no tags", so an untagged
    /// term compares equal however its (empty) slots were supplied.
    pub fn with_tags(mut self, tags: Vec<Vec<u32>>) -> CompactTerm {
        self.tags = if tags.iter().all(Vec::is_empty) {
            Box::default()
        } else {
            tags.into_iter().map(Vec::into_boxed_slice).collect()
        };
        self
    }

    /// Index of the term text in the document's term table.
    #[inline]
    pub fn term_index(&self) -> u32 {
        self.term_index
    }

    /// Index of the trailing whitespace in the document's whitespace table, if any.
    #[inline]
    pub fn whitespace_index(&self) -> Option<u32> {
        (self.whitespace_index != NO_WHITESPACE).then_some(self.whitespace_index)
    }

    /// Whitespace reference including the [`NO_WHITESPACE`] sentinel.
    #[inline]
    pub fn raw_whitespace_index(&self) -> u32 {
        self.whitespace_index
    }

    #[inline]
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// Returns `true` if at least one slot holds a tag code.
    #[inline]
    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Tag codes stored in `slot` (empty for untagged terms and unused slots).
    pub fn tag_codes(&self, slot: usize) -> &[u32] {
        self.tags.get(slot).map_or(&[][..], |codes| &codes[..])
    }

    /// All slots, in vocabulary order; empty for untagged terms.
    pub fn tag_slots(&self) -> &[Box<[u32]>] {
        &self.tags
    }
}

/// Ordered sequence of compact terms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompactSentence {
    terms: Box<[CompactTerm]>,
}

impl CompactSentence {
    pub fn new(terms: Vec<CompactTerm>) -> CompactSentence {
        CompactSentence {
            terms: terms.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, index: usize) -> Option<&CompactTerm> {
        self.terms.get(index)
    }

    pub fn terms(&self) -> &[CompactTerm] {
        &self.terms
    }
}

/// The raw fields of a document, before validation.
#[derive(Debug, Default)]
pub(crate) struct DocumentParts {
    pub id: Uuid,
    pub title: String,
    pub term_count: u32,
    pub metadata: BTreeMap<String, String>,
    pub terms: StringTable,
    pub whitespace: StringTable,
    pub vocabulary: TagVocabulary,
    pub sentences: Vec<CompactSentence>,
}

/// An immutable processed document in compact form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactDocument {
    id: Uuid,
    title: String,
    term_count: u32,
    metadata: BTreeMap<String, String>,
    terms: StringTable,
    whitespace: StringTable,
    vocabulary: TagVocabulary,
    sentences: Box<[CompactSentence]>,
}

impl CompactDocument {
    /// Assembles a document from its parts, checking every structural invariant.
    pub(crate) fn from_parts(parts: DocumentParts) -> Result<CompactDocument> {
        let document = CompactDocument {
            id: parts.id,
            title: parts.title,
            term_count: parts.term_count,
            metadata: parts.metadata,
            terms: parts.terms,
            whitespace: parts.whitespace,
            vocabulary: parts.vocabulary,
            sentences: parts.sentences.into_boxed_slice(),
        };
        document.validate()?;
        Ok(document)
    }

    /// Checks that every term and whitespace reference is in bounds and that every tagged
    /// term has exactly one slot per vocabulary entry.
    pub fn validate(&self) -> Result<()> {
        for (s, sentence) in self.sentences.iter().enumerate() {
            for (t, term) in sentence.terms().iter().enumerate() {
                validate_term_refs(&self.terms, &self.whitespace, &self.vocabulary, s, t, term)?;
            }
        }
        Ok(())
    }

    /// Unique identifier of the document.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Declared number of terms across all sentences.
    pub fn term_count(&self) -> u32 {
        self.term_count
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// Looks up a metadata value.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// All metadata entries, ordered by key.
    pub fn metadata_entries(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.metadata.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn term_table(&self) -> &StringTable {
        &self.terms
    }

    pub fn whitespace_table(&self) -> &StringTable {
        &self.whitespace
    }

    pub fn vocabulary(&self) -> &TagVocabulary {
        &self.vocabulary
    }

    pub fn sentence(&self, index: usize) -> Option<&CompactSentence> {
        self.sentences.get(index)
    }

    pub fn sentences(&self) -> &[CompactSentence] {
        &self.sentences
    }

    /// Returns the compact term at (`sentence`, `term`).
    pub fn term(&self, sentence: usize, term: usize) -> Option<&CompactTerm> {
        self.sentences.get(sentence)?.term(term)
    }

    /// Text of a term of this document.
    pub fn term_text(&self, term: &CompactTerm) -> &str {
        self.terms.get(term.term_index()).unwrap_or_default()
    }

    /// Trailing whitespace of a term of this document (empty for the sentinel).
    pub fn whitespace_text(&self, term: &CompactTerm) -> &str {
        term.whitespace_index()
            .and_then(|index| self.whitespace.get(index))
            .unwrap_or_default()
    }
}

/// Validates the references of the compact term at (`s`, `t`) against the tables.
fn validate_term_refs(
    terms: &StringTable,
    whitespace: &StringTable,
    vocabulary: &TagVocabulary,
    s: usize,
    t: usize,
    term: &CompactTerm,
) -> Result<()> {
    check_term_index(terms, s, t, term.term_index())?;
    check_whitespace_index(whitespace, s, t, term.whitespace_index())?;
    check_slot_count(vocabulary, s, t, term)
}

pub(crate) fn check_term_index(terms: &StringTable, s: usize, t: usize, index: u32) -> Result<()> {
    if !terms.contains_index(index) {
        return Err(Error::corrupt_document(
            format!("sentence[{s}].term[{t}].term_index"),
            format!("index {index} is out of bounds (term table len {})", terms.len()),
        ));
    }
    Ok(())
}

pub(crate) fn check_whitespace_index(
    whitespace: &StringTable,
    s: usize,
    t: usize,
    index: Option<u32>,
) -> Result<()> {
    match index {
        Some(index) if !whitespace.contains_index(index) => Err(Error::corrupt_document(
            format!("sentence[{s}].term[{t}].whitespace_index"),
            format!(
                "index {index} is out of bounds (whitespace table len {})",
                whitespace.len()
            ),
        )),
        _ => Ok(()),
    }
}

fn check_slot_count(
    vocabulary: &TagVocabulary,
    s: usize,
    t: usize,
    term: &CompactTerm,
) -> Result<()> {
    if term.has_tags() && term.tag_slots().len() != vocabulary.len() {
        return Err(Error::corrupt_document(
            format!("sentence[{s}].term[{t}].tags"),
            format!(
                "{} tag slots, vocabulary has {}",
                term.tag_slots().len(),
                vocabulary.len()
            ),
        ));
    }
    Ok(())
}

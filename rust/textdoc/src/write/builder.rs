//! Low-level document builder.

use std::collections::BTreeMap;
use std::sync::Arc;

use textdoc_common::{Result, error::Error};
use uuid::Uuid;

use crate::{
    document::{CompactDocument, CompactSentence, CompactTerm, DocumentParts},
    string_table::StringTable,
    tags::{Tag, TagBuilder, TagBuilderRegistry},
    vocabulary::TagVocabulary,
};

/// One pre-tokenized term: its text, trailing whitespace, tags and immutable flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TermInput {
    pub text: String,
    pub whitespace: String,
    pub tags: Vec<Tag>,
    pub immutable: bool,
}

impl TermInput {
    pub fn new(text: impl Into<String>, whitespace: impl Into<String>) -> TermInput {
        TermInput {
            text: text.into(),
            whitespace: whitespace.into(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: Tag) -> TermInput {
        self.tags.push(tag);
        self
    }

    pub fn immutable(mut self) -> TermInput {
        self.immutable = true;
        self
    }
}

/// Builds a [`CompactDocument`] from tokenized sentences.
///
/// Terms are pushed one at a time into the current sentence with [`push_term`] or
/// [`push_tagged_term`]; [`end_sentence`] closes the sentence. [`push_sentence`] adds a
/// whole sentence of [`TermInput`]s at once. Term texts and
/// whitespace fragments are interned on first sight, so index assignment follows the
/// order in which strings are first pushed.
///
/// Tags are mapped to `(vocabulary slot, code)` pairs through the registry the builder
/// was created with. The vocabulary grows as new tag types are seen; terms tagged before
/// a type was added get an empty slot for it when the document is sealed.
///
/// [`push_term`]: DocumentBuilder::push_term
/// [`push_tagged_term`]: DocumentBuilder::push_tagged_term
/// [`end_sentence`]: DocumentBuilder::end_sentence
/// [`push_sentence`]: DocumentBuilder::push_sentence
pub struct DocumentBuilder {
    registry: Arc<TagBuilderRegistry>,
    id: Option<Uuid>,
    title: String,
    metadata: BTreeMap<String, String>,
    terms: StringTable,
    whitespace: StringTable,
    vocabulary: TagVocabulary,
    /// Builders of the vocabulary slots, in slot order.
    slot_builders: Vec<Arc<dyn TagBuilder>>,
    sentences: Vec<CompactSentence>,
    /// Terms of the sentence currently being built.
    current: Vec<CompactTerm>,
    term_count: u32,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    /// Creates a builder for untagged documents (empty tag registry).
    pub fn new() -> DocumentBuilder {
        Self::with_registry(Arc::new(TagBuilderRegistry::new()))
    }

    /// Creates a builder resolving tags through `registry`.
    pub fn with_registry(registry: Arc<TagBuilderRegistry>) -> DocumentBuilder {
        DocumentBuilder {
            registry,
            id: None,
            title: String::new(),
            metadata: BTreeMap::new(),
            terms: StringTable::new(),
            whitespace: StringTable::new(),
            vocabulary: TagVocabulary::new(),
            slot_builders: Vec::new(),
            sentences: Vec::new(),
            current: Vec::new(),
            term_count: 0,
        }
    }

    /// Sets the document identifier. A random (v4) identifier is generated otherwise.
    pub fn id(&mut self, id: Uuid) -> &mut Self {
        self.id = Some(id);
        self
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn metadata(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Pre-declares tag types so that they occupy the first vocabulary slots in the given
    /// order.
    ///
    /// # Errors
    /// Returns an unknown tag type error if a type is not registered.
    pub fn declare_tag_types<'a>(
        &mut self,
        type_names: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self> {
        for name in type_names {
            if self.vocabulary.slot_of(name).is_none() {
                let builder = self.registry.resolve(name)?;
                self.add_slot(name, builder);
            }
        }
        Ok(self)
    }

    /// Appends an untagged, mutable term to the current sentence.
    ///
    /// An empty `whitespace` is stored as "no trailing whitespace".
    pub fn push_term(&mut self, text: &str, whitespace: &str) {
        let term = self.intern_term(text, whitespace, false);
        self.current.push(term);
        self.term_count += 1;
    }

    /// Appends a term carrying `tags` to the current sentence.
    ///
    /// Either the whole term is added or, on error, nothing changes.
    ///
    /// # Errors
    /// - unknown tag type error if a tag's type is not registered;
    /// - invalid argument error if the tag's builder has no code for its value.
    pub fn push_tagged_term(
        &mut self,
        text: &str,
        whitespace: &str,
        tags: &[Tag],
        immutable: bool,
    ) -> Result<()> {
        let codes = self.resolve_codes(tags)?;
        self.push_resolved(text, whitespace, codes, immutable);
        Ok(())
    }

    /// Appends a whole sentence of pre-tokenized terms and closes it.
    ///
    /// The tags of every term are checked before anything is added, so on error the
    /// builder is left unchanged.
    pub fn push_sentence(&mut self, terms: &[TermInput]) -> Result<()> {
        let resolved = terms
            .iter()
            .map(|term| self.resolve_codes(&term.tags))
            .collect::<Result<Vec<_>>>()?;
        for (term, codes) in terms.iter().zip(resolved) {
            self.push_resolved(&term.text, &term.whitespace, codes, term.immutable);
        }
        self.end_sentence();
        Ok(())
    }

    /// Closes the current sentence. Calling this with no pushed terms adds an empty
    /// sentence.
    pub fn end_sentence(&mut self) {
        let terms = std::mem::take(&mut self.current);
        log::trace!("sentence #{} closed with {} terms", self.sentences.len(), terms.len());
        self.sentences.push(CompactSentence::new(terms));
    }

    /// Number of terms pushed so far.
    pub fn term_count(&self) -> u32 {
        self.term_count
    }

    /// Seals the document. A sentence with pending terms is closed first.
    pub fn build(mut self) -> Result<CompactDocument> {
        if !self.current.is_empty() {
            self.end_sentence();
        }

        let slot_count = self.vocabulary.len();
        let sentence_count = self.sentences.len();
        let sentences = self
            .sentences
            .into_iter()
            .map(|sentence| pad_tag_slots(sentence, slot_count))
            .collect();

        log::debug!(
            "built document: {} sentences, {} terms, {} distinct terms, {} distinct whitespace, {} tag types",
            sentence_count,
            self.term_count,
            self.terms.len(),
            self.whitespace.len(),
            slot_count
        );

        CompactDocument::from_parts(DocumentParts {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            title: self.title,
            term_count: self.term_count,
            metadata: self.metadata,
            terms: self.terms,
            whitespace: self.whitespace,
            vocabulary: self.vocabulary,
            sentences,
        })
    }

    /// Maps every tag to its code without modifying the builder.
    fn resolve_codes<'t>(&self, tags: &'t [Tag]) -> Result<Vec<ResolvedTag<'t>>> {
        let mut codes = Vec::with_capacity(tags.len());
        for tag in tags {
            let builder = match self.vocabulary.slot_of(tag.tag_type()) {
                Some(slot) => Arc::clone(&self.slot_builders[slot]),
                None => self.registry.resolve(tag.tag_type())?,
            };
            let code = builder.code_of(tag.value()).ok_or_else(|| {
                Error::invalid_arg(
                    "tags",
                    format!("'{}' is not a known {} tag", tag.value(), tag.tag_type()),
                )
            })?;
            codes.push(ResolvedTag {
                type_name: tag.tag_type(),
                code,
                builder,
            });
        }
        Ok(codes)
    }

    /// Appends a term whose tags were resolved by `resolve_codes`.
    fn push_resolved(
        &mut self,
        text: &str,
        whitespace: &str,
        codes: Vec<ResolvedTag<'_>>,
        immutable: bool,
    ) {
        let mut slots: Vec<Vec<u32>> = vec![Vec::new(); self.vocabulary.len()];
        for tag in codes {
            let slot = match self.vocabulary.slot_of(tag.type_name) {
                Some(slot) => slot,
                None => self.add_slot(tag.type_name, tag.builder),
            };
            if slot >= slots.len() {
                slots.resize(slot + 1, Vec::new());
            }
            slots[slot].push(tag.code);
        }
        let term = self.intern_term(text, whitespace, immutable).with_tags(slots);
        self.current.push(term);
        self.term_count += 1;
    }

    fn intern_term(&mut self, text: &str, whitespace: &str, immutable: bool) -> CompactTerm {
        let term_index = self.terms.intern(text);
        let whitespace_index = (!whitespace.is_empty()).then(|| self.whitespace.intern(whitespace));
        CompactTerm::new(term_index, whitespace_index, immutable)
    }

    fn add_slot(&mut self, type_name: &str, builder: Arc<dyn TagBuilder>) -> usize {
        let slot = self.vocabulary.slot_or_insert(type_name);
        self.slot_builders.push(builder);
        slot
    }
}

/// A tag mapped to its code, with the builder that produced the code.
struct ResolvedTag<'t> {
    type_name: &'t str,
    code: u32,
    builder: Arc<dyn TagBuilder>,
}

/// Extends the tag structure of every tagged term to `slot_count` slots.
fn pad_tag_slots(sentence: CompactSentence, slot_count: usize) -> CompactSentence {
    if sentence
        .terms()
        .iter()
        .all(|t| !t.has_tags() || t.tag_slots().len() == slot_count)
    {
        return sentence;
    }
    let terms = sentence
        .terms()
        .iter()
        .map(|term| {
            if !term.has_tags() || term.tag_slots().len() == slot_count {
                return term.clone();
            }
            let mut slots: Vec<Vec<u32>> = term.tag_slots().iter().map(|s| s.to_vec()).collect();
            slots.resize(slot_count, Vec::new());
            term.clone().with_tags(slots)
        })
        .collect();
    CompactSentence::new(terms)
}

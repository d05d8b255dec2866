//! Compact, interned text documents.
//!
//! A processed document (title, sentences, words, whitespace, tags) is held as a
//! [`CompactDocument`]: two interned [`StringTable`]s (term texts and whitespace
//! fragments), a [`TagVocabulary`] and per-sentence arrays of integer-indexed
//! [`CompactTerm`]s. Word/term/tag objects are reconstructed on demand by
//! [`MaterializedDocument`], and [`DocumentCodec`] serializes documents field by field.
//!
//! # Overview
//!
//! - **Write path**: [`TokenizingBuilder`] splits raw text with a sentence and a word
//!   [`Tokenizer`]; [`DocumentBuilder`] accepts pre-tokenized, optionally tagged terms.
//! - **Read path**: [`MaterializedDocument`] decodes terms lazily and caches them per
//!   position; sentences are read-only sequences.
//! - **Persistence**: [`DocumentCodec`] writes the records or flat layout behind a
//!   versioned header.
//!
//! Tags are resolved through an explicit [`TagBuilderRegistry`].
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use textdoc::{DocumentCodec, MaterializedDocument, TagBuilderRegistry, TokenizingBuilder};
//!
//! let document = TokenizingBuilder::default()
//!     .build("Hello world. Bye.", Some("greeting"))
//!     .unwrap();
//! assert_eq!(document.sentence_count(), 2);
//!
//! let registry = Arc::new(TagBuilderRegistry::standard());
//! let codec = DocumentCodec::new(Arc::clone(&registry));
//! let bytes = codec.encode_to_vec(&document).unwrap();
//! let decoded = codec.decode_from_slice(&bytes).unwrap();
//! assert_eq!(decoded, document);
//!
//! let view = MaterializedDocument::new(Arc::new(decoded), &registry).unwrap();
//! assert_eq!(view.sentence(0).unwrap().get(1).unwrap().text(), "world.");
//! assert_eq!(view.text(), "Hello world. Bye.");
//! ```

pub mod codec;
pub mod document;
pub mod read;
pub mod string_table;
pub mod tags;
pub mod tokenizers;
pub mod vocabulary;
pub mod write;

pub use codec::{CodecOptions, DocumentCodec, DocumentEncoding};
pub use document::{CompactDocument, CompactSentence, CompactTerm};
pub use read::{MaterializedDocument, MaterializedSentence, SentenceMutation, Term, Word};
pub use string_table::StringTable;
pub use tags::{EnumTagBuilder, Tag, TagBuilder, TagBuilderRegistry};
pub use tokenizers::{Tokenizer, create_tokenizer};
pub use vocabulary::TagVocabulary;
pub use write::{
    builder::{DocumentBuilder, TermInput},
    tokenizing::{DocumentInput, TokenizingBuilder, TokenizingBuilderConfig},
};

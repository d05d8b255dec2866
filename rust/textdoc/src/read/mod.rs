//! Read path: full-fidelity views over a [`CompactDocument`].
//!
//! A [`MaterializedDocument`] decodes compact terms into [`Term`] objects (word text,
//! trailing whitespace, tags) on first access and caches the result per position.
//! Sentences are exposed as [`MaterializedSentence`], a fixed-size read-only sequence.
//!
//! [`CompactDocument`]: crate::document::CompactDocument

pub mod materialize;

pub use materialize::{
    MaterializedDocument, MaterializedSentence, SentenceMutation, Term, TermIter, Word,
};

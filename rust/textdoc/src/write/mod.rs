//! Document construction.
//!
//! - [`builder::DocumentBuilder`] accepts already tokenized terms (with their trailing
//!   whitespace and optional tags), interns them and seals a [`CompactDocument`].
//! - [`tokenizing::TokenizingBuilder`] drives a `DocumentBuilder` from raw text, using a
//!   sentence tokenizer and a word tokenizer.
//!
//! Building a document is single-threaded and touches no shared state; independent
//! documents can be built in parallel (see [`tokenizing::TokenizingBuilder::build_batch`]).
//!
//! [`CompactDocument`]: crate::document::CompactDocument

pub mod builder;
pub mod tokenizing;

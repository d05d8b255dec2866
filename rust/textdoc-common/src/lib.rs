//! Core definitions (error type, result alias and verification helpers), relied upon by
//! all textdoc-* crates.

pub mod error;
pub mod result;

pub use result::Result;

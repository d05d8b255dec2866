//! Bit manipulation utilities for textdoc data processing.
//!
//! - [`BitSet`]: fixed-capacity bit set whose backing words can be exported as raw
//!   little-endian bytes (LSB-first bit order) and rebuilt from them.

pub mod bit_set;

pub use bit_set::BitSet;

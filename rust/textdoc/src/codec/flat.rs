//! Flat encoding: every sentence is written as parallel arrays.
//!
//! ```text
//! sentence := n:u32 term_index:i32{n} whitespace_index:i32{n}
//!             code_count:u32{n * V}            (omitted when V = 0)
//!             total_codes:u32 code:u32{total_codes}
//!             immutable_len:u32 immutable_bytes:u8{immutable_len}
//! ```
//!
//! `V` is the vocabulary size. Code counts are term-major: the counts of term 0 for
//! every slot, then those of term 1, and so on. The immutable flags form a bit set whose
//! little-endian backing bytes are written with trailing zero bytes trimmed.

use std::io::{Read, Write};

use textdoc_bits::BitSet;
use textdoc_common::{Result, error::Error, verify_data};

use super::{
    TableRefs,
    wire::{NO_WHITESPACE_WIRE, WireReader, WireWriter, bounded_vec},
};
use crate::document::{CompactSentence, CompactTerm};

pub(super) fn encode_sentence<W: Write + ?Sized>(
    w: &mut WireWriter<'_, W>,
    sentence: &CompactSentence,
    slot_count: usize,
) -> Result<()> {
    let terms = sentence.terms();
    w.write_count("sentence", terms.len())?;
    for term in terms {
        w.write_index("term_index", term.term_index())?;
    }
    for term in terms {
        match term.whitespace_index() {
            Some(index) => w.write_index("whitespace_index", index)?,
            None => w.write_i32(NO_WHITESPACE_WIRE)?,
        }
    }

    let mut total_codes = 0usize;
    if slot_count > 0 {
        for term in terms {
            for slot in 0..slot_count {
                let count = term.tag_codes(slot).len();
                w.write_count("tags", count)?;
                total_codes += count;
            }
        }
    }
    w.write_count("tags", total_codes)?;
    for term in terms {
        for codes in term.tag_slots() {
            for &code in codes.iter() {
                w.write_u32(code)?;
            }
        }
    }

    let immutable = BitSet::from_bools(terms.iter().map(CompactTerm::is_immutable));
    let bytes = immutable.to_bytes();
    w.write_count("immutable", bytes.len())?;
    w.write_bytes(&bytes)
}

pub(super) fn decode_sentence<R: Read + ?Sized>(
    r: &mut WireReader<'_, R>,
    tables: &TableRefs<'_>,
    s: usize,
) -> Result<CompactSentence> {
    let element = |field: &str| format!("sentence[{s}].{field}");
    let n = r.read_count(&element("term_count"))?;

    let mut term_indices = bounded_vec(n);
    for t in 0..n {
        let index = r.read_index(&element("term_index"))?;
        tables.check_term_index(s, t, index)?;
        term_indices.push(index);
    }
    let mut whitespace_indices = bounded_vec(n);
    for t in 0..n {
        let index = r.read_whitespace_index(&element("whitespace_index"))?;
        tables.check_whitespace_index(s, t, index)?;
        whitespace_indices.push(index);
    }

    let slot_count = tables.vocabulary.len();
    let mut code_counts: Vec<usize> = bounded_vec(n.saturating_mul(slot_count));
    if slot_count > 0 {
        for _ in 0..n * slot_count {
            code_counts.push(r.read_count(&element("tags"))?);
        }
    }
    let expected_total = code_counts
        .iter()
        .try_fold(0usize, |acc, &c| acc.checked_add(c))
        .ok_or_else(|| Error::corrupt_document(element("tags"), "code counts overflow"))?;
    let total = r.read_count(&element("tags"))?;
    if total != expected_total {
        return Err(Error::corrupt_document(
            element("tags"),
            format!("{total} codes declared, per-term counts sum to {expected_total}"),
        ));
    }
    let mut codes = bounded_vec(total);
    for _ in 0..total {
        codes.push(r.read_u32(&element("tags"))?);
    }

    let immutable_len = r.read_count(&element("immutable"))?;
    verify_data!(immutable, immutable_len <= n.div_ceil(8));
    let immutable_bytes = r.read_bytes(&element("immutable"), immutable_len)?;
    let immutable = BitSet::from_bytes(n, &immutable_bytes).ok_or_else(|| {
        Error::corrupt_document(
            element("immutable"),
            format!("{immutable_len} bytes do not describe a bit set of {n} terms"),
        )
    })?;

    let mut terms = Vec::with_capacity(n);
    let mut code_pos = 0;
    for t in 0..n {
        let mut term = CompactTerm::new(term_indices[t], whitespace_indices[t], immutable.get(t));
        if slot_count > 0 {
            let slots = code_counts[t * slot_count..(t + 1) * slot_count]
                .iter()
                .map(|&count| {
                    let slot = codes[code_pos..code_pos + count].to_vec();
                    code_pos += count;
                    slot
                })
                .collect();
            term = term.with_tags(slots);
        }
        terms.push(term);
    }
    Ok(CompactSentence::new(terms))
}

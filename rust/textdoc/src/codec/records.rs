//! Records encoding: every term is written as one self-contained record.
//!
//! ```text
//! sentence := term_count:u32 term*
//! term     := has_tags:u8 term_index:i32 whitespace_index:i32 immutable:u8
//!             [slot_count:u32 (code_count:u32 code:u32*){slot_count}]   if has_tags
//! ```

use std::io::{Read, Write};

use textdoc_common::{Result, error::Error};

use super::{
    TableRefs,
    wire::{NO_WHITESPACE_WIRE, WireReader, WireWriter, bounded_vec},
};
use crate::document::{CompactSentence, CompactTerm};

pub(super) fn encode_sentence<W: Write + ?Sized>(
    w: &mut WireWriter<'_, W>,
    sentence: &CompactSentence,
) -> Result<()> {
    w.write_count("sentence", sentence.len())?;
    for term in sentence.terms() {
        w.write_bool(term.has_tags())?;
        w.write_index("term_index", term.term_index())?;
        match term.whitespace_index() {
            Some(index) => w.write_index("whitespace_index", index)?,
            None => w.write_i32(NO_WHITESPACE_WIRE)?,
        }
        w.write_bool(term.is_immutable())?;
        if term.has_tags() {
            w.write_count("tags", term.tag_slots().len())?;
            for codes in term.tag_slots() {
                w.write_count("tags", codes.len())?;
                for &code in codes.iter() {
                    w.write_u32(code)?;
                }
            }
        }
    }
    Ok(())
}

pub(super) fn decode_sentence<R: Read + ?Sized>(
    r: &mut WireReader<'_, R>,
    tables: &TableRefs<'_>,
    s: usize,
) -> Result<CompactSentence> {
    let len = r.read_count(&format!("sentence[{s}].term_count"))?;
    let mut terms = bounded_vec(len);
    for t in 0..len {
        let element = |field: &str| format!("sentence[{s}].term[{t}].{field}");
        let has_tags = r.read_bool(&element("has_tags"))?;
        let term_index = r.read_index(&element("term_index"))?;
        tables.check_term_index(s, t, term_index)?;
        let whitespace_index = r.read_whitespace_index(&element("whitespace_index"))?;
        tables.check_whitespace_index(s, t, whitespace_index)?;
        let immutable = r.read_bool(&element("immutable"))?;
        let mut term = CompactTerm::new(term_index, whitespace_index, immutable);

        if has_tags {
            let slot_count = r.read_count(&element("tags"))?;
            if slot_count != tables.vocabulary.len() {
                return Err(Error::corrupt_document(
                    element("tags"),
                    format!(
                        "{slot_count} tag slots, vocabulary has {}",
                        tables.vocabulary.len()
                    ),
                ));
            }
            let mut slots = Vec::with_capacity(slot_count);
            for _ in 0..slot_count {
                let code_count = r.read_count(&element("tags"))?;
                let mut codes = bounded_vec(code_count);
                for _ in 0..code_count {
                    codes.push(r.read_u32(&element("tags"))?);
                }
                slots.push(codes);
            }
            term = term.with_tags(slots);
        }
        terms.push(term);
    }
    Ok(CompactSentence::new(terms))
}

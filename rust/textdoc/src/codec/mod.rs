//! Binary serialization of [`CompactDocument`].
//!
//! A serialized document is a fixed sequence of fields, all little-endian:
//!
//! ```text
//! header     := magic_version:u32 encoding:u8          (absent in legacy mode)
//! document   := id:str title:str term_count:u32
//!               term_table whitespace_table vocabulary metadata sentences
//! table      := count:u32 str{count}                   (term_table, whitespace_table, vocabulary)
//! metadata   := count:u32 (key:str value:str){count}
//! sentences  := count:u32 sentence{count}
//! str        := len:u32 utf8:u8{len}
//! ```
//!
//! Sentences use either the records or the flat layout (see [`DocumentEncoding`]); the
//! header records which one. Whitespace indices are written as i32 with `-1` meaning
//! "no trailing whitespace".
//!
//! Decoding resolves every vocabulary entry against the codec's tag builder registry and
//! validates each term as soon as it is read, stopping at the first violation.

mod flat;
mod records;
pub mod wire;

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use textdoc_common::{Result, error::Error, verify_data};
use uuid::Uuid;

use crate::{
    document::{CompactDocument, DocumentParts, check_term_index, check_whitespace_index},
    string_table::StringTable,
    tags::TagBuilderRegistry,
    vocabulary::TagVocabulary,
};
use wire::{WireReader, WireWriter, bounded_vec};

/// Signature and version of the serialized document format.
pub const FORMAT_MAGIC_VERSION: u32 = 0x5444_0001;

/// Layout of the sentence section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentEncoding {
    /// One record per term.
    #[default]
    Records,
    /// Parallel per-sentence arrays.
    Flat,
}

impl DocumentEncoding {
    pub fn as_u8(self) -> u8 {
        match self {
            DocumentEncoding::Records => 0,
            DocumentEncoding::Flat => 1,
        }
    }
}

impl TryFrom<u8> for DocumentEncoding {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(DocumentEncoding::Records),
            1 => Ok(DocumentEncoding::Flat),
            _ => Err(Error::corrupt_document(
                "header.encoding",
                format!("unknown encoding {value}"),
            )),
        }
    }
}

/// Codec settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Sentence layout used by `encode`. With a header, `decode` takes the layout from
    /// the stream instead.
    pub encoding: DocumentEncoding,

    /// Omit the header on encode and do not expect it on decode.
    pub legacy: bool,
}

/// Encodes and decodes compact documents.
#[derive(Clone, Debug)]
pub struct DocumentCodec {
    registry: Arc<TagBuilderRegistry>,
    options: CodecOptions,
}

impl DocumentCodec {
    /// Creates a codec with default options (records encoding, with header).
    pub fn new(registry: Arc<TagBuilderRegistry>) -> DocumentCodec {
        Self::with_options(registry, CodecOptions::default())
    }

    pub fn with_options(registry: Arc<TagBuilderRegistry>, options: CodecOptions) -> DocumentCodec {
        DocumentCodec { registry, options }
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }

    /// Writes `document` to `w`, returning the number of bytes written.
    ///
    /// Encoding is deterministic: equal documents produce identical bytes.
    pub fn encode<W>(&self, document: &CompactDocument, w: &mut W) -> Result<usize>
    where
        W: Write + ?Sized,
    {
        let mut w = WireWriter::new(w);
        if !self.options.legacy {
            w.write_u32(FORMAT_MAGIC_VERSION)?;
            w.write_u8(self.options.encoding.as_u8())?;
        }

        w.write_str("id", &document.id().hyphenated().to_string())?;
        w.write_str("title", document.title())?;
        w.write_u32(document.term_count())?;
        write_table(&mut w, "term_table", document.term_table())?;
        write_table(&mut w, "whitespace_table", document.whitespace_table())?;

        let vocabulary = document.vocabulary();
        w.write_count("vocabulary", vocabulary.len())?;
        for type_name in vocabulary.iter() {
            w.write_str("vocabulary", type_name)?;
        }

        w.write_count("metadata", document.metadata_entries().len())?;
        for (key, value) in document.metadata_entries() {
            w.write_str("metadata", key)?;
            w.write_str("metadata", value)?;
        }

        w.write_count("sentences", document.sentence_count())?;
        for sentence in document.sentences() {
            match self.options.encoding {
                DocumentEncoding::Records => records::encode_sentence(&mut w, sentence)?,
                DocumentEncoding::Flat => {
                    flat::encode_sentence(&mut w, sentence, vocabulary.len())?
                }
            }
        }

        log::debug!(
            "encoded document {} ({:?}): {} sentences, {} bytes",
            document.id(),
            self.options.encoding,
            document.sentence_count(),
            w.written()
        );
        Ok(w.written())
    }

    pub fn encode_to_vec(&self, document: &CompactDocument) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(document, &mut buf)?;
        Ok(buf)
    }

    /// Reads a document from `r`.
    ///
    /// # Errors
    /// - corrupt document error for malformed or truncated input, naming the element
    ///   being read;
    /// - unknown tag type error if a vocabulary entry is not registered;
    /// - IO error if the underlying reader fails.
    pub fn decode<R>(&self, r: &mut R) -> Result<CompactDocument>
    where
        R: Read + ?Sized,
    {
        let mut r = WireReader::new(r);
        let encoding = if self.options.legacy {
            self.options.encoding
        } else {
            let magic = r.read_u32("header.magic")?;
            verify_data!(header.magic, magic == FORMAT_MAGIC_VERSION);
            DocumentEncoding::try_from(r.read_u8("header.encoding")?)?
        };

        let id_text = r.read_string("id")?;
        let id = Uuid::parse_str(&id_text)
            .map_err(|e| Error::corrupt_document("id", format!("'{id_text}': {e}")))?;
        let title = r.read_string("title")?;
        let term_count = r.read_u32("term_count")?;
        let terms = read_table(&mut r, "term_table")?;
        let whitespace = read_table(&mut r, "whitespace_table")?;

        let vocabulary_len = r.read_count("vocabulary")?;
        let mut type_names = bounded_vec(vocabulary_len);
        for _ in 0..vocabulary_len {
            type_names.push(r.read_string("vocabulary")?);
        }
        let vocabulary = TagVocabulary::from_type_names(type_names)?;
        vocabulary.resolve(&self.registry)?;

        let metadata_len = r.read_count("metadata")?;
        let mut metadata = BTreeMap::new();
        for _ in 0..metadata_len {
            let key = r.read_string("metadata")?;
            let value = r.read_string("metadata")?;
            if metadata.contains_key(&key) {
                return Err(Error::corrupt_document(
                    "metadata",
                    format!("duplicate key '{key}'"),
                ));
            }
            metadata.insert(key, value);
        }

        let sentence_count = r.read_count("sentences")?;
        let tables = TableRefs {
            terms: &terms,
            whitespace: &whitespace,
            vocabulary: &vocabulary,
        };
        let mut sentences = bounded_vec(sentence_count);
        for s in 0..sentence_count {
            let sentence = match encoding {
                DocumentEncoding::Records => records::decode_sentence(&mut r, &tables, s)?,
                DocumentEncoding::Flat => flat::decode_sentence(&mut r, &tables, s)?,
            };
            sentences.push(sentence);
        }

        let actual_terms: usize = sentences.iter().map(|s| s.len()).sum();
        if actual_terms != term_count as usize {
            log::warn!("document {id} declares {term_count} terms but holds {actual_terms}");
        }
        log::debug!(
            "decoded document {id} ({encoding:?}): {sentence_count} sentences, {} distinct terms",
            terms.len()
        );

        CompactDocument::from_parts(DocumentParts {
            id,
            title,
            term_count,
            metadata,
            terms,
            whitespace,
            vocabulary,
            sentences,
        })
    }

    pub fn decode_from_slice(&self, bytes: &[u8]) -> Result<CompactDocument> {
        let mut reader = bytes;
        self.decode(&mut reader)
    }
}

/// Tables a decoded term is checked against. Each index is checked as soon as it is
/// read, so the first violation in wire order is the one reported.
pub(crate) struct TableRefs<'a> {
    terms: &'a StringTable,
    whitespace: &'a StringTable,
    vocabulary: &'a TagVocabulary,
}

impl TableRefs<'_> {
    fn check_term_index(&self, s: usize, t: usize, index: u32) -> Result<()> {
        check_term_index(self.terms, s, t, index)
    }

    fn check_whitespace_index(&self, s: usize, t: usize, index: Option<u32>) -> Result<()> {
        check_whitespace_index(self.whitespace, s, t, index)
    }
}

fn write_table<W: Write + ?Sized>(
    w: &mut WireWriter<'_, W>,
    element: &str,
    table: &StringTable,
) -> Result<()> {
    w.write_count(element, table.len())?;
    for s in table.iter() {
        w.write_str(element, s)?;
    }
    Ok(())
}

fn read_table<R: Read + ?Sized>(r: &mut WireReader<'_, R>, element: &str) -> Result<StringTable> {
    let len = r.read_count(element)?;
    let mut strings = bounded_vec(len);
    for _ in 0..len {
        strings.push(r.read_string(element)?);
    }
    StringTable::from_strings(element, strings)
}

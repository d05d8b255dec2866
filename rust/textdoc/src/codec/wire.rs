//! Primitive wire values: little-endian integers, one-byte flags and length-prefixed
//! UTF-8 strings.
//!
//! Reads are attributed to the document element being decoded, so a truncated or
//! malformed stream is reported as a corrupt document naming that element.

use std::io::{self, Read, Write};

use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use textdoc_common::{Result, error::Error};

/// Longest string accepted on decode (16 MiB).
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Upper bound on capacity reserved ahead of reading elements whose count comes from
/// the stream.
pub const MAX_PREALLOC: usize = 4096;

/// Whitespace index written for "no trailing whitespace".
pub const NO_WHITESPACE_WIRE: i32 = -1;

/// Returns `Vec::with_capacity` bounded by [`MAX_PREALLOC`].
pub fn bounded_vec<T>(declared: usize) -> Vec<T> {
    Vec::with_capacity(declared.min(MAX_PREALLOC))
}

/// Counting writer of wire values.
pub struct WireWriter<'a, W: Write + ?Sized> {
    inner: &'a mut W,
    written: usize,
}

impl<'a, W: Write + ?Sized> WireWriter<'a, W> {
    pub fn new(inner: &'a mut W) -> Self {
        WireWriter { inner, written: 0 }
    }

    /// Number of bytes written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_u8(value).map_err(write_err)?;
        self.written += 1;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.inner.write_u32::<LE>(value).map_err(write_err)?;
        self.written += 4;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.inner.write_i32::<LE>(value).map_err(write_err)?;
        self.written += 4;
        Ok(())
    }

    /// Writes a collection length as a u32 count.
    pub fn write_count(&mut self, element: &str, count: usize) -> Result<()> {
        let count = u32::try_from(count).map_err(|_| {
            Error::invalid_arg(element, format!("count {count} does not fit the wire format"))
        })?;
        self.write_u32(count)
    }

    /// Writes a table index as an i32.
    pub fn write_index(&mut self, element: &str, index: u32) -> Result<()> {
        let index = i32::try_from(index).map_err(|_| {
            Error::invalid_arg(element, format!("index {index} does not fit the wire format"))
        })?;
        self.write_i32(index)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).map_err(write_err)?;
        self.written += bytes.len();
        Ok(())
    }

    pub fn write_str(&mut self, element: &str, s: &str) -> Result<()> {
        self.write_count(element, s.len())?;
        self.write_bytes(s.as_bytes())
    }
}

fn write_err(e: io::Error) -> Error {
    Error::io("encode document", e)
}

/// Reader of wire values.
pub struct WireReader<'a, R: Read + ?Sized> {
    inner: &'a mut R,
}

impl<'a, R: Read + ?Sized> WireReader<'a, R> {
    pub fn new(inner: &'a mut R) -> Self {
        WireReader { inner }
    }

    pub fn read_u8(&mut self, element: &str) -> Result<u8> {
        self.inner.read_u8().map_err(|e| read_err(element, e))
    }

    /// Reads a flag byte; anything other than 0 or 1 is corrupt.
    pub fn read_bool(&mut self, element: &str) -> Result<bool> {
        match self.read_u8(element)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::corrupt_document(
                element,
                format!("invalid flag value {other}"),
            )),
        }
    }

    pub fn read_u32(&mut self, element: &str) -> Result<u32> {
        self.inner.read_u32::<LE>().map_err(|e| read_err(element, e))
    }

    pub fn read_i32(&mut self, element: &str) -> Result<i32> {
        self.inner.read_i32::<LE>().map_err(|e| read_err(element, e))
    }

    pub fn read_count(&mut self, element: &str) -> Result<usize> {
        Ok(self.read_u32(element)? as usize)
    }

    /// Reads a table index; negative values are corrupt.
    pub fn read_index(&mut self, element: &str) -> Result<u32> {
        let index = self.read_i32(element)?;
        u32::try_from(index)
            .map_err(|_| Error::corrupt_document(element, format!("negative index {index}")))
    }

    /// Reads a whitespace index: [`NO_WHITESPACE_WIRE`] or a non-negative index.
    pub fn read_whitespace_index(&mut self, element: &str) -> Result<Option<u32>> {
        match self.read_i32(element)? {
            NO_WHITESPACE_WIRE => Ok(None),
            index => u32::try_from(index).map(Some).map_err(|_| {
                Error::corrupt_document(element, format!("negative index {index}"))
            }),
        }
    }

    /// Reads exactly `len` bytes. The buffer grows with the data actually read, so a
    /// bogus length cannot trigger a large allocation up front.
    pub fn read_bytes(&mut self, element: &str, len: usize) -> Result<Vec<u8>> {
        let mut bytes = bounded_vec(len);
        let read = (&mut *self.inner)
            .take(len as u64)
            .read_to_end(&mut bytes)
            .map_err(|e| read_err(element, e))?;
        if read != len {
            return Err(Error::corrupt_document(
                element,
                format!("unexpected end of input ({read} of {len} bytes)"),
            ));
        }
        Ok(bytes)
    }

    pub fn read_string(&mut self, element: &str) -> Result<String> {
        let len = self.read_count(element)?;
        if len > MAX_STRING_LEN {
            return Err(Error::corrupt_document(
                element,
                format!("string length {len} exceeds the limit of {MAX_STRING_LEN} bytes"),
            ));
        }
        let bytes = self.read_bytes(element, len)?;
        String::from_utf8(bytes)
            .map_err(|e| Error::corrupt_document(element, format!("invalid UTF-8: {e}")))
    }
}

fn read_err(element: &str, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::corrupt_document(element, "unexpected end of input")
    } else {
        Error::io(format!("decode {element}"), e)
    }
}

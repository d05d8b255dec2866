//! A fixed-capacity bit set with a raw byte representation.

/// A fixed-capacity bit set backed by `u64` words.
///
/// Bit index `i` is stored in word `i >> 6` at bit position `i & 63`. The byte form
/// produced by [`to_bytes`](BitSet::to_bytes) is the little-endian image of the backing
/// words, so bit `i` lands in byte `i / 8` at position `i % 8` (LSB first). Trailing
/// zero bytes are dropped, which makes the byte form of an all-clear set empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitSet {
    words: Vec<u64>,
    len: usize,
}

impl BitSet {
    /// Creates a new `BitSet` with `len` bits, all unset.
    pub fn new(len: usize) -> Self {
        BitSet {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Builds a bit set of `bools.len()` bits from a sequence of booleans.
    pub fn from_bools(bools: impl ExactSizeIterator<Item = bool>) -> Self {
        let mut set = BitSet::new(bools.len());
        for (i, value) in bools.enumerate() {
            if value {
                set.set(i);
            }
        }
        set
    }

    /// Rebuilds a bit set of `len` bits from its raw byte form.
    ///
    /// `bytes` may be shorter than the full backing storage (missing bytes are zero).
    /// Returns `None` if `bytes` is longer than `len` bits require or if any bit at or
    /// beyond `len` is set.
    pub fn from_bytes(len: usize, bytes: &[u8]) -> Option<Self> {
        if bytes.len() > len.div_ceil(8) {
            return None;
        }
        let mut set = BitSet::new(len);
        for (i, chunk) in bytes.chunks(8).enumerate() {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            set.words[i] = u64::from_le_bytes(buf);
        }
        if set.has_bits_beyond_len() {
            return None;
        }
        Some(set)
    }

    /// Returns the number of bits in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks whether the bit set has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit index {index} is out of bounds");
        (self.words[index >> 6] & (1u64 << (index & 63))) != 0
    }

    /// Sets the bit at `index` and returns its previous value.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn set(&mut self, index: usize) -> bool {
        assert!(index < self.len, "bit index {index} is out of bounds");
        let word = &mut self.words[index >> 6];
        let mask = 1u64 << (index & 63);
        let prev = (*word & mask) != 0;
        *word |= mask;
        prev
    }

    /// Returns the raw little-endian backing bytes, with trailing zero bytes removed.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.words.len() * 8);
        for word in &self.words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        let used = bytes.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);
        bytes.truncate(used);
        bytes
    }

    fn has_bits_beyond_len(&self) -> bool {
        let tail = self.len & 63;
        if tail == 0 {
            return false;
        }
        self.words
            .last()
            .is_some_and(|&last| (last >> tail) != 0)
    }
}

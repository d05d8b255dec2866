use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hasher};

use textdoc_common::{Result, error::Error};

/// Terminates a collision chain.
const CHAIN_END: u32 = u32::MAX;

/// Largest arena addressable by the `u32` offsets.
const MAX_ARENA_SIZE: usize = u32::MAX as usize;

/// An append-only bidirectional mapping between strings and dense integer indices.
///
/// `StringTable` assigns each distinct string a unique index in the range [0, N), where N
/// is the number of distinct strings interned so far. Indices are handed out in insertion
/// order, and interning a string that was seen before returns its existing index.
///
/// All strings live in one growable UTF-8 arena; an offsets array delimits them, so a
/// table with thousands of repeated terms holds each distinct term exactly once and no
/// per-entry heap allocation.
///
/// Lookup goes through a 64-bit xxh3 hash. Distinct strings that share a hash are linked
/// through a per-index collision chain and compared byte-wise, so two indices are equal
/// if and only if their strings are equal.
///
/// # Limitations
/// - Removal is not supported
/// - Maximum of 2^32 - 1 distinct strings
#[derive(Clone)]
pub struct StringTable {
    /// Concatenated string data, indexed through `offsets`.
    arena: String,
    /// `offsets[i]..offsets[i + 1]` delimits string `i` in the arena.
    offsets: Vec<u32>,
    /// Hash to the most recently interned index carrying that hash.
    dict: HashMap<u64, u32, BuildHasherDefault<IdentityHasher>>,
    /// Previously interned index with the same hash, or `CHAIN_END`.
    next_same_hash: Vec<u32>,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    /// Creates a new, empty string table.
    pub fn new() -> Self {
        StringTable {
            arena: String::new(),
            offsets: vec![0],
            dict: HashMap::default(),
            next_same_hash: Vec::new(),
        }
    }

    /// Builds a table holding `strings` at indices `0..strings.len()`, in order.
    ///
    /// Fails with a corrupt document error if the same string occurs twice, since the
    /// resulting table could not satisfy the one-index-per-string invariant, or if the
    /// strings do not fit a single arena.
    pub fn from_strings<I, S>(element: &str, strings: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_strings_within(element, strings, MAX_ARENA_SIZE)
    }

    fn from_strings_within<I, S>(element: &str, strings: I, max_arena_size: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = StringTable::new();
        for s in strings {
            let s = s.as_ref();
            if s.len() > max_arena_size - table.arena.len() {
                return Err(Error::corrupt_document(
                    element,
                    format!(
                        "entry {} overflows the string arena ({} + {} bytes)",
                        table.len(),
                        table.arena.len(),
                        s.len()
                    ),
                ));
            }
            if table.len() as u32 == CHAIN_END {
                return Err(Error::corrupt_document(element, "too many entries"));
            }
            let expected = table.len() as u32;
            let index = table.intern(s);
            if index != expected {
                return Err(Error::corrupt_document(
                    element,
                    format!("duplicate entry at index {expected} (first seen at index {index})"),
                ));
            }
        }
        Ok(table)
    }

    /// Returns the number of distinct strings in the table.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the total number of bytes used by the string arena.
    pub fn arena_size(&self) -> usize {
        self.arena.len()
    }

    /// Interns a string, returning its index.
    ///
    /// If the string is already present its existing index is returned, otherwise it is
    /// appended and assigned the next index (equal to the current table size).
    ///
    /// # Panics
    ///
    /// Panics if the table already holds 2^32 - 1 strings or the arena would exceed
    /// 4 GiB.
    pub fn intern(&mut self, s: &str) -> u32 {
        let hash = xxhash_rust::xxh3::xxh3_64(s.as_bytes());
        let head = match self.dict.get(&hash) {
            Some(&head) => {
                if let Some(index) = self.find_in_chain(head, s) {
                    return index;
                }
                head
            }
            None => CHAIN_END,
        };

        let index = self.len() as u32;
        assert!(index != CHAIN_END, "string table is full");
        self.arena.push_str(s);
        assert!(self.arena.len() <= MAX_ARENA_SIZE, "string arena is full");
        self.offsets.push(self.arena.len() as u32);
        self.next_same_hash.push(head);
        self.dict.insert(hash, index);
        index
    }

    /// Returns the index of `s` if it was interned before.
    pub fn index_of(&self, s: &str) -> Option<u32> {
        let hash = xxhash_rust::xxh3::xxh3_64(s.as_bytes());
        let &head = self.dict.get(&hash)?;
        self.find_in_chain(head, s)
    }

    /// Checks whether `index` is a valid index for this table.
    #[inline]
    pub fn contains_index(&self, index: u32) -> bool {
        (index as usize) < self.len()
    }

    /// Returns the string at `index`, or `None` if the index is out of bounds.
    #[inline]
    pub fn get(&self, index: u32) -> Option<&str> {
        let i = index as usize;
        if i >= self.len() {
            return None;
        }
        let start = self.offsets[i] as usize;
        let end = self.offsets[i + 1] as usize;
        Some(&self.arena[start..end])
    }

    /// Iterates over the strings in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> + DoubleEndedIterator + '_ {
        self.offsets
            .windows(2)
            .map(|w| &self.arena[w[0] as usize..w[1] as usize])
    }

    fn find_in_chain(&self, head: u32, s: &str) -> Option<u32> {
        let mut index = head;
        while index != CHAIN_END {
            if self.get(index) == Some(s) {
                return Some(index);
            }
            index = self.next_same_hash[index as usize];
        }
        None
    }
}

impl PartialEq for StringTable {
    fn eq(&self, other: &Self) -> bool {
        self.arena == other.arena && self.offsets == other.offsets
    }
}

impl Eq for StringTable {}

impl std::fmt::Debug for StringTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Passes an already computed 64-bit hash through unchanged.
#[derive(Default)]
struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, _bytes: &[u8]) {
        unreachable!("IdentityHasher only hashes u64 keys");
    }

    #[inline]
    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_new_table() {
        let table = StringTable::new();
        assert_eq!(table.len(), 0);
        assert!(table.is_empty());
        assert_eq!(table.arena_size(), 0);
        assert_eq!(table.get(0), None);
    }

    #[test]
    fn test_intern() {
        let mut table = StringTable::new();

        assert_eq!(table.intern("hello"), 0);
        assert_eq!(table.intern("world"), 1);
        assert_eq!(table.intern("hello"), 0);
        assert_eq!(table.intern(""), 2);
        assert_eq!(table.intern(""), 2);
        assert_eq!(table.len(), 3);
        assert_eq!(table.arena_size(), 10);

        assert_eq!(table.get(0), Some("hello"));
        assert_eq!(table.get(1), Some("world"));
        assert_eq!(table.get(2), Some(""));
        assert_eq!(table.get(3), None);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec!["hello", "world", ""]);
    }

    #[test]
    fn test_index_of() {
        let mut table = StringTable::new();
        assert_eq!(table.index_of("a"), None);
        table.intern("a");
        table.intern("b");
        assert_eq!(table.index_of("b"), Some(1));
        assert_eq!(table.index_of("c"), None);
        assert!(table.contains_index(1));
        assert!(!table.contains_index(2));
    }

    #[test]
    fn test_collision_chain() {
        // Force two distinct strings into the same chain by inserting through the
        // dictionary slot of the first one.
        let mut table = StringTable::new();
        table.intern("alpha");
        let hash = xxhash_rust::xxh3::xxh3_64(b"beta");
        let alpha_hash = xxhash_rust::xxh3::xxh3_64(b"alpha");
        let head = table.dict.remove(&alpha_hash).unwrap();
        table.dict.insert(hash, head);

        // "beta" now hashes onto a chain holding "alpha" and must still get its own index.
        assert_eq!(table.intern("beta"), 1);
        assert_eq!(table.index_of("beta"), Some(1));
        assert_eq!(table.next_same_hash[1], 0);
        assert_eq!(table.intern("beta"), 1);
    }

    #[test]
    fn test_from_strings() {
        let table = StringTable::from_strings("terms", ["x", "y", "z"]).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.index_of("z"), Some(2));

        let err = StringTable::from_strings("terms", ["x", "y", "x"]).unwrap_err();
        assert!(err.is_corrupt_document());
    }

    #[test]
    fn test_from_strings_arena_overflow() {
        let table = StringTable::from_strings_within("terms", ["abc", "de"], 5).unwrap();
        assert_eq!(table.arena_size(), 5);

        let err = StringTable::from_strings_within("terms", ["abc", "def"], 5).unwrap_err();
        assert!(err.is_corrupt_document());
        assert!(err.to_string().contains("entry 1 overflows"), "{err}");
    }

    #[test]
    fn test_indices_equal_iff_strings_equal() {
        let mut rng = rand::rng();
        let mut table = StringTable::new();
        let words: Vec<String> = (0..2000)
            .map(|_| {
                let len = rng.random_range(0..4);
                (0..len)
                    .map(|_| rng.random_range(b'a'..=b'e') as char)
                    .collect()
            })
            .collect();
        let indices: Vec<u32> = words.iter().map(|w| table.intern(w)).collect();

        for (i, a) in words.iter().enumerate().step_by(7) {
            for (j, b) in words.iter().enumerate().step_by(11) {
                assert_eq!(indices[i] == indices[j], a == b, "{a:?} vs {b:?}");
            }
        }
        for (index, s) in table.iter().enumerate() {
            assert_eq!(table.index_of(s), Some(index as u32));
        }
    }

    #[test]
    fn test_equality_ignores_lookup_state() {
        let mut a = StringTable::new();
        let mut b = StringTable::new();
        for s in ["one", "two", "one", "three"] {
            a.intern(s);
        }
        for s in ["one", "two", "three"] {
            b.intern(s);
        }
        assert_eq!(a, b);
        b.intern("four");
        assert_ne!(a, b);
    }
}

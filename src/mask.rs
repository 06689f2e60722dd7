//! Fixed-width bit masks over the assignment space.
//!
//! A [`Mask`] holds one bit per assignment of a population of `N` people,
//! so its width is always `2^N`. Bit `j` is set when assignment `j` (see
//! [`Assignment::index`][crate::types::Assignment::index]) belongs to the set.
//!
//! For small populations the whole mask is a single `u64` word; larger ones
//! spill into a short vector of words. All set operations stay within the
//! declared width, so complements never leak stray high bits.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, Not};

use num_bigint::BigUint;

/// A set of assignments, stored as a vector of `u64` words.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Mask {
    /// Storage: each u64 holds 64 assignments.
    words: Vec<u64>,
    /// Number of meaningful bits (`2^N`).
    width: usize,
}

impl Mask {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    fn num_words(width: usize) -> usize {
        (width + Self::BITS_PER_WORD - 1) / Self::BITS_PER_WORD
    }

    /// Gets the word index and bit position for a given bit index.
    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    /// Mask of the valid bits in the last word.
    fn tail_mask(&self) -> u64 {
        match self.width % Self::BITS_PER_WORD {
            0 => u64::MAX,
            r => (1u64 << r) - 1,
        }
    }

    /// Creates an empty mask of the given width (in bits).
    pub fn empty(width: usize) -> Self {
        Self {
            words: vec![0; Self::num_words(width)],
            width,
        }
    }

    /// Creates a mask with every bit of the given width set.
    pub fn full(width: usize) -> Self {
        let mut mask = Self {
            words: vec![u64::MAX; Self::num_words(width)],
            width,
        };
        mask.trim();
        mask
    }

    /// Creates a mask containing exactly one assignment.
    pub fn singleton(width: usize, index: usize) -> Self {
        let mut mask = Self::empty(width);
        mask.insert(index);
        mask
    }

    /// Creates a mask from a predicate over assignment indices.
    pub fn from_fn(width: usize, mut f: impl FnMut(usize) -> bool) -> Self {
        let mut mask = Self::empty(width);
        for index in 0..width {
            if f(index) {
                mask.insert(index);
            }
        }
        mask
    }

    /// Clears the unused bits of the last word.
    fn trim(&mut self) {
        let tail = self.tail_mask();
        if let Some(last) = self.words.last_mut() {
            *last &= tail;
        }
    }

    /// Returns the width in bits.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of set bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if no bits are set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns true if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        if index >= self.width {
            return false;
        }
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        (self.words[word_idx] >> bit_idx) & 1 == 1
    }

    /// Sets the bit at the given index. Returns true if the bit was not previously set.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the mask width.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        assert!(index < self.width, "Bit {} out of range for width {}", index, self.width);
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        let bit = 1u64 << bit_idx;
        let was_clear = self.words[word_idx] & bit == 0;
        self.words[word_idx] |= bit;
        was_clear
    }

    /// Clears the bit at the given index. Returns true if the bit was previously set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.width {
            return false;
        }
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        let bit = 1u64 << bit_idx;
        let was_set = self.words[word_idx] & bit != 0;
        self.words[word_idx] &= !bit;
        was_set
    }

    /// Returns the only set bit, if exactly one bit is set.
    pub fn single(&self) -> Option<usize> {
        let mut iter = self.iter();
        let first = iter.next()?;
        match iter.next() {
            None => Some(first),
            Some(_) => None,
        }
    }

    /// Returns true if every bit set in `self` is also set in `other`.
    pub fn is_subset(&self, other: &Mask) -> bool {
        assert_eq!(self.width, other.width, "Mask width mismatch");
        self.words.iter().zip(&other.words).all(|(a, b)| a & !b == 0)
    }

    /// Returns true if `self` and `other` share no set bit.
    pub fn is_disjoint(&self, other: &Mask) -> bool {
        assert_eq!(self.width, other.width, "Mask width mismatch");
        self.words.iter().zip(&other.words).all(|(a, b)| a & b == 0)
    }

    /// Returns an iterator over all set bit indices.
    pub fn iter(&self) -> MaskIter<'_> {
        MaskIter {
            mask: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Converts the mask to an arbitrary-precision integer (bit `j` of the integer is bit `j` of the mask).
    pub fn to_biguint(&self) -> BigUint {
        let bytes: Vec<u8> = self.words.iter().flat_map(|w| w.to_le_bytes()).collect();
        BigUint::from_bytes_le(&bytes)
    }

    /// Builds a mask of the given width from an arbitrary-precision integer.
    ///
    /// Returns `None` if the integer has bits beyond the width.
    pub fn from_biguint(width: usize, value: &BigUint) -> Option<Self> {
        if value.bits() > width as u64 {
            return None;
        }
        let mut mask = Self::empty(width);
        for (i, chunk) in value.to_bytes_le().chunks(8).enumerate() {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            if i < mask.words.len() {
                mask.words[i] = u64::from_le_bytes(buf);
            }
        }
        Some(mask)
    }
}

impl BitAnd for &Mask {
    type Output = Mask;

    fn bitand(self, rhs: Self) -> Self::Output {
        assert_eq!(self.width, rhs.width, "Mask width mismatch");
        Mask {
            words: self.words.iter().zip(&rhs.words).map(|(a, b)| a & b).collect(),
            width: self.width,
        }
    }
}

impl BitAndAssign<&Mask> for Mask {
    fn bitand_assign(&mut self, rhs: &Mask) {
        assert_eq!(self.width, rhs.width, "Mask width mismatch");
        for (a, b) in self.words.iter_mut().zip(&rhs.words) {
            *a &= b;
        }
    }
}

impl BitOr for &Mask {
    type Output = Mask;

    fn bitor(self, rhs: Self) -> Self::Output {
        assert_eq!(self.width, rhs.width, "Mask width mismatch");
        Mask {
            words: self.words.iter().zip(&rhs.words).map(|(a, b)| a | b).collect(),
            width: self.width,
        }
    }
}

impl Not for &Mask {
    type Output = Mask;

    fn not(self) -> Self::Output {
        let mut mask = Mask {
            words: self.words.iter().map(|w| !w).collect(),
            width: self.width,
        };
        mask.trim();
        mask
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mask")
            .field("width", &self.width)
            .field("len", &self.len())
            .finish()
    }
}

/// Iterator over set bits in a [`Mask`].
pub struct MaskIter<'a> {
    mask: &'a Mask,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for MaskIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * Mask::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.mask.words.len() {
                return None;
            }
            self.current_word = self.mask.words[self.word_idx];
        }
    }
}

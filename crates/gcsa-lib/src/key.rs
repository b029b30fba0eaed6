//! Packed k-mer keys
//!
//! A key encodes a k-mer of length 16 or less over an alphabet of size 8 or
//! less as one 64-bit integer (most significant bits first):
//! - 16 x 3 bits for the label, high-order character slots zero when the
//!   label is shorter than 16
//! - 8 bits marking which predecessor symbols occur before the label
//! - 8 bits marking which successor symbols occur after it

use crate::alphabet::Alphabet;
use sux::bits::bit_field_vec::BitFieldVec;
use value_traits::slices::SliceByValueSet;

/// A 64-bit packed k-mer key: label, predecessor set, successor set.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Key(u64);

impl Key {
    /// Bits per packed character.
    pub const CHAR_WIDTH: u32 = 3;
    /// Mask for one packed character.
    pub const CHAR_MASK: u64 = 0x7;
    /// Longest label a key can hold.
    pub const MAX_LENGTH: usize = 16;

    /// Pack a label and its predecessor/successor sets into a key.
    ///
    /// Characters are translated through the alphabet's comp mapping, most
    /// significant character first.
    ///
    /// # Panics
    /// Panics if the label is longer than [`MAX_LENGTH`](Self::MAX_LENGTH) or
    /// the alphabet does not fit in 3 bits per symbol.
    pub fn encode(alpha: &Alphabet, label: &str, predecessors: u8, successors: u8) -> Self {
        assert!(
            label.len() <= Self::MAX_LENGTH,
            "label of length {} exceeds the {}-character key capacity",
            label.len(),
            Self::MAX_LENGTH
        );
        assert!(alpha.sigma() <= 8, "keys require an alphabet of size 8 or less");

        let mut value = 0u64;
        for &byte in label.as_bytes() {
            value = (value << Self::CHAR_WIDTH) | u64::from(alpha.to_comp(byte));
        }
        value = (value << 8) | u64::from(predecessors);
        value = (value << 8) | u64::from(successors);
        Self(value)
    }

    /// Decode the label back into raw alphabet characters.
    ///
    /// `kmer_length` is clamped to [`MAX_LENGTH`](Self::MAX_LENGTH); the
    /// decoded string has exactly that many characters, most significant
    /// first.
    pub fn decode(self, kmer_length: usize, alpha: &Alphabet) -> String {
        let len = kmer_length.min(Self::MAX_LENGTH);
        let mut label = self.label();

        let mut chars = vec![0u8; len];
        for slot in chars.iter_mut().rev() {
            *slot = alpha.to_char((label & Self::CHAR_MASK) as u8);
            label >>= Self::CHAR_WIDTH;
        }
        // Comp characters are single bytes, so this is valid UTF-8 only for
        // ASCII alphabets; the default alphabet is ASCII.
        String::from_utf8_lossy(&chars).into_owned()
    }

    /// The packed label portion (the key without its bitmaps).
    #[inline]
    pub fn label(self) -> u64 {
        self.0 >> 16
    }

    /// The predecessor-symbol bitmap.
    #[inline]
    pub fn predecessors(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// The successor-symbol bitmap.
    #[inline]
    pub fn successors(self) -> u8 {
        self.0 as u8
    }

    /// The comp value of the label's last character.
    #[inline]
    pub fn last(self) -> u8 {
        ((self.0 >> 16) & Self::CHAR_MASK) as u8
    }

    /// Union `other`'s predecessor/successor sets into this key,
    /// keeping this key's label.
    #[inline]
    pub fn merge(self, other: Key) -> Key {
        Key(self.0 | (other.0 & 0xFFFF))
    }

    /// Replace the label portion, preserving the bitmaps.
    #[inline]
    pub fn replace(self, label: u64) -> Key {
        Key((label << 16) | (self.0 & 0xFFFF))
    }

    /// Longest common prefix of two labels, in characters, over the first
    /// `kmer_length` character slots.
    ///
    /// Symmetric, at most `kmer_length`, and equal to it exactly when the
    /// labels agree over that many characters.
    pub fn lcp(a: Key, b: Key, kmer_length: usize) -> usize {
        let len = kmer_length.min(Self::MAX_LENGTH);
        let mut matched = 0;
        for i in 0..len {
            let shift = Self::CHAR_WIDTH as usize * (len - 1 - i);
            if (a.label() >> shift) & Self::CHAR_MASK != (b.label() >> shift) & Self::CHAR_MASK {
                break;
            }
            matched += 1;
        }
        matched
    }

    /// The raw packed value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Wrap a raw packed value.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Pack the last character of each key into a 3-bit-wide integer array.
///
/// The result parallels `keys`: entry `i` is `keys[i].last()`.
pub fn last_chars(keys: &[Key]) -> BitFieldVec<usize> {
    let mut packed: BitFieldVec<usize> =
        BitFieldVec::new(Key::CHAR_WIDTH as usize, keys.len());
    for (i, key) in keys.iter().enumerate() {
        packed.set_value(i, key.last() as usize);
    }
    packed
}

//! Byte alphabet with compacted symbols and cumulative counts
//!
//! Maps an arbitrary byte alphabet onto a dense "comp" symbol space and keeps
//! cumulative symbol counts for the index. Comp value 0 is reserved for the
//! universal endmarker and is always the image of byte 0. Several bytes may
//! collapse onto one comp value (case folding, non-ACGT bytes folding to N).
//!
//! Default mapping: `\0` and `$` are endmarkers, `ACGT`/`acgt` map to 1..=4,
//! `#` (the graph source marker) maps to 6, and every other byte maps to 5
//! (`N`).

use crate::serialization::{invalid_data, read_bytes, read_u64, read_u64_vec, write_bytes, write_u64, write_u64_vec};
use std::io::{self, Read, Write};

/// Largest supported alphabet size.
pub const MAX_SIGMA: usize = 256;

const fn default_char2comp() -> [u8; 256] {
    let mut map = [5u8; 256];
    map[0] = 0;
    map[b'$' as usize] = 0;
    map[b'A' as usize] = 1;
    map[b'a' as usize] = 1;
    map[b'C' as usize] = 2;
    map[b'c' as usize] = 2;
    map[b'G' as usize] = 3;
    map[b'g' as usize] = 3;
    map[b'T' as usize] = 4;
    map[b't' as usize] = 4;
    map[b'#' as usize] = 6;
    map
}

/// Default byte-to-comp mapping (see the module docs).
pub const DEFAULT_CHAR2COMP: [u8; 256] = default_char2comp();

/// Default comp-to-byte mapping.
pub const DEFAULT_COMP2CHAR: [u8; 7] = [b'$', b'A', b'C', b'G', b'T', b'N', b'#'];

/// A byte alphabet compacted to `sigma` symbols, with cumulative counts.
///
/// Built once from a byte sequence or a precomputed count array; immutable
/// afterwards. `cumulative(c)` is the number of input symbols with comp value
/// below `c`, so `cumulative(sigma)` is the total symbol count.
#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    char2comp: [u8; 256],
    comp2char: Vec<u8>,
    /// Exclusive prefix sums of per-comp counts; sigma + 1 entries.
    cumulative: Vec<u64>,
    sigma: usize,
}

impl Alphabet {
    /// The default alphabet with all counts zero.
    pub fn new() -> Self {
        Self::from_counts_with(
            &[0; DEFAULT_COMP2CHAR.len()],
            DEFAULT_CHAR2COMP,
            DEFAULT_COMP2CHAR.to_vec(),
        )
    }

    /// Build from a byte sequence using the default maps.
    ///
    /// Scans the sequence once, counting occurrences per comp value.
    pub fn from_sequence(sequence: &[u8]) -> Self {
        Self::from_sequence_with(sequence, DEFAULT_CHAR2COMP, DEFAULT_COMP2CHAR.to_vec())
    }

    /// Build from a byte sequence with custom maps.
    pub fn from_sequence_with(sequence: &[u8], char2comp: [u8; 256], comp2char: Vec<u8>) -> Self {
        let sigma = comp2char.len();
        assert!(sigma > 0 && sigma <= MAX_SIGMA, "invalid alphabet size {sigma}");

        let mut counts = vec![0u64; sigma];
        for &byte in sequence {
            let comp = char2comp[byte as usize] as usize;
            assert!(comp < sigma, "byte {byte} maps outside the alphabet");
            counts[comp] += 1;
        }
        Self::from_counts_with(&counts, char2comp, comp2char)
    }

    /// Build from per-comp counts using the default maps.
    pub fn from_counts(counts: &[u64]) -> Self {
        Self::from_counts_with(counts, DEFAULT_CHAR2COMP, DEFAULT_COMP2CHAR.to_vec())
    }

    /// Build from per-comp counts with custom maps.
    ///
    /// `counts` must hold one entry per comp value.
    pub fn from_counts_with(counts: &[u64], char2comp: [u8; 256], comp2char: Vec<u8>) -> Self {
        let sigma = comp2char.len();
        assert!(sigma > 0 && sigma <= MAX_SIGMA, "invalid alphabet size {sigma}");
        assert_eq!(counts.len(), sigma, "one count per comp value expected");

        let mut cumulative = Vec::with_capacity(sigma + 1);
        let mut sum = 0u64;
        for &count in counts {
            cumulative.push(sum);
            sum += count;
        }
        cumulative.push(sum);

        Self {
            char2comp,
            comp2char,
            cumulative,
            sigma,
        }
    }

    /// Comp value of a raw byte.
    #[inline]
    pub fn to_comp(&self, byte: u8) -> u8 {
        self.char2comp[byte as usize]
    }

    /// Representative byte of a comp value.
    ///
    /// # Panics
    /// Panics if `comp >= sigma`.
    #[inline]
    pub fn to_char(&self, comp: u8) -> u8 {
        self.comp2char[comp as usize]
    }

    /// Alphabet size.
    #[inline]
    pub fn sigma(&self) -> usize {
        self.sigma
    }

    /// Number of input symbols with comp value below `comp`.
    ///
    /// `comp` ranges over `0..=sigma`.
    #[inline]
    pub fn cumulative(&self, comp: usize) -> u64 {
        self.cumulative[comp]
    }

    /// Number of input symbols with exactly this comp value.
    #[inline]
    pub fn count(&self, comp: usize) -> u64 {
        self.cumulative[comp + 1] - self.cumulative[comp]
    }

    /// Total number of input symbols.
    #[inline]
    pub fn total(&self) -> u64 {
        self.cumulative[self.sigma]
    }

    /// Serialize as `char2comp`, `comp2char`, the cumulative array, `sigma`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.char2comp)?;
        write_bytes(writer, &self.comp2char)?;
        write_u64_vec(writer, &self.cumulative)?;
        write_u64(writer, self.sigma as u64)
    }

    /// Deserialize an alphabet written by [`write_to`](Self::write_to).
    ///
    /// Validates the field shapes and monotonicity of the cumulative array;
    /// returns a fresh instance or an error, never a half-initialized value.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut char2comp = [0u8; 256];
        reader.read_exact(&mut char2comp)?;
        let comp2char = read_bytes(reader, MAX_SIGMA)?;
        let cumulative = read_u64_vec(reader, MAX_SIGMA + 1)?;
        let sigma = read_u64(reader)? as usize;

        if sigma == 0 || sigma > MAX_SIGMA {
            return Err(invalid_data(format!("invalid alphabet size {sigma}")));
        }
        if comp2char.len() != sigma {
            return Err(invalid_data("comp2char length does not match sigma"));
        }
        if cumulative.len() != sigma + 1 {
            return Err(invalid_data("cumulative array length does not match sigma"));
        }
        if cumulative.windows(2).any(|w| w[0] > w[1]) {
            return Err(invalid_data("cumulative counts are not non-decreasing"));
        }
        if char2comp.iter().any(|&comp| comp as usize >= sigma) {
            return Err(invalid_data("char2comp entry outside the alphabet"));
        }

        Ok(Self {
            char2comp,
            comp2char,
            cumulative,
            sigma,
        })
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alphabet")
            .field("sigma", &self.sigma)
            .field("total", &self.total())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let alpha = Alphabet::new();
        assert_eq!(alpha.sigma(), 7);
        assert_eq!(alpha.to_comp(0), 0);
        assert_eq!(alpha.to_comp(b'$'), 0);
        assert_eq!(alpha.to_comp(b'A'), 1);
        assert_eq!(alpha.to_comp(b'a'), 1);
        assert_eq!(alpha.to_comp(b'C'), 2);
        assert_eq!(alpha.to_comp(b'c'), 2);
        assert_eq!(alpha.to_comp(b'G'), 3);
        assert_eq!(alpha.to_comp(b'g'), 3);
        assert_eq!(alpha.to_comp(b'T'), 4);
        assert_eq!(alpha.to_comp(b't'), 4);
        assert_eq!(alpha.to_comp(b'#'), 6);

        // Everything else folds to N, and nothing escapes [0, 6].
        for byte in 0..=255u8 {
            let comp = alpha.to_comp(byte);
            assert!(comp <= 6, "byte {byte} maps to {comp}");
            if !matches!(byte, 0 | b'$' | b'A' | b'a' | b'C' | b'c' | b'G' | b'g' | b'T' | b't' | b'#') {
                assert_eq!(comp, 5, "byte {byte} should fold to N");
            }
        }

        for comp in 0..7u8 {
            assert_eq!(alpha.to_char(comp), DEFAULT_COMP2CHAR[comp as usize]);
        }
    }

    #[test]
    fn test_counts_from_sequence() {
        let sequence = b"GATTacaNN#x$";
        let alpha = Alphabet::from_sequence(sequence);

        assert_eq!(alpha.total(), sequence.len() as u64);
        assert_eq!(alpha.count(0), 1); // $
        assert_eq!(alpha.count(1), 3); // A a a
        assert_eq!(alpha.count(2), 1); // c
        assert_eq!(alpha.count(3), 1); // G
        assert_eq!(alpha.count(4), 2); // T T
        assert_eq!(alpha.count(5), 3); // N N x
        assert_eq!(alpha.count(6), 1); // #

        // Cumulative array is non-decreasing and consistent with the counts.
        for comp in 0..alpha.sigma() {
            assert!(alpha.cumulative(comp) <= alpha.cumulative(comp + 1));
            assert_eq!(alpha.count(comp), alpha.cumulative(comp + 1) - alpha.cumulative(comp));
        }
    }

    #[test]
    fn test_counts_constructor_matches_scan() {
        let sequence = b"ACGTACGTNNNN$$";
        let scanned = Alphabet::from_sequence(sequence);

        let counts: Vec<u64> = (0..scanned.sigma()).map(|c| scanned.count(c)).collect();
        let from_counts = Alphabet::from_counts(&counts);

        assert_eq!(scanned, from_counts);
    }

    #[test]
    fn test_empty_sequence() {
        let alpha = Alphabet::from_sequence(b"");
        assert_eq!(alpha.total(), 0);
        assert_eq!(alpha.sigma(), 7);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let alpha = Alphabet::from_sequence(b"GATTACA##NN$");

        let mut buf = Vec::new();
        alpha.write_to(&mut buf).unwrap();

        let loaded = Alphabet::read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(alpha, loaded);
    }

    #[test]
    fn test_load_rejects_truncated() {
        let alpha = Alphabet::from_sequence(b"ACGT");
        let mut buf = Vec::new();
        alpha.write_to(&mut buf).unwrap();
        buf.truncate(buf.len() - 4);

        assert!(Alphabet::read_from(&mut buf.as_slice()).is_err());
    }

    #[test]
    fn test_load_rejects_inconsistent_sigma() {
        let alpha = Alphabet::from_sequence(b"ACGT");
        let mut buf = Vec::new();
        alpha.write_to(&mut buf).unwrap();
        // Corrupt the trailing sigma field.
        let len = buf.len();
        buf[len - 8..].copy_from_slice(&3u64.to_le_bytes());

        assert!(Alphabet::read_from(&mut buf.as_slice()).is_err());
    }
}

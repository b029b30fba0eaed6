//! Rank/select-capable sparse bitvector
//!
//! Every compressed structure in this crate is assembled from bitvectors that
//! answer two queries: `rank(i)` (set bits before position `i`) and
//! `select(k)` (position of the `k`-th set bit). The bits here are sparse, so
//! the vector is stored as a sux-rs Elias-Fano sequence over the positions of
//! its set bits:
//! - `select(k)` is O(1) random access into the sequence (uses Select1)
//! - `rank(i)` is a successor query (uses Select0)
//!
//! The sequence and its select inventories form one owned value: copies and
//! moves can never leave a support structure pointing at a stale vector, and
//! a deserialized instance is usable as soon as it is returned.
//!
//! Space usage is approximately `2 + log(U/N)` bits per set bit (the
//! Elias-Fano bound), where `U` is the bit length and `N` the number of set
//! bits.

use crate::serialization::{invalid_data, read_u64, write_u64};
use mem_dbg::{MemSize, SizeFlags};
use std::io;
use sux::dict::elias_fano::{EfSeqDict, EliasFanoBuilder};
use sux::traits::{IndexedSeq, Succ};

use epserde::prelude::*;

/// An immutable bitvector with rank and select support, stored sparsely.
pub struct SparseBitVector {
    /// Elias-Fano sequence of set-bit positions
    ef: EfSeqDict,
    /// Total bit length (the universe the positions live in)
    universe: u64,
}

impl SparseBitVector {
    /// Build from a bit length and the sorted positions of the set bits.
    ///
    /// Positions must be strictly increasing and less than `universe`.
    pub fn from_positions(universe: u64, positions: &[u64]) -> Self {
        debug_assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "set-bit positions must be strictly increasing"
        );
        debug_assert!(
            positions.last().map_or(true, |&last| last < universe),
            "set-bit position beyond the bit length"
        );

        let mut builder = EliasFanoBuilder::new(positions.len(), universe.max(1) as usize);
        for &pos in positions {
            builder.push(pos as usize);
        }
        Self {
            ef: builder.build_with_seq_and_dict(),
            universe,
        }
    }

    /// An empty bitvector of length zero.
    pub fn empty() -> Self {
        Self::from_positions(0, &[])
    }

    /// Bit length of the vector.
    #[inline]
    pub fn len(&self) -> u64 {
        self.universe
    }

    /// Whether the vector has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.universe == 0
    }

    /// Number of set bits.
    #[inline]
    pub fn count_ones(&self) -> u64 {
        self.ef.len() as u64
    }

    /// Number of set bits strictly before position `pos`.
    ///
    /// `pos` may equal `len()` (or exceed it), giving the total count.
    #[inline]
    pub fn rank(&self, pos: u64) -> u64 {
        // The successor of pos is the first set bit >= pos; its index in the
        // sequence is exactly the number of set bits before pos.
        match self.ef.succ(pos as usize) {
            Some((idx, _)) => idx as u64,
            None => self.ef.len() as u64,
        }
    }

    /// Position of the `k`-th set bit, `k` 0-based.
    ///
    /// # Panics
    /// Panics if `k >= count_ones()`.
    #[inline]
    pub fn select(&self, k: u64) -> u64 {
        assert!(
            (k as usize) < self.ef.len(),
            "select index {} out of bounds ({} set bits)",
            k,
            self.ef.len()
        );
        // SAFETY: bounds checked above.
        unsafe { self.ef.get_unchecked(k as usize) as u64 }
    }

    /// Whether the bit at `pos` is set.
    #[inline]
    pub fn get(&self, pos: u64) -> bool {
        pos < self.universe && self.rank(pos + 1) > self.rank(pos)
    }

    /// Actual number of bytes used, including the select inventories.
    #[inline]
    pub fn num_bytes(&self) -> u64 {
        self.ef.mem_size(SizeFlags::default()) as u64 + 8
    }

    /// Serialize as bit length followed by the Elias-Fano structure
    /// (epserde format, select support included).
    pub fn write_to<W: std::io::Write>(&self, writer: &mut W) -> io::Result<()> {
        write_u64(writer, self.universe)?;
        unsafe {
            self.ef.serialize(writer).map_err(io::Error::other)?;
        }
        Ok(())
    }

    /// Deserialize a vector written by [`write_to`](Self::write_to).
    pub fn read_from<R: std::io::Read>(reader: &mut R) -> io::Result<Self> {
        let universe = read_u64(reader)?;
        let ef = unsafe { EfSeqDict::deserialize_full(reader).map_err(io::Error::other)? };
        let loaded = Self { ef, universe };
        if loaded.count_ones() > 0 && loaded.select(loaded.count_ones() - 1) >= universe {
            return Err(invalid_data("set-bit position beyond the stored bit length"));
        }
        Ok(loaded)
    }
}

impl Default for SparseBitVector {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for SparseBitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseBitVector")
            .field("len", &self.universe)
            .field("ones", &self.ef.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_rank(positions: &[u64], pos: u64) -> u64 {
        positions.iter().filter(|&&p| p < pos).count() as u64
    }

    #[test]
    fn test_empty() {
        let bv = SparseBitVector::empty();
        assert_eq!(bv.len(), 0);
        assert_eq!(bv.count_ones(), 0);
        assert_eq!(bv.rank(0), 0);
        assert_eq!(bv.rank(100), 0);
    }

    #[test]
    fn test_no_set_bits() {
        let bv = SparseBitVector::from_positions(64, &[]);
        assert_eq!(bv.len(), 64);
        assert_eq!(bv.count_ones(), 0);
        assert_eq!(bv.rank(64), 0);
        assert!(!bv.get(13));
    }

    #[test]
    fn test_rank_select() {
        let positions = [0u64, 3, 4, 17, 63, 64, 200];
        let bv = SparseBitVector::from_positions(201, &positions);

        assert_eq!(bv.count_ones(), positions.len() as u64);
        for (k, &p) in positions.iter().enumerate() {
            assert_eq!(bv.select(k as u64), p);
            assert!(bv.get(p));
        }
        for pos in 0..=201 {
            assert_eq!(bv.rank(pos), naive_rank(&positions, pos), "rank({pos})");
        }
        // Rank past the end saturates at the total count.
        assert_eq!(bv.rank(10_000), positions.len() as u64);
    }

    #[test]
    fn test_get_unset_positions() {
        let bv = SparseBitVector::from_positions(10, &[2, 7]);
        for pos in 0..10 {
            assert_eq!(bv.get(pos), pos == 2 || pos == 7);
        }
        assert!(!bv.get(10));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let positions = [1u64, 2, 3, 500, 501, 9999];
        let bv = SparseBitVector::from_positions(10_000, &positions);

        let mut buf = Vec::new();
        bv.write_to(&mut buf).unwrap();

        let loaded = SparseBitVector::read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded.len(), bv.len());
        assert_eq!(loaded.count_ones(), bv.count_ones());
        for k in 0..positions.len() as u64 {
            assert_eq!(loaded.select(k), bv.select(k));
        }
        for pos in [0u64, 1, 2, 4, 499, 502, 9999, 10_000] {
            assert_eq!(loaded.rank(pos), bv.rank(pos));
        }
    }

    #[test]
    fn test_truncated_load_fails() {
        let bv = SparseBitVector::from_positions(100, &[5, 50]);
        let mut buf = Vec::new();
        bv.write_to(&mut buf).unwrap();
        buf.truncate(buf.len() / 2);

        assert!(SparseBitVector::read_from(&mut buf.as_slice()).is_err());
    }

    #[test]
    #[should_panic(expected = "select index")]
    fn test_select_out_of_bounds() {
        let bv = SparseBitVector::from_positions(8, &[1]);
        bv.select(1);
    }
}

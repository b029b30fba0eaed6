//! Sparse compressed integer array with range-sum queries
//!
//! [`SadaSparse`] stores a non-negative integer sequence `v[0..n)` so that
//! `count(sp, ep)` returns the inclusive range sum in compressed space.
//! Three sparse bitvectors carry the sequence:
//! - `ones` marks positions whose value is exactly 1 (the one-filter); such
//!   positions cost nothing beyond their filter bit. Empty when the filter
//!   was not requested.
//! - `filter` marks, among the remaining positions, those whose value
//!   exceeds the active lower bound (1 with the one-filter, 0 without).
//!   Zero values are never marked; they contribute gaps.
//! - `values` concatenates the filtered values in unary: value `k` occupies
//!   `k` bits and ends in a set bit, so cumulative sums fall out of `select`.
//!
//! The structure is query-only once built; a changed source sequence means a
//! full rebuild.

use crate::bitvector::SparseBitVector;
use crate::serialization::invalid_data;
use std::io::{self, Read, Write};
use tracing::debug;

/// Compressed integer array answering inclusive range sums, biased toward
/// sparse sequences.
#[derive(Debug, Default)]
pub struct SadaSparse {
    /// Value-1 positions over the original sequence; empty when the
    /// one-filter is off
    ones: SparseBitVector,
    /// Positions (in residual coordinates) whose value is encoded in `values`
    filter: SparseBitVector,
    /// Unary-coded filtered values
    values: SparseBitVector,
}

impl SadaSparse {
    /// Compress a source sequence.
    ///
    /// With `one_filter`, positions holding exactly 1 are represented purely
    /// positionally and excluded from the unary stream.
    pub fn new(source: &[u64], one_filter: bool) -> Self {
        let n = source.len() as u64;

        let mut one_positions = Vec::new();
        if one_filter {
            for (i, &value) in source.iter().enumerate() {
                if value == 1 {
                    one_positions.push(i as u64);
                }
            }
        }
        let ones = if one_filter {
            SparseBitVector::from_positions(n, &one_positions)
        } else {
            SparseBitVector::empty()
        };

        let lower_bound = u64::from(one_filter);
        let mut filter_positions = Vec::new();
        let mut value_marks = Vec::new();
        let mut residual = 0u64;
        let mut tail = 0u64;
        for &value in source {
            if one_filter && value == 1 {
                continue;
            }
            if value > lower_bound {
                filter_positions.push(residual);
                tail += value;
                value_marks.push(tail - 1);
            }
            residual += 1;
        }

        debug!(
            "compressed {} values: {} unit, {} filtered, {} unary bits",
            n,
            one_positions.len(),
            filter_positions.len(),
            tail
        );
        Self {
            ones,
            filter: SparseBitVector::from_positions(residual, &filter_positions),
            values: SparseBitVector::from_positions(tail, &value_marks),
        }
    }

    /// Whether the one-filter is active (flagged by a non-empty `ones`).
    #[inline]
    fn one_filter(&self) -> bool {
        !self.ones.is_empty()
    }

    /// Length of the source sequence.
    #[inline]
    pub fn len(&self) -> u64 {
        if self.one_filter() {
            self.ones.len()
        } else {
            self.filter.len()
        }
    }

    /// Whether the source sequence was empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of non-zero entries in the source sequence.
    #[inline]
    pub fn items(&self) -> u64 {
        self.filter.count_ones() + self.ones.count_ones()
    }

    /// Sum of `v[i]` for `i` in the inclusive range `[sp, ep]`.
    ///
    /// Inverted or out-of-range bounds denote an empty range and return 0.
    pub fn count(&self, sp: u64, ep: u64) -> u64 {
        if sp > ep || sp >= self.len() {
            return 0;
        }
        let ep = ep.min(self.len() - 1);

        // Half-open [sp, end) from here on.
        let mut sp = sp;
        let mut end = ep + 1;
        let mut result = 0;

        if self.one_filter() {
            let below = self.ones.rank(sp);
            let through = self.ones.rank(end);
            result += through - below;
            // Shift the bounds into residual coordinates.
            sp -= below;
            end -= through;
            if sp >= end {
                return result;
            }
        }

        let sp_rank = self.filter.rank(sp);
        let ep_rank = self.filter.rank(end);
        if ep_rank <= sp_rank {
            return result;
        }

        // Difference of unary cumulative offsets.
        let upper = self.values.select(ep_rank - 1) + 1;
        let lower = if sp_rank > 0 {
            self.values.select(sp_rank - 1) + 1
        } else {
            0
        };
        result + (upper - lower)
    }

    /// Total compressed size in bytes.
    pub fn num_bytes(&self) -> u64 {
        self.ones.num_bytes() + self.filter.num_bytes() + self.values.num_bytes()
    }

    /// Serialize as `ones`, `filter`, `values`, in that order.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.ones.write_to(writer)?;
        self.filter.write_to(writer)?;
        self.values.write_to(writer)
    }

    /// Deserialize a structure written by [`write_to`](Self::write_to).
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let ones = SparseBitVector::read_from(reader)?;
        let filter = SparseBitVector::read_from(reader)?;
        let values = SparseBitVector::read_from(reader)?;

        if values.count_ones() != filter.count_ones() {
            return Err(invalid_data(
                "unary value count does not match the filter count",
            ));
        }
        if !ones.is_empty() && ones.len() < filter.len() + ones.count_ones() {
            return Err(invalid_data(
                "one-filter length inconsistent with the residual length",
            ));
        }
        Ok(Self {
            ones,
            filter,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_count(source: &[u64], sp: u64, ep: u64) -> u64 {
        if sp > ep || sp as usize >= source.len() {
            return 0;
        }
        let ep = (ep as usize).min(source.len() - 1);
        source[sp as usize..=ep].iter().sum()
    }

    fn check_all_ranges(source: &[u64], one_filter: bool) {
        let sada = SadaSparse::new(source, one_filter);
        for sp in 0..source.len() as u64 {
            for ep in sp..source.len() as u64 {
                assert_eq!(
                    sada.count(sp, ep),
                    naive_count(source, sp, ep),
                    "count({sp}, {ep}) on {source:?}, one_filter={one_filter}"
                );
            }
        }
    }

    #[test]
    fn test_reference_scenario() {
        let source = [0u64, 1, 1, 3, 0, 2, 1, 5];
        for one_filter in [false, true] {
            let sada = SadaSparse::new(&source, one_filter);
            assert_eq!(sada.count(0, 7), 13);
            assert_eq!(sada.count(1, 2), 2);
            assert_eq!(sada.count(3, 5), 5);
            assert_eq!(sada.items(), 6);
            assert_eq!(sada.len(), 8);
        }
    }

    #[test]
    fn test_all_ranges_mixed() {
        let sources: [&[u64]; 6] = [
            &[0, 1, 1, 3, 0, 2, 1, 5],
            &[1, 1, 1, 1],
            &[0, 0, 0],
            &[7],
            &[0, 9, 0, 0, 9, 1, 1, 0, 2, 2, 2, 2, 0, 1],
            &[5, 0, 0, 0, 0, 0, 0, 0, 0, 11],
        ];
        for source in sources {
            check_all_ranges(source, false);
            check_all_ranges(source, true);
        }
    }

    #[test]
    fn test_empty_and_inverted_ranges() {
        let sada = SadaSparse::new(&[1, 2, 3], true);
        assert_eq!(sada.count(2, 1), 0);
        assert_eq!(sada.count(3, 3), 0);
        assert_eq!(sada.count(100, 200), 0);
        // An end past the sequence clamps instead of failing.
        assert_eq!(sada.count(0, 100), 6);
    }

    #[test]
    fn test_empty_source() {
        for one_filter in [false, true] {
            let sada = SadaSparse::new(&[], one_filter);
            assert_eq!(sada.len(), 0);
            assert!(sada.is_empty());
            assert_eq!(sada.items(), 0);
            assert_eq!(sada.count(0, 10), 0);
        }
    }

    #[test]
    fn test_items_counts_nonzero() {
        let source = [0u64, 4, 1, 0, 1, 6];
        assert_eq!(SadaSparse::new(&source, false).items(), 4);
        assert_eq!(SadaSparse::new(&source, true).items(), 4);
    }

    #[test]
    fn test_one_filter_flag_from_serialized_form() {
        // Without the filter the ones vector serializes empty.
        let plain = SadaSparse::new(&[1, 2, 1], false);
        assert!(plain.ones.is_empty());
        assert_eq!(plain.items(), 3);

        let filtered = SadaSparse::new(&[1, 2, 1], true);
        assert_eq!(filtered.ones.count_ones(), 2);
        assert_eq!(filtered.items(), 3);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let source = [0u64, 1, 1, 3, 0, 2, 1, 5, 0, 0, 4];
        for one_filter in [false, true] {
            let sada = SadaSparse::new(&source, one_filter);
            let mut buf = Vec::new();
            sada.write_to(&mut buf).unwrap();

            let loaded = SadaSparse::read_from(&mut buf.as_slice()).unwrap();
            assert!(sada.num_bytes() > 0);
            assert_eq!(loaded.len(), sada.len());
            assert_eq!(loaded.items(), sada.items());
            for sp in 0..source.len() as u64 {
                for ep in sp..source.len() as u64 {
                    assert_eq!(loaded.count(sp, ep), sada.count(sp, ep));
                }
            }
        }
    }

    #[test]
    fn test_truncated_load_fails() {
        let sada = SadaSparse::new(&[1, 2, 3], true);
        let mut buf = Vec::new();
        sada.write_to(&mut buf).unwrap();
        buf.truncate(buf.len() - 6);

        assert!(SadaSparse::read_from(&mut buf.as_slice()).is_err());
    }
}

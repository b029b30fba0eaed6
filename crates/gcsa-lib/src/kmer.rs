//! K-mer records over graph position ranges
//!
//! A [`KMer`] ties a packed label key to the semi-open range `[from, to)` of
//! graph positions sharing that label. Records are built from the textual
//! k-mer extraction format and ordered by label, which lets the construction
//! pipeline group same-label records before merging them.

use crate::alphabet::Alphabet;
use crate::key::{last_chars, Key};
use crate::node::{GraphNode, NodeError};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::fmt;
use sux::bits::bit_field_vec::BitFieldVec;
use tracing::debug;

/// Range end marking a record whose label is already unique.
const UNIQUE: u64 = u64::MAX;

/// A k-mer occurrence: packed label key plus the graph-position range
/// `[from, to)` it labels.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct KMer {
    /// Packed label and predecessor/successor sets
    pub key: Key,
    /// First graph position of the range
    pub from: GraphNode,
    /// One past the last graph position, or the unique marker
    pub to: GraphNode,
}

impl KMer {
    /// Build a record from the textual k-mer format.
    ///
    /// Expected fields: `tokens[0]` the label, `tokens[1]` the origin node,
    /// `tokens[2]` the predecessor character set, `tokens[3]` the successor
    /// character set. `successor_column` selects the field used as the
    /// destination node, letting one constructor serve record formats that
    /// place it in different columns.
    ///
    /// # Errors
    /// Returns a [`NodeError`] when either node token fails to decode.
    pub fn from_tokens(
        tokens: &[&str],
        alpha: &Alphabet,
        successor_column: usize,
    ) -> Result<Self, NodeError> {
        let predecessors = Self::chars(tokens[2], alpha);
        let successors = Self::chars(tokens[3], alpha);
        Ok(Self {
            key: Key::encode(alpha, tokens[0], predecessors, successors),
            from: tokens[1].parse()?,
            to: tokens[successor_column].parse()?,
        })
    }

    /// Fold a separator-interleaved character list into a comp bitmap.
    ///
    /// Characters sit at even string positions (`"A,C,T"` reads as A, C, T);
    /// each contributes the bit `1 << comp(character)`.
    pub fn chars(token: &str, alpha: &Alphabet) -> u8 {
        let mut value = 0u8;
        for &byte in token.as_bytes().iter().step_by(2) {
            value |= 1 << alpha.to_comp(byte);
        }
        value
    }

    /// Whether the label has been resolved as unique; sorted records are not
    /// extended further by the doubling pipeline.
    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.to.raw() == UNIQUE
    }

    /// Mark the label as resolved.
    #[inline]
    pub fn make_sorted(&mut self) {
        self.to = GraphNode::from_raw(UNIQUE);
    }
}

/// Records order by their label; remaining bits only break ties so that the
/// order stays total.
impl Ord for KMer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .label()
            .cmp(&other.key.label())
            .then_with(|| self.key.cmp(&other.key))
            .then_with(|| self.from.cmp(&other.from))
            .then_with(|| self.to.cmp(&other.to))
    }
}

impl PartialOrd for KMer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for KMer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(key {}, in {}, out {}, from {}, to {})",
            self.key.label(),
            self.key.predecessors(),
            self.key.successors(),
            self.from,
            self.to
        )
    }
}

/// Deduplicate k-mer labels and replace them by their ranks.
///
/// Sorts the records by label, merges the predecessor/successor sets of
/// records sharing a label into one key per distinct label, rewrites each
/// record's label to the rank of its key, and marks records whose label
/// occurs exactly once as sorted.
///
/// Returns the distinct keys in rank order together with their packed last
/// characters.
pub fn unique_keys(kmers: &mut [KMer]) -> (Vec<Key>, BitFieldVec<usize>) {
    kmers.par_sort_unstable();

    let mut keys = Vec::new();
    let mut start = 0;
    while start < kmers.len() {
        let label = kmers[start].key.label();
        let mut merged = kmers[start].key;
        let mut end = start + 1;
        while end < kmers.len() && kmers[end].key.label() == label {
            merged = merged.merge(kmers[end].key);
            end += 1;
        }

        let rank = keys.len() as u64;
        keys.push(merged);
        let unique_label = end - start == 1;
        for kmer in &mut kmers[start..end] {
            if unique_label {
                kmer.make_sorted();
            }
            kmer.key = kmer.key.replace(rank);
        }
        start = end;
    }

    debug!(
        "collapsed {} k-mer records into {} distinct labels",
        kmers.len(),
        keys.len()
    );
    let packed_last = last_chars(&keys);
    (keys, packed_last)
}

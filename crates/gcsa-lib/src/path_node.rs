//! Path records for the label-doubling pipeline
//!
//! A [`PathNode`] is the extended-label analog of a k-mer record: a semi-open
//! range `[from, to)` of graph positions plus a label of rank-encoded
//! original k-mers that grows as paths are joined. Once a path's label is
//! unique (`from == to`) it is not extended further. During edge generation
//! the range end is reused to hold the outgoing-edge count; callers go
//! through [`outdegree`](PathNode::outdegree) /
//! [`set_outdegree`](PathNode::set_outdegree) rather than touching the field.

use crate::kmer::KMer;
use crate::node::GraphNode;
use crate::serialization::{read_u32, read_u64, write_u32, write_u64};
use std::cmp::Ordering;
use std::io::{self, Read, Write};

/// Integer type storing ranks of the original k-mer labels.
pub type PathRank = u32;

/// A path under construction: node range, rank-encoded label, packed fields.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PathNode {
    /// First graph position on the path
    pub from: GraphNode,
    to: GraphNode,
    /// Rank-encoded label slots; only the first `order()` are meaningful
    pub label: [PathRank; PathNode::LABEL_LENGTH],
    /// Bits 0-7: predecessor bitmap; bits 8-15: order
    fields: u64,
}

impl PathNode {
    /// Number of rank slots in a label.
    pub const LABEL_LENGTH: usize = 8;

    /// Start a path from a single k-mer record.
    ///
    /// The record's key must already carry a rank label (see
    /// [`unique_keys`](crate::kmer::unique_keys)).
    pub fn from_kmer(kmer: &KMer) -> Self {
        let mut label = [0; Self::LABEL_LENGTH];
        label[0] = kmer.key.label() as PathRank;

        let mut path = Self {
            from: kmer.from,
            to: kmer.to,
            label,
            fields: 0,
        };
        path.set_order(1);
        path.set_predecessors(kmer.key.predecessors());
        if kmer.is_sorted() {
            path.make_sorted();
        }
        path
    }

    /// Join two paths, concatenating their labels up to capacity.
    ///
    /// Keeps the left origin and predecessors and the right range end; the
    /// result is sorted when the right path already was.
    pub fn join(left: &PathNode, right: &PathNode) -> Self {
        let left_order = left.order() as usize;
        let order = (left_order + right.order() as usize).min(Self::LABEL_LENGTH);

        let mut label = left.label;
        label[left_order..order]
            .copy_from_slice(&right.label[..order - left_order]);

        let mut path = Self {
            from: left.from,
            to: right.to,
            label,
            fields: 0,
        };
        path.set_order(order as u8);
        path.set_predecessors(left.predecessors());
        if right.is_sorted() {
            path.make_sorted();
        }
        path
    }

    /// Whether the label is already unique; sorted paths are not extended.
    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.from == self.to
    }

    /// Collapse the range, marking the label unique.
    #[inline]
    pub fn make_sorted(&mut self) {
        self.to = self.from;
    }

    /// One past the last graph position of the range.
    #[inline]
    pub fn range_end(&self) -> GraphNode {
        self.to
    }

    /// Set the range end.
    #[inline]
    pub fn set_range_end(&mut self, to: GraphNode) {
        self.to = to;
    }

    /// Outgoing-edge count, valid only during edge generation when the range
    /// end has been repurposed via [`set_outdegree`](Self::set_outdegree).
    #[inline]
    pub fn outdegree(&self) -> u64 {
        self.to.raw()
    }

    /// Store an outgoing-edge count in place of the range end.
    #[inline]
    pub fn set_outdegree(&mut self, count: u64) {
        self.to = GraphNode::from_raw(count);
    }

    /// Number of original k-mer labels contributed to this path.
    #[inline]
    pub fn order(&self) -> u8 {
        (self.fields >> 8) as u8
    }

    /// Set the order.
    ///
    /// # Panics
    /// Panics if `order` exceeds the label capacity.
    #[inline]
    pub fn set_order(&mut self, order: u8) {
        assert!(
            order as usize <= Self::LABEL_LENGTH,
            "order {} exceeds the {}-slot label",
            order,
            Self::LABEL_LENGTH
        );
        self.fields = (self.fields & !0xFF00) | (u64::from(order) << 8);
    }

    /// The predecessor-symbol bitmap.
    #[inline]
    pub fn predecessors(&self) -> u8 {
        self.fields as u8
    }

    /// Replace the predecessor bitmap.
    #[inline]
    pub fn set_predecessors(&mut self, predecessors: u8) {
        self.fields = (self.fields & !0xFF) | u64::from(predecessors);
    }

    /// Union another path's predecessors into this one.
    #[inline]
    pub fn add_predecessors(&mut self, other: &PathNode) {
        self.fields |= u64::from(other.predecessors());
    }

    /// Whether the given comp value is a predecessor of this path.
    #[inline]
    pub fn has_predecessor(&self, comp: u8) -> bool {
        self.fields & (1 << comp) != 0
    }

    /// Compare two paths by their first `max_length` label slots.
    ///
    /// Mirrors sorting by extended label during doubling; `max_length` is
    /// clamped to the label capacity.
    pub fn label_cmp(&self, other: &PathNode, max_length: usize) -> Ordering {
        let len = max_length.min(Self::LABEL_LENGTH);
        self.label[..len].cmp(&other.label[..len])
    }

    /// Compare two paths by their origin position.
    pub fn from_cmp(&self, other: &PathNode) -> Ordering {
        self.from.cmp(&other.from)
    }

    /// Write the fixed-width disk form: from, to, label slots, fields.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_u64(writer, self.from.raw())?;
        write_u64(writer, self.to.raw())?;
        for &rank in &self.label {
            write_u32(writer, rank)?;
        }
        write_u64(writer, self.fields)
    }

    /// Read a path written by [`write_to`](Self::write_to).
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let from = GraphNode::from_raw(read_u64(reader)?);
        let to = GraphNode::from_raw(read_u64(reader)?);
        let mut label = [0; Self::LABEL_LENGTH];
        for slot in &mut label {
            *slot = read_u32(reader)?;
        }
        let fields = read_u64(reader)?;
        Ok(Self {
            from,
            to,
            label,
            fields,
        })
    }
}

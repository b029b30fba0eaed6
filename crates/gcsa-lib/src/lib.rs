// GCSA support layer: succinct encodings for a genome-graph index
//
// Compact alphabets, bit-packed k-mer and graph-node records, and
// compressed integer arrays with rank/select-based range-sum queries.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod alphabet;
pub mod bitvector;
pub mod key;
pub mod kmer;
pub mod node;
pub mod path_node;
pub mod sada_rle;
pub mod sada_sparse;
pub mod serialization;

// Re-export common types at crate root
pub use alphabet::Alphabet;
pub use bitvector::SparseBitVector;
pub use key::Key;
pub use kmer::{unique_keys, KMer};
pub use node::{GraphNode, LegacyNode, Node, NodeError};
pub use path_node::PathNode;
pub use sada_rle::SadaRLE;
pub use sada_sparse::SadaSparse;

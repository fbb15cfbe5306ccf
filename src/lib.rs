//! # critbit
//!
//! An ordered set of byte strings backed by a crit-bit (critical-bit) tree.
//!
//! Internal nodes store only the position of the first bit at which their two
//! subtrees differ; leaves store whole keys. Lookups touch one node per
//! discriminating bit and finish with a single key comparison.
//!
//! Based on Adam Langley's crit-bit notes (<https://github.com/agl/critbit>).
//!
//! ## Example
//!
//! ```rust
//! use critbit::CritbitTree;
//!
//! let mut tree = CritbitTree::new();
//! assert!(tree.insert("hello"));
//! assert!(tree.insert("help"));
//! assert!(tree.insert("world"));
//! assert!(!tree.insert("hello"));
//!
//! assert!(tree.contains("help"));
//! assert_eq!(tree.len(), 3);
//!
//! let mut seen = Vec::new();
//! tree.iterate("hel", |key| {
//!     seen.push(key.to_vec());
//!     true
//! });
//! assert_eq!(seen, [b"hello".to_vec(), b"help".to_vec()]);
//!
//! let copy = tree.copy();
//! assert!(tree.delete("world"));
//! assert!(copy.contains("world"));
//! ```

#![deny(unsafe_code)]

mod debug;
mod iter;
mod node;
mod tree;

pub use bytes::Bytes;
pub use debug::TreeStats;
pub use iter::Iter;
pub use tree::CritbitTree;

#[cfg(test)]
mod proptests;

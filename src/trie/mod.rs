//! Fast consistency lookup over partial assignments.
//!
//! [`Trie`] answers "which stored entries agree with this (partial)
//! assignment?" by intersecting sorted id lists; [`FilterMap`] pairs a trie
//! with the items its ids refer to.

mod filter_map;
#[allow(clippy::module_inception)]
mod trie;

pub use filter_map::FilterMap;
pub use trie::Trie;

//! factor-coord - coordination over factored discrete spaces
//!
//! Finds the joint assignment of many small variables (agents, state factors)
//! that maximizes a sum of local rules, without enumerating the joint space.
//!
//! - [`factored`]: partial assignments, rules and mixed-radix enumeration
//! - [`trie`]: consistency lookup of partial assignments
//! - [`graph`]: variable/factor adjacency with stable factor handles
//! - [`algorithms`]: exact [`VariableElimination`] and approximate [`MaxPlus`]
//!
//! ```
//! use factor_coord::factored::{PartialAssignment, Rule};
//! use factor_coord::VariableElimination;
//!
//! let space = [2, 2, 3];
//! let rule = |keys: Vec<usize>, values: Vec<usize>, value| {
//!     Rule::new(PartialAssignment::new(&space, keys, values).unwrap(), value)
//! };
//! let rules = vec![
//!     rule(vec![0], vec![1], 3.0),
//!     rule(vec![1, 2], vec![1, 2], 5.0),
//! ];
//! let best = VariableElimination::default().solve(&space, &rules).unwrap();
//! assert_eq!(best.assignment, vec![1, 1, 2]);
//! assert_eq!(best.value, 8.0);
//! ```

pub mod algorithms;
pub mod factored;
pub mod graph;
pub mod trie;

pub use algorithms::{CoordinationAlgorithm, EliminationOrder, MaxPlus, VariableElimination};
pub use factored::{FactoredError, PartialAssignment, PartialKeys, Rule, Solution};
pub use graph::{FactorGraph, FactorHandle};
pub use trie::{FilterMap, Trie};

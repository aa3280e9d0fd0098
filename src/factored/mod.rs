//! Building blocks for factored discrete spaces.
//!
//! A *variable space* is a slice of domain sizes, one per variable (agent or
//! state factor). Everything else in the crate talks about subsets of that
//! space through [`PartialKeys`] and [`PartialAssignment`].

mod enumerator;
pub mod error;
mod partial;

pub use enumerator::JointEnumerator;
pub use error::{FactoredError, ScopeViolation};
pub use partial::{
    eliminate_key, evaluate_rules, factor_space_partial, matches_full, merge_keys, to_index_partial,
    to_values_partial, validate_space, PartialAssignment, PartialKeys, Rule, Solution,
};

//! Shared strategies for the property tests.

#![allow(dead_code)]

use factor_coord::factored::{evaluate_rules, JointEnumerator, PartialAssignment, Rule};
use proptest::prelude::*;

/// A variable space of 1..=6 variables with domains of size 1..=4.
pub fn arb_space() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..=4, 1..=6)
}

/// A partial assignment over `space` mentioning at least one variable.
pub fn arb_assignment(space: Vec<usize>) -> impl Strategy<Value = PartialAssignment> {
    let n = space.len();
    (prop::collection::vec(any::<bool>(), n), prop::collection::vec(any::<u32>(), n), 0..n).prop_map(
        move |(mask, raw, forced)| {
            let pairs = (0..n)
                .filter(|&k| mask[k] || k == forced)
                .map(|k| (k, raw[k] as usize % space[k]));
            PartialAssignment::from_pairs(&space, pairs).unwrap()
        },
    )
}

/// A full assignment of `space`.
pub fn arb_full(space: Vec<usize>) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<u32>(), space.len())
        .prop_map(move |raw| raw.iter().zip(&space).map(|(&r, &s)| r as usize % s).collect())
}

/// A space together with up to 12 rules over it.
pub fn arb_problem() -> impl Strategy<Value = (Vec<usize>, Vec<Rule>)> {
    arb_space().prop_flat_map(|space| {
        let rules = prop::collection::vec((arb_assignment(space.clone()), -5.0f64..10.0), 0..12)
            .prop_map(|rs| rs.into_iter().map(|(a, v)| Rule::new(a, v)).collect::<Vec<_>>());
        (Just(space), rules)
    })
}

/// Best value over the whole joint space.
pub fn brute_force(space: &[usize], rules: &[Rule]) -> f64 {
    let keys: Vec<usize> = (0..space.len()).collect();
    let mut e = JointEnumerator::new(space, &keys);
    let mut best = f64::NEG_INFINITY;
    while e.is_valid() {
        best = best.max(evaluate_rules(rules, e.values()));
        e.advance();
    }
    best
}

mod common;

use common::{arb_assignment, arb_space};
use factor_coord::factored::PartialKeys;
use factor_coord::FactorGraph;
use proptest::prelude::*;

fn arb_scopes() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
    arb_space().prop_flat_map(|space| {
        let n = space.len();
        let scopes = prop::collection::vec(arb_assignment(space), 1..10)
            .prop_map(|assignments| assignments.iter().map(|a| a.keys().to_vec()).collect());
        (Just(n), scopes)
    })
}

proptest! {
    /// Asking twice for a scope, in any order of its keys, yields one factor.
    #[test]
    fn get_factor_is_idempotent((n, scopes) in arb_scopes()) {
        let mut graph: FactorGraph<()> = FactorGraph::new(n);
        for scope in &scopes {
            let keys = PartialKeys::new(scope.clone(), n).unwrap();
            let first = graph.get_factor(&keys);
            let size = graph.factor_size();

            let mut reversed = scope.clone();
            reversed.reverse();
            let again = graph.get_factor(&PartialKeys::normalized(reversed, n).unwrap());
            prop_assert_eq!(first, again);
            prop_assert_eq!(graph.factor_size(), size);
        }
    }

    /// Erasing a factor removes it from every neighbor list and shrinks the count by one.
    #[test]
    fn erase_keeps_adjacency_consistent((n, scopes) in arb_scopes()) {
        let mut graph: FactorGraph<()> = FactorGraph::new(n);
        let handles: Vec<_> = scopes
            .iter()
            .map(|s| graph.get_factor(&PartialKeys::new(s.clone(), n).unwrap()))
            .collect();

        for handle in handles {
            if graph.factor(handle).is_none() {
                continue;
            }
            let before = graph.factor_size();
            graph.erase_factor(handle);
            prop_assert_eq!(graph.factor_size(), before - 1);
            for v in 0..n {
                prop_assert!(!graph.variable_neighbors(v).contains(&handle));
            }
        }
        prop_assert_eq!(graph.factor_size(), 0);
    }

    /// Every factor appears in the neighbor list of exactly its scope variables.
    #[test]
    fn neighbors_mirror_scopes((n, scopes) in arb_scopes()) {
        let mut graph: FactorGraph<()> = FactorGraph::new(n);
        for s in &scopes {
            graph.get_factor(&PartialKeys::new(s.clone(), n).unwrap());
        }
        let factors: Vec<_> = graph.factors().map(|(h, f)| (h, f.scope().to_vec())).collect();
        for (handle, scope) in factors {
            for v in 0..n {
                prop_assert_eq!(graph.variable_neighbors(v).contains(&handle), scope.contains(&v));
            }
        }
    }
}

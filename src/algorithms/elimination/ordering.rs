//! Choice of the next variable to eliminate.

use crate::graph::FactorGraph;
use std::cmp::Reverse;

/// Policy picking which live variable to eliminate next.
///
/// The order never changes the optimum found, only the induced width and
/// therefore the cost of each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EliminationOrder {
    /// Highest-index live variable first.
    #[default]
    LastFirst,
    /// Live variable with the smallest elimination neighborhood first; ties go
    /// to the highest index.
    MinDegree,
}

pub(super) fn next_variable<F>(graph: &FactorGraph<F>, order: EliminationOrder) -> Option<usize> {
    match order {
        EliminationOrder::LastFirst => (0..graph.variables()).rev().find(|&v| graph.is_live(v)),
        EliminationOrder::MinDegree => graph
            .live_variables()
            .min_by_key(|&v| (neighborhood_width(graph, v), Reverse(v))),
    }
}

fn neighborhood_width<F>(graph: &FactorGraph<F>, variable: usize) -> usize {
    let factors = graph.variable_neighbors(variable);
    if factors.is_empty() {
        return 0;
    }
    graph.union_scope(&factors).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factored::PartialKeys;

    fn star() -> FactorGraph<()> {
        // 0 is the hub of a star over 0..4.
        let mut graph: FactorGraph<()> = FactorGraph::new(4);
        for leaf in 1..4 {
            graph.get_factor(&PartialKeys::new(vec![0, leaf], 4).unwrap());
        }
        graph
    }

    #[test]
    fn last_first_picks_highest_live() {
        let mut graph: FactorGraph<()> = FactorGraph::new(3);
        assert_eq!(next_variable(&graph, EliminationOrder::LastFirst), Some(2));
        graph.erase_variable(2);
        assert_eq!(next_variable(&graph, EliminationOrder::LastFirst), Some(1));
        graph.erase_variable(1);
        graph.erase_variable(0);
        assert_eq!(next_variable(&graph, EliminationOrder::LastFirst), None);
    }

    #[test]
    fn min_degree_avoids_the_hub() {
        let graph = star();
        assert_eq!(neighborhood_width(&graph, 0), 4);
        assert_eq!(neighborhood_width(&graph, 2), 2);
        assert_eq!(next_variable(&graph, EliminationOrder::MinDegree), Some(3));
    }

    #[test]
    fn min_degree_prefers_isolated_variables() {
        let mut graph = star();
        let hub_leaf = graph.variable_neighbors(1)[0];
        graph.erase_factor(hub_leaf);
        assert_eq!(next_variable(&graph, EliminationOrder::MinDegree), Some(1));
    }
}

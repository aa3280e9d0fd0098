//! Exact coordination by variable elimination.
//!
//! Variables are removed one at a time. Eliminating a variable gathers every
//! factor touching it, and for each joint assignment of the remaining
//! variables in that *neighborhood* records the best value of the eliminated
//! variable as a new rule over the smaller scope:
//!
//! 1. **Insertion**: each input rule goes to the factor with exactly its
//!    scope; rules sharing a scope accumulate, they never overwrite each other
//! 2. **Elimination**: the consumed factors are re-indexed in a
//!    [`FilterMap`](crate::trie::FilterMap) over their own scope so the rules
//!    consistent with each candidate assignment are found without scanning
//! 3. **Reconstruction**: rules carry tags naming the choices made for the
//!    variables eliminated to produce them; once every variable is gone the
//!    tags of the final rules spell out the optimal joint assignment
//!
//! The cost of a step is exponential in the neighborhood size only, so the
//! total cost depends on the induced width of the chosen
//! [`EliminationOrder`], never on the size of the full joint space.
//!
//! # Module Structure
//!
//! - [`ordering`] - Policy for picking the next variable
//! - [`engine`] - Elimination loop and solution reconstruction

mod engine;
mod ordering;

pub use ordering::EliminationOrder;

use crate::factored::{validate_space, FactoredError, Rule, Solution};
use crate::graph::FactorGraph;
use tracing::debug;

/// Statistics collected while eliminating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EliminationDiagnostics {
    /// Variables folded into their neighbors.
    pub eliminated: usize,
    /// Variables removed without work because no factor touched them.
    pub skipped: usize,
    /// Largest elimination neighborhood met, eliminated variable included.
    pub induced_width: usize,
    /// Rules created by elimination steps.
    pub rules_generated: usize,
}

/// Exact maximizer of a sum of local rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableElimination {
    order: EliminationOrder,
}

impl VariableElimination {
    pub fn new(order: EliminationOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> EliminationOrder {
        self.order
    }

    /// Builds the factor graph holding `rules`, one factor per distinct scope.
    pub fn build_graph(space: &[usize], rules: &[Rule]) -> Result<FactorGraph<Vec<Rule>>, FactoredError> {
        validate_space(space)?;
        super::check_rules(space, rules)?;

        let mut graph: FactorGraph<Vec<Rule>> = FactorGraph::new(space.len());
        for rule in rules {
            let handle = graph.get_factor(rule.keys());
            if let Some(factor) = graph.factor_mut(handle) {
                factor.data_mut().push(rule.clone());
            }
        }
        Ok(graph)
    }

    /// Finds the assignment of `space` maximizing the sum of `rules`.
    pub fn solve(&self, space: &[usize], rules: &[Rule]) -> Result<Solution, FactoredError> {
        self.solve_with_diagnostics(space, rules).map(|(solution, _)| solution)
    }

    pub fn solve_with_diagnostics(
        &self,
        space: &[usize],
        rules: &[Rule],
    ) -> Result<(Solution, EliminationDiagnostics), FactoredError> {
        let graph = Self::build_graph(space, rules)?;
        self.solve_graph_with_diagnostics(space, graph)
    }

    /// Eliminates a graph built by the caller.
    ///
    /// Every rule stored in a factor must only mention variables of that
    /// factor's scope. The graph is consumed.
    pub fn solve_graph(&self, space: &[usize], graph: FactorGraph<Vec<Rule>>) -> Result<Solution, FactoredError> {
        self.solve_graph_with_diagnostics(space, graph)
            .map(|(solution, _)| solution)
    }

    pub fn solve_graph_with_diagnostics(
        &self,
        space: &[usize],
        graph: FactorGraph<Vec<Rule>>,
    ) -> Result<(Solution, EliminationDiagnostics), FactoredError> {
        validate_space(space)?;
        if graph.variables() != space.len() {
            return Err(FactoredError::SizeMismatch {
                expected: space.len(),
                found: graph.variables(),
            });
        }

        debug!(
            variables = space.len(),
            factors = graph.factor_size(),
            order = ?self.order,
            "starting variable elimination"
        );
        let (solution, diagnostics) = engine::eliminate_all(space, graph, self.order);
        debug!(
            value = solution.value,
            induced_width = diagnostics.induced_width,
            rules_generated = diagnostics.rules_generated,
            "variable elimination finished"
        );
        Ok((solution, diagnostics))
    }
}

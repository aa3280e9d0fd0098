//! Approximate coordination by max-plus message passing.
//!
//! Factors and variables exchange messages summarizing, for every value of a
//! variable, the best value the rest of the graph can reach. Messages are
//! normalized to zero mean after each update so they stay bounded on cyclic
//! graphs, where max-plus is not guaranteed to converge.
//!
//! After every sweep each variable picks the value with the largest total
//! incoming message. The resulting joint assignment is scored against the
//! original factor tables, and the best one seen so far is kept; the all-zero
//! assignment is the starting point, so the answer never scores below it.

mod messages;

use crate::factored::{factor_space_partial, to_index_partial, validate_space, FactoredError, Rule, Solution};
use crate::graph::FactorGraph;
use messages::MessagePassing;
use tracing::{debug, trace};

/// Statistics collected while passing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxPlusDiagnostics {
    /// Sweeps executed.
    pub iterations_run: usize,
    /// Sweeps whose candidate beat the best assignment so far.
    pub improvements: usize,
    /// Last sweep (0-based) that improved the best assignment.
    pub last_improvement: Option<usize>,
}

/// Max-plus coordination with a fixed sweep budget.
#[derive(Debug, Clone, Copy)]
pub struct MaxPlus {
    iterations: usize,
}

impl MaxPlus {
    /// Creates a solver running `iterations` sweeps per solve.
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn set_iterations(&mut self, iterations: usize) {
        self.iterations = iterations;
    }

    /// Builds a graph of dense value tables from `rules`.
    ///
    /// Each factor's table is indexed by the joint assignment of its scope
    /// (first variable fastest); rules hitting the same entry are summed.
    pub fn build_graph(space: &[usize], rules: &[Rule]) -> Result<FactorGraph<Vec<f64>>, FactoredError> {
        validate_space(space)?;
        super::check_rules(space, rules)?;

        let mut graph: FactorGraph<Vec<f64>> = FactorGraph::new(space.len());
        for rule in rules {
            let handle = graph.get_factor(rule.keys());
            if let Some(factor) = graph.factor_mut(handle) {
                let table = factor.data_mut();
                if table.is_empty() {
                    table.resize(factor_space_partial(space, rule.keys()), 0.0);
                }
                table[to_index_partial(space, rule.keys(), rule.values())] += rule.value();
            }
        }
        Ok(graph)
    }

    pub fn solve(&self, space: &[usize], rules: &[Rule]) -> Result<Solution, FactoredError> {
        let graph = Self::build_graph(space, rules)?;
        self.solve_graph(space, &graph)
    }

    pub fn solve_with_diagnostics(
        &self,
        space: &[usize],
        rules: &[Rule],
    ) -> Result<(Solution, MaxPlusDiagnostics), FactoredError> {
        let graph = Self::build_graph(space, rules)?;
        self.solve_graph_with_diagnostics(space, &graph)
    }

    /// Runs max-plus over a graph of dense value tables.
    ///
    /// The graph is only read, so it can be reused across calls.
    pub fn solve_graph(&self, space: &[usize], graph: &FactorGraph<Vec<f64>>) -> Result<Solution, FactoredError> {
        self.solve_graph_with_diagnostics(space, graph)
            .map(|(solution, _)| solution)
    }

    /// # Errors
    ///
    /// - `EmptyDomain` if a variable has no values
    /// - `SizeMismatch` if the graph has a different number of variables than
    ///   `space`, or a factor table does not cover its scope
    pub fn solve_graph_with_diagnostics(
        &self,
        space: &[usize],
        graph: &FactorGraph<Vec<f64>>,
    ) -> Result<(Solution, MaxPlusDiagnostics), FactoredError> {
        validate_space(space)?;
        if graph.variables() != space.len() {
            return Err(FactoredError::SizeMismatch {
                expected: space.len(),
                found: graph.variables(),
            });
        }
        for (_, factor) in graph.factors() {
            let expected = factor_space_partial(space, factor.scope());
            if factor.data().len() != expected {
                return Err(FactoredError::SizeMismatch {
                    expected,
                    found: factor.data().len(),
                });
            }
        }

        debug!(
            variables = space.len(),
            factors = graph.factor_size(),
            iterations = self.iterations,
            "starting max-plus"
        );

        let mut state = MessagePassing::new(space, graph);
        let mut best = Solution {
            assignment: vec![0; space.len()],
            value: 0.0,
        };
        best.value = state.evaluate(&best.assignment);
        let mut diagnostics = MaxPlusDiagnostics::default();

        for iteration in 0..self.iterations {
            let candidate = state.sweep();
            let value = state.evaluate(&candidate);
            diagnostics.iterations_run += 1;
            trace!(iteration, value, best = best.value, "max-plus sweep");

            if value > best.value {
                best = Solution {
                    assignment: candidate,
                    value,
                };
                diagnostics.improvements += 1;
                diagnostics.last_improvement = Some(iteration);
            }
        }

        debug!(
            value = best.value,
            improvements = diagnostics.improvements,
            "max-plus finished"
        );
        Ok((best, diagnostics))
    }
}

impl Default for MaxPlus {
    /// Ten sweeps per solve.
    fn default() -> Self {
        Self::new(10)
    }
}

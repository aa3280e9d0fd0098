//! Core elimination loop and solution reconstruction.

use crate::factored::{JointEnumerator, PartialAssignment, PartialKeys, Rule, Solution};
use crate::graph::FactorGraph;
use crate::trie::FilterMap;
use tracing::trace;

use super::ordering::{next_variable, EliminationOrder};
use super::EliminationDiagnostics;

/// A consumed factor, re-indexed over the positions of its own scope.
struct LocalFactor {
    /// Position of each scope variable inside the elimination neighborhood.
    positions: Vec<usize>,
    rules: FilterMap<Rule>,
}

impl LocalFactor {
    fn new(space: &[usize], scope: &PartialKeys, rules: Vec<Rule>, neighborhood: &[usize]) -> Self {
        let local_space: Vec<usize> = scope.iter().map(|&k| space[k]).collect();
        let mut map = FilterMap::new(local_space);
        for rule in rules {
            let local_keys: Vec<usize> = rule
                .keys()
                .iter()
                .filter_map(|&k| scope.position(k))
                .collect();
            debug_assert_eq!(local_keys.len(), rule.keys().len(), "rule outside its factor's scope");
            let key = PartialAssignment::from_parts(PartialKeys::from_sorted(local_keys), rule.values().to_vec());
            map.insert(&key, rule);
        }
        let positions = scope
            .iter()
            .filter_map(|k| neighborhood.binary_search(k).ok())
            .collect();
        Self {
            positions,
            rules: map,
        }
    }

    fn matching<'a>(&'a self, neighborhood_values: &[usize], query: &mut Vec<usize>) -> impl Iterator<Item = &'a Rule> + 'a {
        query.clear();
        query.extend(self.positions.iter().map(|&p| neighborhood_values[p]));
        self.rules.filter(query.as_slice())
    }
}

/// Runs elimination to completion over `graph`.
pub(super) fn eliminate_all(
    space: &[usize],
    mut graph: FactorGraph<Vec<Rule>>,
    order: EliminationOrder,
) -> (Solution, EliminationDiagnostics) {
    let mut diagnostics = EliminationDiagnostics::default();
    let mut finals: Vec<Rule> = Vec::new();

    while let Some(variable) = next_variable(&graph, order) {
        eliminate(space, &mut graph, variable, &mut finals, &mut diagnostics);
    }

    (reconstruct(space.len(), &finals), diagnostics)
}

fn eliminate(
    space: &[usize],
    graph: &mut FactorGraph<Vec<Rule>>,
    variable: usize,
    finals: &mut Vec<Rule>,
    diagnostics: &mut EliminationDiagnostics,
) {
    let handles = graph.variable_neighbors(variable);
    if handles.is_empty() {
        graph.erase_variable(variable);
        diagnostics.skipped += 1;
        trace!(variable, "skipped variable with no factors");
        return;
    }

    let neighborhood = graph.union_scope(&handles);
    diagnostics.induced_width = diagnostics.induced_width.max(neighborhood.len());
    debug_assert!(
        neighborhood.binary_search(&variable).is_ok(),
        "variable {variable} missing from its own neighborhood"
    );
    let Ok(pivot) = neighborhood.binary_search(&variable) else {
        for &handle in &handles {
            graph.erase_factor(handle);
        }
        graph.erase_variable(variable);
        diagnostics.skipped += 1;
        return;
    };

    let factors: Vec<LocalFactor> = handles
        .iter()
        .filter_map(|&h| {
            let scope = graph.factor_scope(h)?.clone();
            let rules = graph.erase_factor(h)?;
            Some(LocalFactor::new(space, &scope, rules, &neighborhood))
        })
        .collect();
    graph.erase_variable(variable);

    let remaining = PartialKeys::from_sorted(crate::factored::eliminate_key(&neighborhood, variable));
    let target = if remaining.is_empty() {
        None
    } else {
        Some(graph.get_factor(&remaining))
    };

    let mut full = vec![0; neighborhood.len()];
    let mut query = Vec::new();
    let mut emitted = 0;
    let mut others = JointEnumerator::new(space, &remaining);
    while others.is_valid() {
        for (i, &v) in others.values().iter().enumerate() {
            let slot = if i < pivot { i } else { i + 1 };
            full[slot] = v;
        }

        let mut best_value = f64::NEG_INFINITY;
        let mut best_choice = 0;
        for choice in 0..space[variable] {
            full[pivot] = choice;
            let mut value = 0.0;
            for factor in &factors {
                value += factor.matching(&full, &mut query).map(Rule::value).sum::<f64>();
            }
            if value > best_value {
                best_value = value;
                best_choice = choice;
            }
        }

        full[pivot] = best_choice;
        let mut tags = Vec::new();
        for factor in &factors {
            for rule in factor.matching(&full, &mut query) {
                tags.extend_from_slice(rule.tags());
            }
        }
        tags.push((variable, best_choice));

        let assignment = PartialAssignment::from_parts(remaining.clone(), others.values().to_vec());
        let rule = Rule::with_tags(assignment, best_value, tags);
        match target.and_then(|h| graph.factor_mut(h)) {
            Some(node) => node.data_mut().push(rule),
            None => finals.push(rule),
        }
        emitted += 1;
        others.advance();
    }

    diagnostics.eliminated += 1;
    diagnostics.rules_generated += emitted;
    trace!(
        variable,
        width = neighborhood.len(),
        factors = factors.len(),
        emitted,
        "eliminated variable"
    );
}

/// Joins the final rules of every connected component into one solution.
///
/// Each component leaves rules over the empty scope; they are independent, so
/// the optimum is their sum and the assignment is the union of their tags.
/// Variables never tagged had no factors and keep value 0.
fn reconstruct(variables: usize, finals: &[Rule]) -> Solution {
    let mut assignment = vec![0; variables];
    let mut value = 0.0;
    for rule in finals {
        value += rule.value();
        for &(variable, choice) in rule.tags() {
            assignment[variable] = choice;
        }
    }
    Solution { assignment, value }
}

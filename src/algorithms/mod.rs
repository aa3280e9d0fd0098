pub mod elimination;
pub mod maxplus;

pub use elimination::{EliminationDiagnostics, EliminationOrder, VariableElimination};
pub use maxplus::{MaxPlus, MaxPlusDiagnostics};

use crate::factored::{FactoredError, PartialKeys, Rule, Solution};

/// Algorithm that picks the joint assignment maximizing a sum of local rules.
///
/// # Arguments
///
/// * `space` - Domain size of each variable
/// * `rules` - Local contributions; a joint assignment scores the sum of the
///   values of every rule consistent with it
///
/// Implementations are exact ([`VariableElimination`]) or approximate
/// ([`MaxPlus`]); both return a full assignment and its true value.
pub trait CoordinationAlgorithm {
    fn solve(&self, space: &[usize], rules: &[Rule]) -> Result<Solution, FactoredError>;
}

impl CoordinationAlgorithm for VariableElimination {
    fn solve(&self, space: &[usize], rules: &[Rule]) -> Result<Solution, FactoredError> {
        VariableElimination::solve(self, space, rules)
    }
}

impl CoordinationAlgorithm for MaxPlus {
    fn solve(&self, space: &[usize], rules: &[Rule]) -> Result<Solution, FactoredError> {
        MaxPlus::solve(self, space, rules)
    }
}

/// Checks that every rule fits `space`.
///
/// Rules are validated when built, but possibly against another space; this
/// re-checks them once per solve so the hot loops can trust them.
pub(crate) fn check_rules(space: &[usize], rules: &[Rule]) -> Result<(), FactoredError> {
    for rule in rules {
        check_scope(space, rule.keys())?;
        if rule.keys().len() != rule.values().len() {
            return Err(FactoredError::LengthMismatch {
                keys: rule.keys().len(),
                values: rule.values().len(),
            });
        }
        for (key, value) in rule.assignment().iter() {
            if value >= space[key] {
                return Err(FactoredError::ValueOutOfRange {
                    key,
                    value,
                    domain: space[key],
                });
            }
        }
    }
    Ok(())
}

fn check_scope(space: &[usize], keys: &PartialKeys) -> Result<(), FactoredError> {
    PartialKeys::check(keys, space.len()).map_err(FactoredError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factored::{PartialAssignment, ScopeViolation};

    fn scenario() -> (Vec<usize>, Vec<Rule>) {
        let space = vec![2, 2, 3];
        let rule = |keys: Vec<usize>, values: Vec<usize>, value: f64| {
            Rule::new(PartialAssignment::new(&space, keys, values).unwrap(), value)
        };
        let rules = vec![
            rule(vec![0], vec![0], 1.0),
            rule(vec![0], vec![1], 3.0),
            rule(vec![1, 2], vec![0, 0], 2.0),
            rule(vec![1, 2], vec![1, 2], 5.0),
        ];
        (space, rules)
    }

    #[test]
    fn algorithms_are_interchangeable() {
        let (space, rules) = scenario();
        let algorithms: Vec<Box<dyn CoordinationAlgorithm>> = vec![
            Box::new(VariableElimination::default()),
            Box::new(MaxPlus::default()),
        ];
        for algorithm in algorithms {
            let solution = algorithm.solve(&space, &rules).unwrap();
            assert_eq!(solution.assignment, vec![1, 1, 2]);
            assert_eq!(solution.value, 8.0);
        }
    }

    #[test]
    fn rules_from_a_larger_space_are_rejected() {
        let (_, rules) = scenario();
        let err = VariableElimination::default().solve(&[2, 2], &rules).unwrap_err();
        assert!(matches!(err, FactoredError::InvalidScope(_)));
    }

    #[test]
    fn rule_values_must_fit_the_space() {
        let (_, rules) = scenario();
        let err = MaxPlus::default().solve(&[2, 2, 2], &rules).unwrap_err();
        assert_eq!(
            err,
            FactoredError::ValueOutOfRange {
                key: 2,
                value: 2,
                domain: 2
            }
        );
    }

    #[test]
    fn rules_over_the_empty_scope_are_rejected() {
        let empty = PartialAssignment::from_parts(PartialKeys::from_sorted(vec![]), vec![]);
        let rules = vec![Rule::new(empty, 1.0)];
        for algorithm in [
            &VariableElimination::default() as &dyn CoordinationAlgorithm,
            &MaxPlus::default(),
        ] {
            let err = algorithm.solve(&[2], &rules).unwrap_err();
            assert_eq!(err, FactoredError::InvalidScope(ScopeViolation::Empty));
        }
    }

    #[test]
    fn scope_check_covers_order_and_range() {
        assert!(PartialKeys::check(&[0, 2], 3).is_ok());
        assert_eq!(
            PartialKeys::check(&[2, 0], 3),
            Err(ScopeViolation::Unsorted { position: 1 })
        );
        assert_eq!(
            PartialKeys::check(&[0, 3], 3),
            Err(ScopeViolation::OutOfRange { key: 3, variables: 3 })
        );
    }
}

//! Sparse assignments over a subset of the variable space.

use std::cmp::Ordering;
use std::ops::Deref;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::{FactoredError, ScopeViolation};

/// A strictly increasing, duplicate-free list of variable indices.
///
/// Every merge-based routine in this crate walks two scopes in lockstep, so
/// the ordering invariant is checked once here and then trusted everywhere.
/// Read access goes through `Deref<Target = [usize]>`.
///
/// Deserialized scopes go through the same checks, except the range check,
/// which needs a space; solvers re-check that one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<usize>"))]
pub struct PartialKeys(Vec<usize>);

impl TryFrom<Vec<usize>> for PartialKeys {
    type Error = FactoredError;

    fn try_from(keys: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(keys, usize::MAX)
    }
}

impl PartialKeys {
    /// Builds a scope from keys that must already be strictly increasing.
    ///
    /// # Errors
    ///
    /// `InvalidScope` if `keys` is empty, unsorted, has duplicates, or names a
    /// variable `>= variables`.
    pub fn new(keys: Vec<usize>, variables: usize) -> Result<Self, FactoredError> {
        Self::check(&keys, variables)?;
        Ok(Self(keys))
    }

    /// Checks a key list against the scope invariants without building one.
    pub(crate) fn check(keys: &[usize], variables: usize) -> Result<(), ScopeViolation> {
        if keys.is_empty() {
            return Err(ScopeViolation::Empty);
        }
        for (position, pair) in keys.windows(2).enumerate() {
            match pair[0].cmp(&pair[1]) {
                Ordering::Less => {}
                Ordering::Equal => return Err(ScopeViolation::Duplicate { key: pair[0] }),
                Ordering::Greater => {
                    return Err(ScopeViolation::Unsorted {
                        position: position + 1,
                    })
                }
            }
        }
        // Sorted, so only the last key can be the largest.
        match keys.last() {
            Some(&key) if key >= variables => Err(ScopeViolation::OutOfRange { key, variables }),
            _ => Ok(()),
        }
    }

    /// Sorts `keys` before validating them, so any permutation of a scope
    /// yields the same `PartialKeys`.
    pub fn normalized(mut keys: Vec<usize>, variables: usize) -> Result<Self, FactoredError> {
        keys.sort_unstable();
        Self::new(keys, variables)
    }

    /// Wraps keys that are known to be sorted and unique.
    ///
    /// Checked only in debug builds. May be empty: elimination produces empty
    /// scopes for its final rules.
    pub(crate) fn from_sorted(keys: Vec<usize>) -> Self {
        debug_assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys must be sorted");
        Self(keys)
    }

    /// Returns the keys as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Position of `key` inside this scope, if present.
    pub fn position(&self, key: usize) -> Option<usize> {
        self.0.binary_search(&key).ok()
    }
}

impl Deref for PartialKeys {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

/// Values for a subset of variables, paired with the keys they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawAssignment"))]
pub struct PartialAssignment {
    keys: PartialKeys,
    values: Vec<usize>,
}

/// Wire form of [`PartialAssignment`], checked before conversion.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawAssignment {
    keys: PartialKeys,
    values: Vec<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawAssignment> for PartialAssignment {
    type Error = FactoredError;

    fn try_from(raw: RawAssignment) -> Result<Self, Self::Error> {
        if raw.keys.len() != raw.values.len() {
            return Err(FactoredError::LengthMismatch {
                keys: raw.keys.len(),
                values: raw.values.len(),
            });
        }
        Ok(Self {
            keys: raw.keys,
            values: raw.values,
        })
    }
}

impl PartialAssignment {
    /// Builds a partial assignment over `space` (one domain size per variable).
    ///
    /// # Errors
    ///
    /// - `InvalidScope` for an invalid key list
    /// - `LengthMismatch` if `keys` and `values` differ in length
    /// - `ValueOutOfRange` if a value does not fit its variable's domain
    pub fn new(space: &[usize], keys: Vec<usize>, values: Vec<usize>) -> Result<Self, FactoredError> {
        let keys = PartialKeys::new(keys, space.len())?;
        if keys.len() != values.len() {
            return Err(FactoredError::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }
        for (&key, &value) in keys.iter().zip(&values) {
            if value >= space[key] {
                return Err(FactoredError::ValueOutOfRange {
                    key,
                    value,
                    domain: space[key],
                });
            }
        }
        Ok(Self { keys, values })
    }

    /// Builds a partial assignment from `(variable, value)` pairs in any order.
    pub fn from_pairs<I>(space: &[usize], pairs: I) -> Result<Self, FactoredError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut pairs: Vec<(usize, usize)> = pairs.into_iter().collect();
        pairs.sort_unstable_by_key(|&(key, _)| key);
        let (keys, values) = pairs.into_iter().unzip();
        Self::new(space, keys, values)
    }

    pub(crate) fn from_parts(keys: PartialKeys, values: Vec<usize>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self { keys, values }
    }

    pub fn keys(&self) -> &PartialKeys {
        &self.keys
    }

    pub fn values(&self) -> &[usize] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value assigned to `key`, if this assignment mentions it.
    pub fn value_of(&self, key: usize) -> Option<usize> {
        self.keys.position(key).map(|i| self.values[i])
    }

    /// Iterates over `(variable, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.keys.iter().copied().zip(self.values.iter().copied())
    }

    /// Whether both assignments agree on every variable they both mention.
    pub fn is_consistent(&self, other: &PartialAssignment) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.keys.len() && j < other.keys.len() {
            match self.keys[i].cmp(&other.keys[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    if self.values[i] != other.values[j] {
                        return false;
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        true
    }

    /// Whether this assignment agrees with a full assignment of the space.
    pub fn matches_full(&self, full: &[usize]) -> bool {
        matches_full(&self.keys, &self.values, full)
    }

    /// Union of two assignments; on shared keys the value from `self` is kept.
    ///
    /// Callers are expected to join consistent assignments only.
    pub fn join(&self, other: &PartialAssignment) -> PartialAssignment {
        debug_assert!(self.is_consistent(other));
        let mut keys = Vec::with_capacity(self.len() + other.len());
        let mut values = Vec::with_capacity(self.len() + other.len());
        let (mut i, mut j) = (0, 0);
        while i < self.len() || j < other.len() {
            let take_self = j == other.len() || (i < self.len() && self.keys[i] <= other.keys[j]);
            if take_self {
                if j < other.len() && self.keys[i] == other.keys[j] {
                    j += 1;
                }
                keys.push(self.keys[i]);
                values.push(self.values[i]);
                i += 1;
            } else {
                keys.push(other.keys[j]);
                values.push(other.values[j]);
                j += 1;
            }
        }
        Self {
            keys: PartialKeys::from_sorted(keys),
            values,
        }
    }
}

/// Checks that the variable space is usable: every domain has at least one value.
pub fn validate_space(space: &[usize]) -> Result<(), FactoredError> {
    match space.iter().position(|&size| size == 0) {
        Some(variable) => Err(FactoredError::EmptyDomain { variable }),
        None => Ok(()),
    }
}

/// Whether `values` (paired with `keys`) agree with a full assignment.
pub fn matches_full(keys: &[usize], values: &[usize], full: &[usize]) -> bool {
    keys.iter().zip(values).all(|(&k, &v)| full[k] == v)
}

/// Sorted union of two sorted key lists.
pub fn merge_keys(lhs: &[usize], rhs: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(lhs.len() + rhs.len());
    let (mut i, mut j) = (0, 0);
    while i < lhs.len() && j < rhs.len() {
        match lhs[i].cmp(&rhs[j]) {
            Ordering::Less => {
                out.push(lhs[i]);
                i += 1;
            }
            Ordering::Greater => {
                out.push(rhs[j]);
                j += 1;
            }
            Ordering::Equal => {
                out.push(lhs[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&lhs[i..]);
    out.extend_from_slice(&rhs[j..]);
    out
}

/// Removes `key` from a sorted key list, if present.
pub fn eliminate_key(keys: &[usize], key: usize) -> Vec<usize> {
    keys.iter().copied().filter(|&k| k != key).collect()
}

/// Number of joint assignments of the variables in `keys`.
pub fn factor_space_partial(space: &[usize], keys: &[usize]) -> usize {
    keys.iter().map(|&k| space[k]).product()
}

/// Mixed-radix index of `values` over `keys`; the first key varies fastest.
///
/// This is the same order in which [`JointEnumerator`](super::JointEnumerator)
/// visits assignments.
pub fn to_index_partial(space: &[usize], keys: &[usize], values: &[usize]) -> usize {
    let mut index = 0;
    let mut multiplier = 1;
    for (&k, &v) in keys.iter().zip(values) {
        index += v * multiplier;
        multiplier *= space[k];
    }
    index
}

/// Inverse of [`to_index_partial`].
pub fn to_values_partial(space: &[usize], keys: &[usize], mut index: usize) -> Vec<usize> {
    keys.iter()
        .map(|&k| {
            let v = index % space[k];
            index /= space[k];
            v
        })
        .collect()
}

/// One local contribution to a joint objective.
///
/// `tags` records which already-eliminated variables were fixed to which
/// value to produce this rule; rules supplied by callers carry none.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rule {
    assignment: PartialAssignment,
    value: f64,
    tags: Vec<(usize, usize)>,
}

impl Rule {
    pub fn new(assignment: PartialAssignment, value: f64) -> Self {
        Self {
            assignment,
            value,
            tags: Vec::new(),
        }
    }

    pub(crate) fn with_tags(assignment: PartialAssignment, value: f64, tags: Vec<(usize, usize)>) -> Self {
        Self {
            assignment,
            value,
            tags,
        }
    }

    pub fn assignment(&self) -> &PartialAssignment {
        &self.assignment
    }

    pub fn keys(&self) -> &PartialKeys {
        self.assignment.keys()
    }

    pub fn values(&self) -> &[usize] {
        self.assignment.values()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn tags(&self) -> &[(usize, usize)] {
        &self.tags
    }
}

/// Sum of the values of every rule consistent with a full assignment.
pub fn evaluate_rules<'a, I>(rules: I, full: &[usize]) -> f64
where
    I: IntoIterator<Item = &'a Rule>,
{
    rules
        .into_iter()
        .filter(|r| r.assignment.matches_full(full))
        .map(|r| r.value)
        .sum()
}

/// A joint assignment of the whole space together with its value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    pub assignment: Vec<usize>,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPACE: [usize; 4] = [2, 3, 2, 4];

    fn pa(keys: &[usize], values: &[usize]) -> PartialAssignment {
        PartialAssignment::new(&SPACE, keys.to_vec(), values.to_vec()).unwrap()
    }

    #[test]
    fn keys_reject_empty() {
        assert_eq!(
            PartialKeys::new(vec![], 3),
            Err(FactoredError::InvalidScope(ScopeViolation::Empty))
        );
    }

    #[test]
    fn keys_reject_unsorted_and_duplicates() {
        assert_eq!(
            PartialKeys::new(vec![0, 2, 1], 3),
            Err(FactoredError::InvalidScope(ScopeViolation::Unsorted { position: 2 }))
        );
        assert_eq!(
            PartialKeys::new(vec![1, 1], 3),
            Err(FactoredError::InvalidScope(ScopeViolation::Duplicate { key: 1 }))
        );
        assert_eq!(
            PartialKeys::normalized(vec![2, 0, 2], 3),
            Err(FactoredError::InvalidScope(ScopeViolation::Duplicate { key: 2 }))
        );
    }

    #[test]
    fn keys_reject_out_of_range() {
        assert_eq!(
            PartialKeys::new(vec![0, 3], 3),
            Err(FactoredError::InvalidScope(ScopeViolation::OutOfRange {
                key: 3,
                variables: 3
            }))
        );
    }

    #[test]
    fn normalized_keys_ignore_order() {
        let a = PartialKeys::normalized(vec![2, 0, 1], 3).unwrap();
        let b = PartialKeys::new(vec![0, 1, 2], 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn assignment_checks_values() {
        let err = PartialAssignment::new(&SPACE, vec![1], vec![3]).unwrap_err();
        assert_eq!(
            err,
            FactoredError::ValueOutOfRange {
                key: 1,
                value: 3,
                domain: 3
            }
        );
        let err = PartialAssignment::new(&SPACE, vec![1, 2], vec![0]).unwrap_err();
        assert_eq!(err, FactoredError::LengthMismatch { keys: 2, values: 1 });
    }

    #[test]
    fn from_pairs_sorts() {
        let a = PartialAssignment::from_pairs(&SPACE, [(3, 1), (0, 1)]).unwrap();
        assert_eq!(a.keys().as_slice(), &[0, 3]);
        assert_eq!(a.values(), &[1, 1]);
        assert_eq!(a.value_of(3), Some(1));
        assert_eq!(a.value_of(2), None);
    }

    #[test]
    fn consistency() {
        assert!(pa(&[0, 1], &[1, 2]).is_consistent(&pa(&[1, 3], &[2, 0])));
        assert!(!pa(&[0, 1], &[1, 2]).is_consistent(&pa(&[1, 3], &[1, 0])));
        assert!(pa(&[0], &[1]).is_consistent(&pa(&[2], &[0])));
    }

    #[test]
    fn join_merges_keys() {
        let joined = pa(&[0, 2], &[1, 1]).join(&pa(&[1, 2], &[2, 1]));
        assert_eq!(joined.keys().as_slice(), &[0, 1, 2]);
        assert_eq!(joined.values(), &[1, 2, 1]);
    }

    #[test]
    fn matches_full_assignment() {
        let a = pa(&[1, 3], &[2, 3]);
        assert!(a.matches_full(&[0, 2, 1, 3]));
        assert!(!a.matches_full(&[0, 1, 1, 3]));
    }

    #[test]
    fn merge_and_eliminate() {
        assert_eq!(merge_keys(&[0, 2, 5], &[1, 2, 6]), vec![0, 1, 2, 5, 6]);
        assert_eq!(merge_keys(&[], &[3]), vec![3]);
        assert_eq!(eliminate_key(&[0, 2, 5], 2), vec![0, 5]);
        assert_eq!(eliminate_key(&[0, 2, 5], 4), vec![0, 2, 5]);
    }

    #[test]
    fn index_roundtrip_first_key_fastest() {
        let keys = [1, 3];
        assert_eq!(factor_space_partial(&SPACE, &keys), 12);
        assert_eq!(to_index_partial(&SPACE, &keys, &[1, 0]), 1);
        assert_eq!(to_index_partial(&SPACE, &keys, &[0, 1]), 3);
        assert_eq!(to_values_partial(&SPACE, &keys, 11), vec![2, 3]);
    }

    #[test]
    fn space_validation() {
        assert!(validate_space(&SPACE).is_ok());
        assert_eq!(
            validate_space(&[2, 0, 1]),
            Err(FactoredError::EmptyDomain { variable: 1 })
        );
    }

    #[test]
    fn evaluate_sums_matching_rules() {
        let rules = vec![
            Rule::new(pa(&[0], &[1]), 2.0),
            Rule::new(pa(&[0, 1], &[1, 1]), 3.0),
            Rule::new(pa(&[2], &[0]), 5.0),
        ];
        assert_eq!(evaluate_rules(&rules, &[1, 1, 1, 0]), 5.0);
        assert_eq!(evaluate_rules(&rules, &[1, 0, 0, 0]), 7.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn rule_serde_roundtrip() {
        let rule = Rule::new(pa(&[0, 2], &[1, 0]), 2.5);
        let json = serde_json::to_string(&rule).unwrap();
        let back: Rule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialization_validates_keys() {
        let unsorted = r#"{"assignment":{"keys":[1,0],"values":[0,1]},"value":5.0,"tags":[]}"#;
        let err = serde_json::from_str::<Rule>(unsorted).unwrap_err();
        assert!(err.to_string().contains("not increasing"));

        let duplicate = r#"{"keys":[2,2],"values":[0,1]}"#;
        assert!(serde_json::from_str::<PartialAssignment>(duplicate).is_err());
        assert!(serde_json::from_str::<PartialKeys>("[]").is_err());

        let short = r#"{"keys":[0,1],"values":[1]}"#;
        let err = serde_json::from_str::<PartialAssignment>(short).unwrap_err();
        assert!(err.to_string().contains("Got 2 keys but 1 values"));
    }
}

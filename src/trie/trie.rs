//! Per-variable, per-value sorted id lists.

use crate::factored::PartialAssignment;

/// Index of partial assignments over a fixed variable space.
///
/// For every variable the trie keeps one sorted id list per value plus a
/// *wildcard* list for entries that do not mention the variable. Each id sits
/// in exactly one list per variable, so the entries consistent with a query are
/// the intersection, over the constrained variables, of
/// `value list ∪ wildcard list`.
///
/// # Invariants
///
/// - Ids are handed out sequentially from 0 and never reused
/// - Every list is sorted, since ids only grow
///
/// # Complexity
///
/// - `insert`: O(V) for V variables
/// - `filter`: O(V log V + r · V log n), r being the smallest candidate range
/// - `erase`: O(V · (log n + list length))
#[derive(Debug, Clone)]
pub struct Trie {
    space: Vec<usize>,
    /// `buckets[var][value]`, with `buckets[var][space[var]]` the wildcard list.
    buckets: Vec<Vec<Vec<usize>>>,
    ids: Vec<usize>,
    next_id: usize,
}

impl Trie {
    /// Creates an empty trie over `space`, one domain size per variable.
    pub fn new(space: Vec<usize>) -> Self {
        let buckets = space.iter().map(|&size| vec![Vec::new(); size + 1]).collect();
        Self {
            space,
            buckets,
            ids: Vec::new(),
            next_id: 0,
        }
    }

    pub fn space(&self) -> &[usize] {
        &self.space
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Id the next insertion will receive; also the number of ids ever issued.
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    /// Live ids in increasing order.
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Indexes `entry` and returns its id.
    pub fn insert(&mut self, entry: &PartialAssignment) -> usize {
        debug_assert!(
            entry.keys().last().map_or(true, |&k| k < self.space.len()),
            "entry mentions a variable outside the trie's space"
        );
        let id = self.next_id;
        self.next_id += 1;

        let mut pairs = entry.iter().peekable();
        for (var, buckets) in self.buckets.iter_mut().enumerate() {
            let slot = match pairs.peek() {
                Some(&(key, value)) if key == var => {
                    pairs.next();
                    value
                }
                _ => self.space[var],
            };
            buckets[slot].push(id);
        }
        self.ids.push(id);
        id
    }

    /// Ids of every entry consistent with a full assignment of the space.
    pub fn filter(&self, full: &[usize]) -> Vec<usize> {
        debug_assert_eq!(full.len(), self.space.len());
        self.filter_pairs(full.iter().copied().enumerate())
    }

    /// Ids of every entry consistent with a partial assignment.
    ///
    /// Variables the query leaves out do not restrict the result.
    pub fn filter_partial(&self, query: &PartialAssignment) -> Vec<usize> {
        self.filter_pairs(query.iter())
    }

    fn filter_pairs<I>(&self, pairs: I) -> Vec<usize>
    where
        I: Iterator<Item = (usize, usize)>,
    {
        let mut ranges: Vec<(&[usize], &[usize])> = pairs
            .map(|(var, value)| {
                let buckets = &self.buckets[var];
                (buckets[value].as_slice(), buckets[self.space[var]].as_slice())
            })
            .collect();
        if ranges.is_empty() {
            return self.ids.clone();
        }
        ranges.sort_unstable_by_key(|(pinned, wild)| pinned.len() + wild.len());

        let (pinned, wild) = ranges[0];
        let mut result = union_sorted(pinned, wild);
        for &(pinned, wild) in &ranges[1..] {
            if result.is_empty() {
                break;
            }
            retain_in_union(&mut result, pinned, wild);
        }
        result
    }

    /// Removes `id` from the index. Returns false if it was not live.
    pub fn erase(&mut self, id: usize) -> bool {
        let Ok(pos) = self.ids.binary_search(&id) else {
            return false;
        };
        self.ids.remove(pos);
        for buckets in &mut self.buckets {
            for list in buckets.iter_mut() {
                if let Ok(pos) = list.binary_search(&id) {
                    list.remove(pos);
                    break;
                }
            }
        }
        true
    }
}

fn union_sorted(lhs: &[usize], rhs: &[usize]) -> Vec<usize> {
    // An id never sits in both lists of the same variable.
    let mut out = Vec::with_capacity(lhs.len() + rhs.len());
    let (mut i, mut j) = (0, 0);
    while i < lhs.len() && j < rhs.len() {
        if lhs[i] < rhs[j] {
            out.push(lhs[i]);
            i += 1;
        } else {
            out.push(rhs[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&lhs[i..]);
    out.extend_from_slice(&rhs[j..]);
    out
}

/// Keeps the ids of `result` that occur in `pinned` or `wild`.
fn retain_in_union(result: &mut Vec<usize>, mut pinned: &[usize], mut wild: &[usize]) {
    result.retain(|&id| {
        let p = pinned.partition_point(|&x| x < id);
        pinned = &pinned[p..];
        let w = wild.partition_point(|&x| x < id);
        wild = &wild[w..];
        pinned.first() == Some(&id) || wild.first() == Some(&id)
    });
}

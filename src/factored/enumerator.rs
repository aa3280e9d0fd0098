//! Mixed-radix enumeration of joint assignments over a subset of variables.

/// Visits every joint assignment of a set of variables, first key fastest.
///
/// The visiting order matches [`to_index_partial`](super::to_index_partial),
/// so a counter incremented alongside [`advance`](Self::advance) is the dense
/// table index of the current assignment. An empty key set yields exactly one
/// (empty) assignment.
///
/// ```
/// use factor_coord::factored::JointEnumerator;
///
/// let space = [2, 3];
/// let mut e = JointEnumerator::new(&space, &[0, 1]);
/// let mut seen = Vec::new();
/// while e.is_valid() {
///     seen.push(e.values().to_vec());
///     e.advance();
/// }
/// assert_eq!(seen.len(), 6);
/// assert_eq!(seen[1], vec![1, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct JointEnumerator {
    keys: Vec<usize>,
    radix: Vec<usize>,
    values: Vec<usize>,
    valid: bool,
}

impl JointEnumerator {
    pub fn new(space: &[usize], keys: &[usize]) -> Self {
        let radix: Vec<usize> = keys.iter().map(|&k| space[k]).collect();
        let valid = radix.iter().all(|&r| r > 0);
        Self {
            keys: keys.to_vec(),
            values: vec![0; radix.len()],
            radix,
            valid,
        }
    }

    /// Enumerates `keys` without `skip`.
    pub fn skipping(space: &[usize], keys: &[usize], skip: usize) -> Self {
        let keys: Vec<usize> = keys.iter().copied().filter(|&k| k != skip).collect();
        Self::new(space, &keys)
    }

    pub fn keys(&self) -> &[usize] {
        &self.keys
    }

    /// Current assignment, parallel to [`keys`](Self::keys).
    pub fn values(&self) -> &[usize] {
        &self.values
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Total number of assignments this enumerator visits.
    pub fn size(&self) -> usize {
        self.radix.iter().product()
    }

    /// Moves to the next assignment; invalidates the enumerator after the last one.
    pub fn advance(&mut self) {
        debug_assert!(self.valid, "advancing an exhausted enumerator");
        for (value, &radix) in self.values.iter_mut().zip(&self.radix) {
            *value += 1;
            if *value < radix {
                return;
            }
            *value = 0;
        }
        self.valid = false;
    }

    /// Restarts from the all-zero assignment.
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0);
        self.valid = self.radix.iter().all(|&r| r > 0);
    }
}

//! Message state and one synchronous max-plus sweep.

use crate::factored::{to_index_partial, JointEnumerator};
use crate::graph::{FactorGraph, FactorHandle};

/// Messages received by one variable, one row per adjacent factor.
///
/// The extra last row holds the sum of the others so the aggregate can be
/// read without re-summing.
#[derive(Debug, Clone)]
struct MessageMatrix {
    width: usize,
    rows: usize,
    data: Vec<f64>,
}

impl MessageMatrix {
    fn new(factors: usize, width: usize) -> Self {
        Self {
            width,
            rows: factors + 1,
            data: vec![0.0; (factors + 1) * width],
        }
    }

    fn get(&self, row: usize, value: usize) -> f64 {
        self.data[row * self.width + value]
    }

    fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.width..(row + 1) * self.width]
    }

    fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.width..(row + 1) * self.width]
    }

    fn sum_row(&self) -> usize {
        self.rows - 1
    }

    /// Contribution of every factor but the one owning `row`.
    fn excluding(&self, row: usize, value: usize) -> f64 {
        self.get(self.sum_row(), value) - self.get(row, value)
    }

    fn zero(&mut self) {
        self.data.iter_mut().for_each(|x| *x = 0.0);
    }

    fn refresh_sum(&mut self) {
        let sum = self.sum_row();
        for value in 0..self.width {
            let total: f64 = (0..sum).map(|row| self.get(row, value)).sum();
            self.data[sum * self.width + value] = total;
        }
    }

    /// Value with the largest aggregate message; the lowest wins ties.
    fn best_value(&self) -> usize {
        let mut best = 0;
        for (value, &score) in self.row(self.sum_row()).iter().enumerate() {
            if score > self.row(self.sum_row())[best] {
                best = value;
            }
        }
        best
    }
}

/// A factor prepared for message passing.
struct FactorEntry<'g> {
    scope: &'g [usize],
    table: &'g [f64],
    /// Row of this factor in the message matrix of each scope variable.
    rows: Vec<usize>,
}

/// Message buffers for a fixed graph.
pub(super) struct MessagePassing<'g> {
    space: &'g [usize],
    factors: Vec<FactorEntry<'g>>,
    incoming: Vec<MessageMatrix>,
    outgoing: Vec<MessageMatrix>,
}

impl<'g> MessagePassing<'g> {
    pub(super) fn new(space: &'g [usize], graph: &'g FactorGraph<Vec<f64>>) -> Self {
        let adjacency: Vec<Vec<FactorHandle>> = (0..space.len()).map(|v| graph.variable_neighbors(v)).collect();
        let factors = graph
            .factors()
            .map(|(handle, node)| {
                let rows = node
                    .scope()
                    .iter()
                    .map(|&v| adjacency[v].iter().position(|&h| h == handle).unwrap_or(0))
                    .collect();
                FactorEntry {
                    scope: node.scope().as_slice(),
                    table: node.data().as_slice(),
                    rows,
                }
            })
            .collect();
        let incoming: Vec<MessageMatrix> = adjacency
            .iter()
            .zip(space)
            .map(|(adjacent, &width)| MessageMatrix::new(adjacent.len(), width))
            .collect();
        let outgoing = incoming.clone();
        Self {
            space,
            factors,
            incoming,
            outgoing,
        }
    }

    /// Runs one sweep and returns each variable's preferred value.
    pub(super) fn sweep(&mut self) -> Vec<usize> {
        std::mem::swap(&mut self.incoming, &mut self.outgoing);
        self.outgoing.iter_mut().for_each(MessageMatrix::zero);

        let mut best: Vec<Vec<f64>> = Vec::new();
        for factor in &self.factors {
            best.clear();
            best.extend(factor.scope.iter().map(|&v| vec![f64::NEG_INFINITY; self.space[v]]));

            let mut joint = JointEnumerator::new(self.space, factor.scope);
            let mut index = 0;
            while joint.is_valid() {
                let values = joint.values();
                let own: Vec<f64> = factor
                    .scope
                    .iter()
                    .zip(&factor.rows)
                    .zip(values)
                    .map(|((&v, &row), &x)| self.incoming[v].excluding(row, x))
                    .collect();
                let combined = factor.table[index] + own.iter().sum::<f64>();

                for (i, &x) in values.iter().enumerate() {
                    let message = combined - own[i];
                    if message > best[i][x] {
                        best[i][x] = message;
                    }
                }
                index += 1;
                joint.advance();
            }

            for ((&v, &row), message) in factor.scope.iter().zip(&factor.rows).zip(&best) {
                let mean = message.iter().sum::<f64>() / message.len() as f64;
                for (out, &m) in self.outgoing[v].row_mut(row).iter_mut().zip(message) {
                    *out = m - mean;
                }
            }
        }

        self.outgoing
            .iter_mut()
            .map(|matrix| {
                matrix.refresh_sum();
                matrix.best_value()
            })
            .collect()
    }

    /// True value of a full assignment, read from the unmodified factor tables.
    pub(super) fn evaluate(&self, assignment: &[usize]) -> f64 {
        let mut local = Vec::new();
        self.factors
            .iter()
            .map(|factor| {
                local.clear();
                local.extend(factor.scope.iter().map(|&v| assignment[v]));
                factor.table[to_index_partial(self.space, factor.scope, &local)]
            })
            .sum()
    }
}

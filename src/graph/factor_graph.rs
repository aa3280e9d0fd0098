use crate::factored::{merge_keys, PartialKeys};
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use std::collections::HashMap;
use std::fmt::Display;

/// Stable reference to a factor of a [`FactorGraph`].
///
/// Handles stay valid while other factors are created or erased. Each factor
/// carries a serial number that the handle repeats, so a handle to an erased
/// factor is never mistaken for a newer factor occupying the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactorHandle {
    serial: u64,
    node: NodeIndex,
}

impl FactorHandle {
    /// Creation rank of the factor: earlier factors have smaller serials.
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

/// A factor: an immutable scope plus a caller-defined payload.
#[derive(Debug, Clone)]
pub struct FactorNode<F> {
    scope: PartialKeys,
    serial: u64,
    data: F,
}

impl<F> FactorNode<F> {
    pub fn scope(&self) -> &PartialKeys {
        &self.scope
    }

    pub fn data(&self) -> &F {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut F {
        &mut self.data
    }
}

#[derive(Debug, Clone)]
enum Node<F> {
    Variable { live: bool },
    Factor(FactorNode<F>),
}

/// Bipartite graph between variables and factors over subsets of them.
///
/// Variables are identified by position and occupy the first nodes of the
/// underlying graph for its whole lifetime. Factors are memoized by scope:
/// at most one factor exists per distinct [`PartialKeys`].
///
/// # Invariants
///
/// - A factor is adjacent to exactly the variables of its scope
/// - `by_scope` holds one entry per live factor
/// - Eliminated variables have no adjacent factors
///
/// # Example
///
/// ```
/// use factor_coord::factored::PartialKeys;
/// use factor_coord::graph::FactorGraph;
///
/// let mut graph: FactorGraph<Vec<f64>> = FactorGraph::new(3);
/// let scope = PartialKeys::new(vec![0, 2], 3).unwrap();
/// let f = graph.get_factor(&scope);
/// assert_eq!(graph.get_factor(&scope), f);
/// assert_eq!(graph.factor_size(), 1);
/// assert_eq!(graph.variable_neighbors(2), vec![f]);
/// ```
#[derive(Debug, Clone)]
pub struct FactorGraph<F> {
    graph: StableUnGraph<Node<F>, ()>,
    variables: usize,
    live_variables: usize,
    by_scope: HashMap<PartialKeys, FactorHandle>,
    next_serial: u64,
}

impl<F> FactorGraph<F> {
    /// Creates a graph with `variables` variables and no factors.
    pub fn new(variables: usize) -> Self {
        let mut graph = StableUnGraph::default();
        for _ in 0..variables {
            graph.add_node(Node::Variable { live: true });
        }
        Self {
            graph,
            variables,
            live_variables: variables,
            by_scope: HashMap::new(),
            next_serial: 0,
        }
    }

    /// Returns the factor with exactly this scope, creating it if needed.
    ///
    /// A new factor starts with `F::default()` and is linked to every variable
    /// of its scope. All of those variables must still be live.
    pub fn get_factor(&mut self, scope: &PartialKeys) -> FactorHandle
    where
        F: Default,
    {
        if let Some(&handle) = self.by_scope.get(scope) {
            return handle;
        }
        debug_assert!(scope.iter().all(|&v| self.is_live(v)), "scope mentions an eliminated variable");

        let serial = self.next_serial;
        self.next_serial += 1;
        let node = self.graph.add_node(Node::Factor(FactorNode {
            scope: scope.clone(),
            serial,
            data: F::default(),
        }));
        for &variable in scope.iter() {
            self.graph.add_edge(NodeIndex::new(variable), node, ());
        }

        let handle = FactorHandle { serial, node };
        self.by_scope.insert(scope.clone(), handle);
        handle
    }

    /// Looks up the factor with exactly this scope without creating it.
    pub fn find_factor(&self, scope: &PartialKeys) -> Option<FactorHandle> {
        self.by_scope.get(scope).copied()
    }

    /// Factors adjacent to `variable`, in creation order.
    pub fn variable_neighbors(&self, variable: usize) -> Vec<FactorHandle> {
        let mut handles: Vec<FactorHandle> = self
            .graph
            .neighbors(NodeIndex::new(variable))
            .filter_map(|node| match &self.graph[node] {
                Node::Factor(factor) => Some(FactorHandle {
                    serial: factor.serial,
                    node,
                }),
                Node::Variable { .. } => None,
            })
            .collect();
        handles.sort_unstable();
        handles
    }

    /// Number of factors adjacent to `variable`.
    pub fn degree(&self, variable: usize) -> usize {
        self.graph.neighbors(NodeIndex::new(variable)).count()
    }

    /// Scope of a factor, or `None` if the handle is stale.
    pub fn factor_scope(&self, handle: FactorHandle) -> Option<&PartialKeys> {
        self.factor(handle).map(FactorNode::scope)
    }

    /// Sorted union of the scopes of `handles`.
    pub fn union_scope(&self, handles: &[FactorHandle]) -> Vec<usize> {
        handles
            .iter()
            .filter_map(|&h| self.factor_scope(h))
            .fold(Vec::new(), |acc, scope| merge_keys(&acc, scope))
    }

    pub fn factor(&self, handle: FactorHandle) -> Option<&FactorNode<F>> {
        match self.graph.node_weight(handle.node) {
            Some(Node::Factor(factor)) if factor.serial == handle.serial => Some(factor),
            _ => None,
        }
    }

    pub fn factor_mut(&mut self, handle: FactorHandle) -> Option<&mut FactorNode<F>> {
        match self.graph.node_weight_mut(handle.node) {
            Some(Node::Factor(factor)) if factor.serial == handle.serial => Some(factor),
            _ => None,
        }
    }

    /// Iterates over live factors in slot order.
    pub fn factors(&self) -> impl Iterator<Item = (FactorHandle, &FactorNode<F>)> + '_ {
        self.graph.node_indices().filter_map(move |node| match &self.graph[node] {
            Node::Factor(factor) => Some((
                FactorHandle {
                    serial: factor.serial,
                    node,
                },
                factor,
            )),
            Node::Variable { .. } => None,
        })
    }

    /// Detaches a factor from its variables and drops it from the graph.
    ///
    /// Returns its payload, or `None` if the handle is stale.
    pub fn erase_factor(&mut self, handle: FactorHandle) -> Option<F> {
        self.factor(handle)?;
        match self.graph.remove_node(handle.node) {
            Some(Node::Factor(factor)) => {
                self.by_scope.remove(&factor.scope);
                Some(factor.data)
            }
            _ => None,
        }
    }

    /// Marks `variable` as eliminated.
    ///
    /// Every factor adjacent to the variable must already have been erased;
    /// this is only checked in debug builds.
    pub fn erase_variable(&mut self, variable: usize) {
        let node = NodeIndex::new(variable);
        debug_assert!(
            self.graph.neighbors(node).next().is_none(),
            "variable {variable} still has adjacent factors"
        );
        if let Some(Node::Variable { live }) = self.graph.node_weight_mut(node) {
            if *live {
                *live = false;
                self.live_variables -= 1;
            }
        }
    }

    pub fn is_live(&self, variable: usize) -> bool {
        matches!(
            self.graph.node_weight(NodeIndex::new(variable)),
            Some(Node::Variable { live: true })
        )
    }

    /// Variables that have not been eliminated, in increasing order.
    pub fn live_variables(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.variables).filter(move |&v| self.is_live(v))
    }

    /// Number of live variables.
    pub fn variable_size(&self) -> usize {
        self.live_variables
    }

    /// Number of live factors.
    pub fn factor_size(&self) -> usize {
        self.by_scope.len()
    }

    /// Number of variables the graph was created with, eliminated ones included.
    pub fn variables(&self) -> usize {
        self.variables
    }
}

impl<F> Display for FactorGraph<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "FactorGraph {{")?;
        writeln!(f, "  Variables: {} ({} live)", self.variables, self.live_variables)?;
        writeln!(f, "  Factors: {}", self.factor_size())?;
        for (handle, factor) in self.factors() {
            writeln!(f, "    [{}] {:?}", handle.serial, factor.scope.as_slice())?;
        }
        write!(f, "}}")
    }
}

mod factor_graph;

pub use factor_graph::{FactorGraph, FactorHandle, FactorNode};

//! Shared builders for unit tests.
#![allow(clippy::expect_used)]

use petgraph::graph::NodeIndex;

use crate::graph::{Cycle, TransferGraph};
use crate::records::{EdgeRecord, RiskRecord};

pub fn edge(from: &str, to: &str, weight: f64) -> EdgeRecord {
    EdgeRecord::new(from, to, weight)
}

/// Unit-weight transfers from `(from, to)` pairs.
pub fn edges(pairs: &[(&str, &str)]) -> Vec<EdgeRecord> {
    pairs
        .iter()
        .map(|&(from, to)| EdgeRecord::new(from, to, 1.0))
        .collect()
}

pub fn risk(id: &str, score: f64) -> RiskRecord {
    RiskRecord::new(id, score)
}

pub fn idx(graph: &TransferGraph, id: &str) -> NodeIndex {
    graph
        .node_index(id)
        .expect("account should exist in the test graph")
}

pub fn cycle_ids(graph: &TransferGraph, cycle: &Cycle) -> Vec<String> {
    cycle.ids(graph)
}

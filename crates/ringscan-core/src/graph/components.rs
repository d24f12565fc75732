/// Component partitions of a [`TransferGraph`].
///
/// - [`weak_components`] groups accounts that are connected when transfer
///   direction is ignored. DFS roots in different weak components never
///   interact, which is what makes per-component parallel detection sound.
/// - [`cyclic_components`] lists strongly connected components that contain
///   at least one cycle. Every node on any cycle belongs to one of them, so
///   this report covers accounts the back-edge detector can miss when a
///   cycle is only reachable through an already-closed branch.
use petgraph::algo::kosaraju_scc;
use petgraph::graph::NodeIndex;

use super::TransferGraph;
use crate::union_find::UnionFind;

/// Dense weak-component label for every node, indexed by `NodeIndex::index()`.
///
/// Labels are numbered in first-seen node order.
pub fn component_labels(graph: &TransferGraph) -> Vec<usize> {
    let mut uf = UnionFind::new(graph.node_count());
    for &source in graph.sources() {
        for &target in graph.neighbours(source) {
            uf.union(source.index(), target.index());
        }
    }
    uf.labels()
}

/// Weakly connected components, each listing its members in first-seen order.
///
/// Components are ordered by their first member. Accounts that only appear
/// in the risk table form singleton components.
pub fn weak_components(graph: &TransferGraph) -> Vec<Vec<NodeIndex>> {
    let labels = component_labels(graph);
    let mut components: Vec<Vec<NodeIndex>> = Vec::new();
    for (position, &label) in labels.iter().enumerate() {
        if label == components.len() {
            components.push(Vec::new());
        }
        if let Some(members) = components.get_mut(label) {
            members.push(NodeIndex::new(position));
        }
    }
    components
}

/// Strongly connected components that contain a cycle.
///
/// A component qualifies when it has more than one member, or when its single
/// member transfers to itself. Members are in first-seen order and components
/// are ordered by their first member.
///
/// Runs petgraph's Kosaraju SCC, whose traversals are iterative: ring length
/// is not bounded by the call stack.
pub fn cyclic_components(graph: &TransferGraph) -> Vec<Vec<NodeIndex>> {
    let mut components: Vec<Vec<NodeIndex>> = kosaraju_scc(graph.graph())
        .into_iter()
        .filter(|scc| match scc.as_slice() {
            [] => false,
            [only] => graph.neighbours(*only).contains(only),
            [_, _, ..] => true,
        })
        .map(|mut scc| {
            scc.sort_unstable();
            scc
        })
        .collect();
    components.sort_unstable_by_key(|scc| scc.first().copied());
    components
}

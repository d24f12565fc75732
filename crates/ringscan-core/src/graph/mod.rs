/// Transfer-network construction using `petgraph`, plus the cycle algorithms.
///
/// [`build_graph`] turns a transfer list and a risk table into a
/// [`TransferGraph`]: a petgraph [`DiGraph`] that keeps every transfer as its
/// own edge, alongside an ordered adjacency list that the detectors walk.
///
/// # Ordering
///
/// Node indices are assigned in first-seen order: transfer endpoints in input
/// order (source before target), then accounts that only appear in the risk
/// table. Each node's adjacency list holds its *distinct* successors in the
/// order their first transfer appeared, and [`TransferGraph::sources`] lists
/// every node with at least one outgoing transfer in first-seen-as-source
/// order. Detection results are therefore a pure function of input order.
///
/// # Parallel transfers
///
/// Several transfers between the same ordered pair stay distinct in the
/// petgraph storage and in the raw transfer count, but collapse to one
/// adjacency entry and one aggregated pair weight. A cycle is about
/// reachability, not about which parallel transfer was used.
///
/// # Algorithms
///
/// - [`cycles`]: back-edge DFS cycle detection and cycle post-processing.
/// - [`components`]: weakly connected partition and cyclic SCCs.
/// - [`rings`]: fixed-length cycle enumeration.
pub mod components;
pub mod cycles;
pub mod rings;

pub use components::{cyclic_components, weak_components};
pub use cycles::{
    Cycle, DetectConfig, canonicalize, dedupe_cycles, detect_cycles, detect_distinct_cycles,
};
pub use rings::fixed_length_cycles;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, warn};

use crate::records::{EdgeRecord, RiskRecord};

/// Weight stored on each petgraph node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeWeight {
    /// Account identifier.
    pub account_id: String,
    /// Risk score, or `None` if the risk table has no entry for the account.
    pub risk: Option<f64>,
}

/// Weight stored on each petgraph edge: one transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeWeight {
    /// Transfer amount, unvalidated.
    pub amount: f64,
    /// Transaction identifier, if supplied.
    pub label: Option<String>,
    /// Position of the originating record in the input transfer list.
    pub data_index: usize,
}

/// An in-memory snapshot of a transfer network.
///
/// Construct with [`build_graph`]. The graph is read-only once built.
#[derive(Debug, Clone)]
pub struct TransferGraph {
    graph: DiGraph<NodeWeight, EdgeWeight>,
    id_to_index: HashMap<String, NodeIndex>,
    adjacency: Vec<Vec<NodeIndex>>,
    sources: Vec<NodeIndex>,
    pair_weights: HashMap<(NodeIndex, NodeIndex), f64>,
    scored_accounts: usize,
}

impl TransferGraph {
    /// Number of distinct accounts (transfer endpoints plus risk-table entries).
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of transfers, counting parallel transfers separately.
    pub fn transfer_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of distinct ordered `(source, target)` pairs.
    pub fn distinct_edge_count(&self) -> usize {
        self.pair_weights.len()
    }

    /// Number of accounts that carry a risk score.
    pub fn scored_account_count(&self) -> usize {
        self.scored_accounts
    }

    /// Looks up the index of an account.
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    /// Returns the weight of a node, or `None` for an out-of-range index.
    pub fn node_weight(&self, idx: NodeIndex) -> Option<&NodeWeight> {
        self.graph.node_weight(idx)
    }

    /// Returns the account identifier for `idx`.
    pub fn account_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(|w| w.account_id.as_str())
    }

    /// Returns the risk score for `idx`, if the account has one.
    pub fn risk(&self, idx: NodeIndex) -> Option<f64> {
        self.graph.node_weight(idx).and_then(|w| w.risk)
    }

    /// Distinct successors of `idx` in first-seen order.
    ///
    /// Returns an empty slice for nodes without outgoing transfers.
    pub fn neighbours(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.adjacency
            .get(idx.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Nodes with at least one outgoing transfer, in first-seen order.
    pub fn sources(&self) -> &[NodeIndex] {
        &self.sources
    }

    /// Sum of all transfer amounts from `from` to `to`, or `None` if there is
    /// no such transfer.
    pub fn pair_weight(&self, from: NodeIndex, to: NodeIndex) -> Option<f64> {
        self.pair_weights.get(&(from, to)).copied()
    }

    /// Sum of every transfer amount in the graph.
    pub fn total_amount(&self) -> f64 {
        self.graph.edge_weights().map(|w| w.amount).sum()
    }

    /// All node indices in first-seen order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Resolves a sequence of indices to account identifiers.
    ///
    /// Indices that do not belong to this graph are skipped.
    pub fn ids_of(&self, nodes: &[NodeIndex]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|&n| self.account_id(n).map(str::to_owned))
            .collect()
    }

    /// Returns a reference to the underlying petgraph storage.
    pub fn graph(&self) -> &DiGraph<NodeWeight, EdgeWeight> {
        &self.graph
    }
}

/// Builds a [`TransferGraph`] from transfers and risk records.
///
/// Construction is O(N + E). The function is a pure transform and never
/// fails: accounts referenced only by transfers are created implicitly, and
/// accounts referenced only by the risk table become isolated nodes.
///
/// Records are expected to be validated already (see
/// [`crate::records`]). If the risk table lists an account more than once,
/// the last score wins and a warning is logged.
pub fn build_graph(edges: &[EdgeRecord], risks: &[RiskRecord]) -> TransferGraph {
    let mut builder = Builder::with_capacity(edges.len(), risks.len());

    for (data_index, edge) in edges.iter().enumerate() {
        let source = builder.intern(&edge.from);
        let target = builder.intern(&edge.to);
        builder.add_transfer(source, target, edge, data_index);
    }

    let mut scored: HashMap<NodeIndex, usize> = HashMap::with_capacity(risks.len());
    for (position, record) in risks.iter().enumerate() {
        let idx = builder.intern(&record.id);
        if let Some(previous) = scored.insert(idx, position) {
            warn!(
                account = %record.id,
                first = previous,
                duplicate = position,
                "account listed more than once in risk table, keeping the last score"
            );
        }
        if let Some(weight) = builder.graph.node_weight_mut(idx) {
            weight.risk = Some(record.risk);
        }
    }

    let graph = builder.finish(scored.len());
    debug!(
        nodes = graph.node_count(),
        transfers = graph.transfer_count(),
        distinct_edges = graph.distinct_edge_count(),
        sources = graph.sources.len(),
        "built transfer graph"
    );
    graph
}

/// Incremental construction state for [`build_graph`].
struct Builder {
    graph: DiGraph<NodeWeight, EdgeWeight>,
    id_to_index: HashMap<String, NodeIndex>,
    adjacency: Vec<Vec<NodeIndex>>,
    sources: Vec<NodeIndex>,
    pair_weights: HashMap<(NodeIndex, NodeIndex), f64>,
}

impl Builder {
    fn with_capacity(edge_count: usize, risk_count: usize) -> Self {
        let node_hint = edge_count.saturating_add(risk_count);
        Self {
            graph: DiGraph::with_capacity(node_hint, edge_count),
            id_to_index: HashMap::with_capacity(node_hint),
            adjacency: Vec::with_capacity(node_hint),
            sources: Vec::new(),
            pair_weights: HashMap::with_capacity(edge_count),
        }
    }

    /// Returns the index for `id`, creating the node on first sight.
    fn intern(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(NodeWeight {
            account_id: id.to_owned(),
            risk: None,
        });
        self.id_to_index.insert(id.to_owned(), idx);
        self.adjacency.push(Vec::new());
        debug_assert_eq!(self.adjacency.len(), self.graph.node_count());
        idx
    }

    fn add_transfer(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        edge: &EdgeRecord,
        data_index: usize,
    ) {
        self.graph.add_edge(
            source,
            target,
            EdgeWeight {
                amount: edge.weight,
                label: edge.label.clone(),
                data_index,
            },
        );

        match self.pair_weights.entry((source, target)) {
            Entry::Occupied(mut slot) => {
                *slot.get_mut() += edge.weight;
            }
            Entry::Vacant(slot) => {
                slot.insert(edge.weight);
                if let Some(successors) = self.adjacency.get_mut(source.index()) {
                    if successors.is_empty() {
                        self.sources.push(source);
                    }
                    successors.push(target);
                }
            }
        }
    }

    fn finish(self, scored_accounts: usize) -> TransferGraph {
        TransferGraph {
            graph: self.graph,
            id_to_index: self.id_to_index,
            adjacency: self.adjacency,
            sources: self.sources,
            pair_weights: self.pair_weights,
            scored_accounts,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::test_helpers::{edge, idx, risk};

    #[test]
    fn empty_input_builds_empty_graph() {
        let g = build_graph(&[], &[]);
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.transfer_count(), 0);
        assert!(g.sources().is_empty());
    }

    #[test]
    fn nodes_are_numbered_in_first_seen_order() {
        let g = build_graph(
            &[edge("b", "c", 1.0), edge("a", "b", 1.0)],
            &[risk("z", 0.1)],
        );
        let ids: Vec<&str> = g.node_indices().filter_map(|n| g.account_id(n)).collect();
        assert_eq!(ids, vec!["b", "c", "a", "z"]);
    }

    #[test]
    fn target_only_nodes_exist_but_are_not_sources() {
        let g = build_graph(&[edge("a", "b", 10.0)], &[]);
        assert_eq!(g.node_count(), 2);
        let b = idx(&g, "b");
        assert!(g.neighbours(b).is_empty());
        assert_eq!(g.sources(), &[idx(&g, "a")]);
    }

    #[test]
    fn parallel_transfers_kept_but_adjacency_is_distinct() {
        let g = build_graph(
            &[
                edge("a", "b", 10.0),
                edge("a", "c", 5.0),
                edge("a", "b", 2.5),
            ],
            &[],
        );
        assert_eq!(g.transfer_count(), 3);
        assert_eq!(g.distinct_edge_count(), 2);
        let (a, b, c) = (idx(&g, "a"), idx(&g, "b"), idx(&g, "c"));
        assert_eq!(g.neighbours(a), &[b, c]);
        assert_eq!(g.pair_weight(a, b), Some(12.5));
        assert_eq!(g.pair_weight(b, a), None);
    }

    #[test]
    fn sources_follow_first_outgoing_transfer() {
        let g = build_graph(
            &[edge("x", "y", 1.0), edge("y", "x", 1.0), edge("x", "z", 1.0)],
            &[],
        );
        assert_eq!(g.sources(), &[idx(&g, "x"), idx(&g, "y")]);
    }

    #[test]
    fn self_loop_is_accepted() {
        let g = build_graph(&[edge("a", "a", 3.0)], &[]);
        let a = idx(&g, "a");
        assert_eq!(g.neighbours(a), &[a]);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn risk_attached_and_missing_scores_are_none() {
        let g = build_graph(&[edge("a", "b", 1.0)], &[risk("a", 0.4)]);
        assert_eq!(g.risk(idx(&g, "a")), Some(0.4));
        assert_eq!(g.risk(idx(&g, "b")), None);
        assert_eq!(g.scored_account_count(), 1);
    }

    #[test]
    fn duplicate_risk_entry_keeps_last_score() {
        let g = build_graph(&[], &[risk("a", 0.2), risk("a", 0.9)]);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.scored_account_count(), 1);
        assert_eq!(g.risk(idx(&g, "a")), Some(0.9));
    }

    #[test]
    fn labels_and_data_index_are_stored_on_edges() {
        let g = build_graph(
            &[
                edge("a", "b", 1.0),
                EdgeRecord::new("b", "a", 2.0).with_label("tx-2"),
            ],
            &[],
        );
        let labelled: Vec<(usize, Option<&str>)> = g
            .graph()
            .edge_weights()
            .map(|w| (w.data_index, w.label.as_deref()))
            .collect();
        assert_eq!(labelled, vec![(0, None), (1, Some("tx-2"))]);
    }

    #[test]
    fn total_amount_sums_raw_transfers() {
        let g = build_graph(
            &[edge("a", "b", 100.0), edge("a", "b", 50.0), edge("b", "c", 25.0)],
            &[],
        );
        assert_eq!(g.total_amount(), 175.0);
    }

    #[test]
    fn ids_of_skips_foreign_indices() {
        let g = build_graph(&[edge("a", "b", 1.0)], &[]);
        let ids = g.ids_of(&[idx(&g, "b"), NodeIndex::new(99), idx(&g, "a")]);
        assert_eq!(ids, vec!["b".to_owned(), "a".to_owned()]);
    }
}

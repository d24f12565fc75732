/// Back-edge cycle detection over a [`TransferGraph`].
///
/// # Algorithm
///
/// Depth-first search with recursion-stack tracking, run as an explicit frame
/// stack so deep transfer chains cannot overflow the call stack. One run owns
/// three pieces of state:
///
/// - `visited`: nodes that have been entered at least once,
/// - `on_stack`: nodes on the active DFS path,
/// - `path`: the active path in order (mirrors `on_stack`).
///
/// Roots are taken from [`TransferGraph::sources`] in order, skipping any node
/// already visited. For each distinct successor of the node on top of the
/// stack:
///
/// - unvisited → enter it,
/// - on the stack → back edge: record `path[pos(successor)..]` followed by the
///   successor again,
/// - visited but off the stack → ignored.
///
/// # Reporting characteristics
///
/// Every back edge produces one report, so the same set of nodes can appear
/// in several overlapping reports, and a cycle that is only reachable through
/// an already-closed branch is never reported. Both behaviours are stable.
/// [`dedupe_cycles`] merges reports on request, and
/// [`super::cyclic_components`] lists every node that sits on some cycle.
use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::TransferGraph;
use super::components::component_labels;

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

/// A closed node sequence: the first and last entries are the same node.
///
/// A self-loop on `a` is represented as `[a, a]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cycle {
    nodes: Vec<NodeIndex>,
}

impl Cycle {
    /// Closes `open` by appending its first node.
    ///
    /// Returns `None` if `open` is empty.
    pub fn from_open(open: &[NodeIndex]) -> Option<Self> {
        let first = *open.first()?;
        let mut nodes = Vec::with_capacity(open.len() + 1);
        nodes.extend_from_slice(open);
        nodes.push(first);
        Some(Self { nodes })
    }

    /// The closed sequence, start node repeated at the end.
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    /// The open sequence: every member once, in traversal order.
    pub fn members(&self) -> &[NodeIndex] {
        &self.nodes[..self.nodes.len().saturating_sub(1)]
    }

    /// Number of hops (edges) around the cycle.
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// The node the cycle starts and ends at.
    pub fn start(&self) -> Option<NodeIndex> {
        self.nodes.first().copied()
    }

    /// Resolves the closed sequence to account identifiers.
    pub fn ids(&self, graph: &TransferGraph) -> Vec<String> {
        graph.ids_of(&self.nodes)
    }
}

// ---------------------------------------------------------------------------
// DetectConfig
// ---------------------------------------------------------------------------

/// Tuning knobs for [`detect_cycles`].
///
/// The defaults reproduce an unbounded, sequential run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Longest active path to explore. A node at this depth does not enter
    /// unvisited successors, but back edges from it are still recorded.
    /// `None` leaves exploration unbounded.
    pub max_depth: Option<usize>,
    /// Stop recording after this many cycles. In parallel mode the cap is
    /// applied per component and again to the merged list.
    ///
    /// [`detect_cycles`] caps raw reports. [`detect_distinct_cycles`] runs
    /// uncapped, deduplicates, and then caps, so the limit counts distinct
    /// cycles.
    pub max_cycles: Option<usize>,
    /// Run each weakly connected component on the rayon pool.
    pub parallel: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Detects cycles with the back-edge DFS described in the module docs.
///
/// Sequential runs are deterministic: identical graphs yield identical
/// output in identical order. Parallel runs yield the same multiset of
/// cycles, grouped by component (components ordered by their first root).
/// Returns an empty `Vec` for an empty or acyclic graph.
pub fn detect_cycles(graph: &TransferGraph, config: &DetectConfig) -> Vec<Cycle> {
    let cycles = if config.parallel {
        detect_by_component(graph, config)
    } else {
        let mut run = DfsRun::new(graph, config);
        run.explore_roots(graph.sources());
        run.finish()
    };
    debug!(
        roots = graph.sources().len(),
        cycles = cycles.len(),
        parallel = config.parallel,
        "cycle detection finished"
    );
    cycles
}

/// Rotates `cycle` so that its lexicographically smallest account id comes
/// first, then re-closes it.
///
/// Two reports of the same elementary cycle that start at different nodes
/// canonicalize to equal values.
pub fn canonicalize(cycle: &Cycle, graph: &TransferGraph) -> Cycle {
    let members = cycle.members();
    let pivot = members
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let a = graph.account_id(**a).unwrap_or_default();
            let b = graph.account_id(**b).unwrap_or_default();
            a.cmp(b)
        })
        .map_or(0, |(pos, _)| pos);

    let mut open: Vec<NodeIndex> = Vec::with_capacity(members.len());
    open.extend_from_slice(&members[pivot..]);
    open.extend_from_slice(&members[..pivot]);
    Cycle::from_open(&open).unwrap_or_else(|| cycle.clone())
}

/// Canonicalizes every cycle and keeps the first occurrence of each.
///
/// Output order follows the first occurrence in `cycles`. This is never run
/// implicitly by [`detect_cycles`].
pub fn dedupe_cycles(graph: &TransferGraph, cycles: Vec<Cycle>) -> Vec<Cycle> {
    let before = cycles.len();
    let mut seen: HashSet<Cycle> = HashSet::with_capacity(before);
    let mut kept = Vec::with_capacity(before);
    for cycle in cycles {
        let canonical = canonicalize(&cycle, graph);
        if seen.insert(canonical.clone()) {
            kept.push(canonical);
        }
    }
    debug!(before, after = kept.len(), "deduplicated cycles");
    kept
}

/// Detects cycles, collapses rotations, and then applies
/// [`DetectConfig::max_cycles`] to the distinct cycles.
pub fn detect_distinct_cycles(graph: &TransferGraph, config: &DetectConfig) -> Vec<Cycle> {
    let uncapped = DetectConfig {
        max_cycles: None,
        ..*config
    };
    dedupe_capped(graph, detect_cycles(graph, &uncapped), config.max_cycles)
}

fn dedupe_capped(graph: &TransferGraph, cycles: Vec<Cycle>, cap: Option<usize>) -> Vec<Cycle> {
    let mut kept = dedupe_cycles(graph, cycles);
    if let Some(cap) = cap {
        kept.truncate(cap);
    }
    kept
}

// ---------------------------------------------------------------------------
// Parallel driver
// ---------------------------------------------------------------------------

/// Partitions the roots by weakly connected component and runs one DFS per
/// component on the rayon pool.
///
/// Roots in different components never share `visited`/`on_stack` state, so
/// each component's output equals its share of a sequential run.
fn detect_by_component(graph: &TransferGraph, config: &DetectConfig) -> Vec<Cycle> {
    let labels = component_labels(graph);

    let mut groups: Vec<Vec<NodeIndex>> = Vec::new();
    let mut group_of_label: Vec<Option<usize>> = vec![None; labels.len()];
    for &root in graph.sources() {
        let Some(&label) = labels.get(root.index()) else {
            continue;
        };
        let Some(slot) = group_of_label.get_mut(label) else {
            continue;
        };
        let group = *slot.get_or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        if let Some(roots) = groups.get_mut(group) {
            roots.push(root);
        }
    }

    debug!(components = groups.len(), "detecting cycles per component");

    let per_component: Vec<Vec<Cycle>> = groups
        .par_iter()
        .map(|roots| {
            let mut run = DfsRun::new(graph, config);
            run.explore_roots(roots);
            run.finish()
        })
        .collect();

    let mut cycles: Vec<Cycle> = per_component.into_iter().flatten().collect();
    if let Some(cap) = config.max_cycles {
        cycles.truncate(cap);
    }
    cycles
}

// ---------------------------------------------------------------------------
// DFS state
// ---------------------------------------------------------------------------

/// State for one detection run over a set of roots.
struct DfsRun<'g> {
    graph: &'g TransferGraph,
    max_depth: Option<usize>,
    max_cycles: Option<usize>,
    visited: HashSet<NodeIndex>,
    on_stack: HashSet<NodeIndex>,
    path: Vec<NodeIndex>,
    cycles: Vec<Cycle>,
    truncated: bool,
}

impl<'g> DfsRun<'g> {
    fn new(graph: &'g TransferGraph, config: &DetectConfig) -> Self {
        Self {
            graph,
            max_depth: config.max_depth,
            max_cycles: config.max_cycles,
            visited: HashSet::new(),
            on_stack: HashSet::new(),
            path: Vec::new(),
            cycles: Vec::new(),
            truncated: false,
        }
    }

    fn explore_roots(&mut self, roots: &[NodeIndex]) {
        for &root in roots {
            if self.cap_reached() {
                break;
            }
            if !self.visited.contains(&root) {
                self.explore(root);
            }
        }
    }

    /// Runs the DFS from `root` to completion or until the cycle cap trips.
    fn explore(&mut self, root: NodeIndex) {
        // Frame: (node, position of the next successor to examine).
        let mut stack: Vec<(NodeIndex, usize)> = Vec::new();
        self.enter(root);
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let Some(&child) = self.graph.neighbours(node).get(frame.1) else {
                stack.pop();
                self.leave(node);
                continue;
            };
            frame.1 += 1;

            if !self.visited.contains(&child) {
                if self.at_depth_limit() {
                    self.note_truncation();
                    continue;
                }
                self.enter(child);
                stack.push((child, 0));
            } else if self.on_stack.contains(&child) {
                self.record_back_edge(child);
                if self.cap_reached() {
                    self.path.clear();
                    self.on_stack.clear();
                    return;
                }
            }
        }
    }

    fn enter(&mut self, node: NodeIndex) {
        self.visited.insert(node);
        self.on_stack.insert(node);
        self.path.push(node);
        debug_assert_eq!(self.path.len(), self.on_stack.len());
    }

    fn leave(&mut self, node: NodeIndex) {
        let popped = self.path.pop();
        debug_assert_eq!(popped, Some(node));
        self.on_stack.remove(&node);
        debug_assert_eq!(self.path.len(), self.on_stack.len());
    }

    fn record_back_edge(&mut self, target: NodeIndex) {
        if let Some(pos) = self.path.iter().position(|&n| n == target) {
            if let Some(cycle) = Cycle::from_open(&self.path[pos..]) {
                self.cycles.push(cycle);
            }
        }
    }

    fn at_depth_limit(&self) -> bool {
        self.max_depth.is_some_and(|limit| self.path.len() >= limit)
    }

    fn cap_reached(&self) -> bool {
        self.max_cycles
            .is_some_and(|cap| self.cycles.len() >= cap)
    }

    fn note_truncation(&mut self) {
        if !self.truncated {
            self.truncated = true;
            warn!(
                max_depth = self.max_depth,
                "exploration depth limit reached, some cycles may be unreported"
            );
        }
    }

    fn finish(self) -> Vec<Cycle> {
        self.cycles
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::graph::build_graph;
    use crate::test_helpers::{cycle_ids, edge, edges};

    fn detect(pairs: &[(&str, &str)]) -> Vec<Vec<String>> {
        let g = build_graph(&edges(pairs), &[]);
        detect_cycles(&g, &DetectConfig::default())
            .iter()
            .map(|c| c.ids(&g))
            .collect()
    }

    #[test]
    fn empty_graph_has_no_cycles() {
        let g = build_graph(&[], &[]);
        assert!(detect_cycles(&g, &DetectConfig::default()).is_empty());
    }

    #[test]
    fn triangle_is_reported_in_traversal_order() {
        assert_eq!(
            detect(&[("A", "B"), ("B", "C"), ("C", "A")]),
            vec![vec!["A", "B", "C", "A"]]
        );
    }

    #[test]
    fn self_loop_is_length_one_cycle() {
        let g = build_graph(&[edge("A", "A", 1.0)], &[]);
        let cycles = detect_cycles(&g, &DetectConfig::default());
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].hops(), 1);
        assert_eq!(cycle_ids(&g, &cycles[0]), vec!["A", "A"]);
    }

    #[test]
    fn dag_has_no_cycles_in_any_edge_order() {
        let orders: [&[(&str, &str)]; 3] = [
            &[("A", "B"), ("B", "C"), ("A", "C")],
            &[("A", "C"), ("B", "C"), ("A", "B")],
            &[("B", "C"), ("A", "C"), ("A", "B")],
        ];
        for order in orders {
            assert!(detect(order).is_empty(), "order {order:?}");
        }
    }

    #[test]
    fn parallel_edges_do_not_duplicate_reports() {
        assert_eq!(
            detect(&[("A", "B"), ("A", "B"), ("B", "A"), ("B", "A")]),
            vec![vec!["A", "B", "A"]]
        );
    }

    #[test]
    fn every_back_edge_produces_a_report() {
        // A→B→C→A and C→B: two back edges from C, two reports.
        assert_eq!(
            detect(&[("A", "B"), ("B", "C"), ("C", "A"), ("C", "B")]),
            vec![vec!["A", "B", "C", "A"], vec!["B", "C", "B"]]
        );
    }

    #[test]
    fn overlapping_cycles_each_reported_per_back_edge() {
        // A→B, B→A, B→C, C→B, C→A: three back edges, three overlapping
        // reports sharing node B.
        let found = detect(&[("A", "B"), ("B", "A"), ("B", "C"), ("C", "B"), ("C", "A")]);
        assert_eq!(
            found,
            vec![
                vec!["A", "B", "A"],
                vec!["B", "C", "B"],
                vec!["A", "B", "C", "A"],
            ]
        );
    }

    #[test]
    fn cross_edge_into_closed_branch_is_not_re_examined() {
        // A→B, A→C, C→B, B→D, D→B. B's subtree closes the B-D cycle before
        // C is explored; the C→B cross edge yields nothing new.
        let found = detect(&[("A", "B"), ("A", "C"), ("C", "B"), ("B", "D"), ("D", "B")]);
        assert_eq!(found, vec![vec!["B", "D", "B"]]);
    }

    #[test]
    fn late_entered_node_closes_cycle_into_stack() {
        // B is entered below D while C and D are still on the stack, so the
        // B→C back edge reports the longer loop.
        let found = detect(&[
            ("A", "C"),
            ("A", "B"),
            ("C", "D"),
            ("D", "C"),
            ("D", "B"),
            ("B", "C"),
        ]);
        assert_eq!(found, vec![vec!["C", "D", "C"], vec!["C", "D", "B", "C"]]);
    }

    #[test]
    fn cycle_through_closed_branch_is_missed() {
        // A→B→A closes B before C is explored. A→C→B→A is elementary but
        // C→B is a cross edge, so it is never reported.
        let found = detect(&[("A", "B"), ("B", "A"), ("A", "C"), ("C", "B")]);
        assert_eq!(found, vec![vec!["A", "B", "A"]]);
    }

    #[test]
    fn disjoint_components_are_both_reported_independently() {
        let both = detect(&[("A", "B"), ("B", "A"), ("X", "Y"), ("Y", "Z"), ("Z", "X")]);
        assert_eq!(
            both,
            vec![vec!["A", "B", "A"], vec!["X", "Y", "Z", "X"]]
        );
        let only_second = detect(&[("X", "Y"), ("Y", "Z"), ("Z", "X")]);
        assert_eq!(only_second, vec![vec!["X", "Y", "Z", "X"]]);
    }

    #[test]
    fn rerun_yields_identical_output() {
        let g = build_graph(
            &edges(&[("A", "B"), ("B", "C"), ("C", "A"), ("C", "B"), ("D", "A")]),
            &[],
        );
        let config = DetectConfig::default();
        assert_eq!(detect_cycles(&g, &config), detect_cycles(&g, &config));
    }

    #[test]
    fn max_depth_truncates_exploration() {
        let g = build_graph(
            &edges(&[("A", "B"), ("B", "C"), ("C", "D"), ("D", "A"), ("B", "A")]),
            &[],
        );
        let bounded = DetectConfig {
            max_depth: Some(2),
            ..DetectConfig::default()
        };
        let ids: Vec<Vec<String>> = detect_cycles(&g, &bounded)
            .iter()
            .map(|c| c.ids(&g))
            .collect();
        // The 4-cycle needs a path of length 4; only the 2-cycle fits.
        assert_eq!(ids, vec![vec!["A", "B", "A"]]);

        let unbounded: Vec<Vec<String>> = detect_cycles(&g, &DetectConfig::default())
            .iter()
            .map(|c| c.ids(&g))
            .collect();
        assert_eq!(
            unbounded,
            vec![vec!["A", "B", "C", "D", "A"], vec!["A", "B", "A"]]
        );
    }

    #[test]
    fn max_cycles_caps_output() {
        let g = build_graph(
            &edges(&[("A", "A"), ("B", "B"), ("C", "C"), ("D", "D")]),
            &[],
        );
        let capped = DetectConfig {
            max_cycles: Some(2),
            ..DetectConfig::default()
        };
        let ids: Vec<Vec<String>> = detect_cycles(&g, &capped)
            .iter()
            .map(|c| c.ids(&g))
            .collect();
        assert_eq!(ids, vec![vec!["A", "A"], vec!["B", "B"]]);
    }

    #[test]
    fn parallel_run_matches_sequential_multiset() {
        let g = build_graph(
            &edges(&[
                ("A", "B"),
                ("X", "Y"),
                ("B", "A"),
                ("Y", "X"),
                ("P", "P"),
                ("B", "C"),
                ("C", "A"),
                ("Y", "Q"),
            ]),
            &[],
        );
        let mut sequential = detect_cycles(&g, &DetectConfig::default());
        let mut parallel = detect_cycles(
            &g,
            &DetectConfig {
                parallel: true,
                ..DetectConfig::default()
            },
        );
        let key = |c: &Cycle| c.nodes().to_vec();
        sequential.sort_by_key(key);
        parallel.sort_by_key(key);
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.len(), 4);
    }

    #[test]
    fn canonicalize_rotates_to_smallest_id() {
        let g = build_graph(&edges(&[("C", "A"), ("A", "B"), ("B", "C")]), &[]);
        let cycles = detect_cycles(&g, &DetectConfig::default());
        assert_eq!(cycle_ids(&g, &cycles[0]), vec!["C", "A", "B", "C"]);
        let canonical = canonicalize(&cycles[0], &g);
        assert_eq!(cycle_ids(&g, &canonical), vec!["A", "B", "C", "A"]);
    }

    #[test]
    fn canonicalize_keeps_self_loop() {
        let g = build_graph(&[edge("A", "A", 1.0)], &[]);
        let cycles = detect_cycles(&g, &DetectConfig::default());
        assert_eq!(canonicalize(&cycles[0], &g), cycles[0]);
    }

    #[test]
    fn dedupe_collapses_rotations_and_keeps_order() {
        let g = build_graph(&edges(&[("A", "B"), ("B", "C"), ("C", "A")]), &[]);
        let a = g.node_index("A").expect("A");
        let b = g.node_index("B").expect("B");
        let c = g.node_index("C").expect("C");
        let rotations = vec![
            Cycle::from_open(&[b, c, a]).expect("non-empty"),
            Cycle::from_open(&[a, b]).expect("non-empty"),
            Cycle::from_open(&[c, a, b]).expect("non-empty"),
            Cycle::from_open(&[a, b, c]).expect("non-empty"),
        ];
        let kept: Vec<Vec<String>> = dedupe_cycles(&g, rotations)
            .iter()
            .map(|c| c.ids(&g))
            .collect();
        assert_eq!(kept, vec![vec!["A", "B", "C", "A"], vec!["A", "B", "A"]]);
    }

    #[test]
    fn cap_counts_distinct_cycles() {
        let g = build_graph(&edges(&[("A", "B"), ("B", "C"), ("C", "A")]), &[]);
        let a = g.node_index("A").expect("A");
        let b = g.node_index("B").expect("B");
        let c = g.node_index("C").expect("C");
        let reports = vec![
            Cycle::from_open(&[b, c, a]).expect("non-empty"),
            Cycle::from_open(&[c, a, b]).expect("non-empty"),
            Cycle::from_open(&[a, b]).expect("non-empty"),
            Cycle::from_open(&[b, c]).expect("non-empty"),
        ];
        let kept: Vec<Vec<String>> = dedupe_capped(&g, reports, Some(2))
            .iter()
            .map(|c| c.ids(&g))
            .collect();
        assert_eq!(kept, vec![vec!["A", "B", "C", "A"], vec!["A", "B", "A"]]);
    }

    #[test]
    fn distinct_detection_honors_cap() {
        let g = build_graph(
            &edges(&[("A", "B"), ("B", "A"), ("C", "D"), ("D", "C"), ("E", "F"), ("F", "E")]),
            &[],
        );
        let config = DetectConfig {
            max_cycles: Some(2),
            ..DetectConfig::default()
        };
        let capped = detect_distinct_cycles(&g, &config);
        let all = detect_distinct_cycles(&g, &DetectConfig::default());
        assert_eq!(all.len(), 3);
        assert_eq!(capped, all[..2].to_vec());
    }

    #[test]
    fn cycle_accessors() {
        let open = [NodeIndex::new(2), NodeIndex::new(5)];
        let cycle = Cycle::from_open(&open).expect("non-empty");
        assert_eq!(cycle.nodes().len(), 3);
        assert_eq!(cycle.members(), &open);
        assert_eq!(cycle.hops(), 2);
        assert_eq!(cycle.start(), Some(NodeIndex::new(2)));
        assert!(Cycle::from_open(&[]).is_none());
    }
}

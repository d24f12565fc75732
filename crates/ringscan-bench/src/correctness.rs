//! Post-operation invariant checkers for correctness validation.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use ringscan_core::{AnalysisReport, Classification, Cycle, RiskConfig, TransferGraph};

use crate::TransferNetwork;

/// Verifies graph construction invariants against the generated records.
pub fn check_graph_invariants(network: &TransferNetwork, graph: &TransferGraph) -> Result<(), String> {
    if graph.transfer_count() != network.transfers.len() {
        return Err(format!(
            "transfer count mismatch: graph={}, network={}",
            graph.transfer_count(),
            network.transfers.len()
        ));
    }
    let mut ids: HashSet<&str> = HashSet::new();
    for t in &network.transfers {
        ids.insert(&t.from);
        ids.insert(&t.to);
    }
    for a in &network.accounts {
        ids.insert(&a.id);
    }
    if graph.node_count() != ids.len() {
        return Err(format!(
            "node count mismatch: graph={}, distinct ids={}",
            graph.node_count(),
            ids.len()
        ));
    }
    for id in ids {
        if graph.node_index(id).is_none() {
            return Err(format!("account {id} not found in graph index"));
        }
    }
    if graph.distinct_edge_count() > graph.transfer_count() {
        return Err("more distinct pairs than transfers".to_owned());
    }
    Ok(())
}

/// Verifies that a reported cycle is closed, has distinct members, and that
/// each consecutive pair is joined by a transfer.
pub fn check_cycle(graph: &TransferGraph, cycle: &Cycle) -> Result<(), String> {
    let nodes = cycle.nodes();
    if nodes.len() < 2 {
        return Err(format!("cycle too short: {} nodes", nodes.len()));
    }
    if nodes.first() != nodes.last() {
        return Err("cycle is not closed".to_owned());
    }
    let members = cycle.members();
    let unique: HashSet<&NodeIndex> = members.iter().collect();
    if unique.len() != members.len() {
        return Err("cycle repeats an account".to_owned());
    }
    for pair in nodes.windows(2) {
        if let [from, to] = pair {
            if graph.pair_weight(*from, *to).is_none() {
                return Err(format!(
                    "no transfer between {} and {}",
                    graph.account_id(*from).unwrap_or("?"),
                    graph.account_id(*to).unwrap_or("?")
                ));
            }
        }
    }
    Ok(())
}

/// Verifies that every planted ring lies inside one cyclic component.
pub fn check_rings_in_cyclic_components(
    network: &TransferNetwork,
    graph: &TransferGraph,
    components: &[Vec<NodeIndex>],
) -> Result<(), String> {
    let mut component_of = vec![None; graph.node_count()];
    for (c, members) in components.iter().enumerate() {
        for node in members {
            if let Some(slot) = component_of.get_mut(node.index()) {
                *slot = Some(c);
            }
        }
    }

    for (r, ring) in network.rings.iter().enumerate() {
        let mut seen: Option<usize> = None;
        for id in ring {
            let idx = graph
                .node_index(id)
                .ok_or_else(|| format!("ring {r}: account {id} missing from graph"))?;
            let Some(c) = component_of.get(idx.index()).copied().flatten() else {
                return Err(format!("ring {r}: account {id} is in no cyclic component"));
            };
            match seen {
                Some(prev) if prev != c => {
                    return Err(format!("ring {r} spans several components"));
                }
                Some(_) => {}
                None => seen = Some(c),
            }
        }
    }
    Ok(())
}

/// Verifies that the report agrees with the cycles it was built from and
/// with the threshold rule.
pub fn check_report(
    report: &AnalysisReport,
    cycles: &[Cycle],
    graph: &TransferGraph,
    config: &RiskConfig,
) -> Result<(), String> {
    if report.cycle_count() != cycles.len() {
        return Err(format!(
            "report has {} findings for {} cycles",
            report.cycle_count(),
            cycles.len()
        ));
    }
    for (finding, cycle) in report.cycles.iter().zip(cycles) {
        if finding.path != cycle.ids(graph) {
            return Err(format!("finding path {:?} does not match cycle", finding.path));
        }
        if finding.hops != cycle.hops() {
            return Err(format!("hops mismatch on {:?}", finding.path));
        }
        let expected = config.classify(finding.average_risk);
        if finding.classification != expected {
            return Err(format!(
                "{:?} classified {} but average {:?} implies {expected}",
                finding.path, finding.classification, finding.average_risk
            ));
        }
        if finding.average_risk.is_none() && finding.classification == Classification::HighRisk {
            return Err("unscored cycle classified HIGH_RISK".to_owned());
        }
        if let Some(avg) = finding.average_risk {
            if !(0.0..=1.0).contains(&avg) {
                return Err(format!("average risk {avg} out of range"));
            }
        }
    }

    let summary = &report.summary;
    if summary.total_nodes != graph.scored_account_count() {
        return Err("summary node count differs from scored accounts".to_owned());
    }
    if summary.total_edges != graph.distinct_edge_count() {
        return Err("summary edge count differs from distinct pairs".to_owned());
    }
    if summary.high_risk_node_count > summary.total_nodes {
        return Err("more high-risk accounts than scored accounts".to_owned());
    }
    Ok(())
}

/// Verifies that two cycle lists hold the same multiset of id paths.
pub fn check_same_multiset(
    graph: &TransferGraph,
    left: &[Cycle],
    right: &[Cycle],
) -> Result<(), String> {
    let mut a: Vec<Vec<String>> = left.iter().map(|c| c.ids(graph)).collect();
    let mut b: Vec<Vec<String>> = right.iter().map(|c| c.ids(graph)).collect();
    a.sort();
    b.sort();
    if a != b {
        return Err(format!("cycle multisets differ: {} vs {}", a.len(), b.len()));
    }
    Ok(())
}

/// Risk aggregation over detected cycles and the whole network.
///
/// [`summarize`] turns a list of [`Cycle`]s into a [`AnalysisReport`]:
/// one [`CycleFinding`] per cycle plus a [`NetworkSummary`] computed in a
/// single pass over the account and transfer tables.
///
/// # Averages
///
/// A cycle's `average_risk` is the mean score over its *distinct* members
/// that carry a score. Members without a score are left out of both the sum
/// and the count; a cycle with no scored member has `average_risk: None`
/// rather than a silent zero, and is classified [`Classification::Monitor`].
///
/// # Threshold
///
/// Classification is strictly greater-than: an average of exactly the
/// threshold is [`Classification::Monitor`].
use std::collections::HashSet;
use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{Cycle, TransferGraph};

/// Default cut-off above which a cycle or account counts as high risk.
pub const DEFAULT_HIGH_RISK_THRESHOLD: f64 = 0.7;

// ---------------------------------------------------------------------------
// RiskConfig
// ---------------------------------------------------------------------------

/// Classification settings for the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Scores strictly above this value are high risk.
    pub high_risk_threshold: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_risk_threshold: DEFAULT_HIGH_RISK_THRESHOLD,
        }
    }
}

impl RiskConfig {
    /// Creates a config with the given threshold.
    pub fn with_threshold(high_risk_threshold: f64) -> Self {
        Self {
            high_risk_threshold,
        }
    }

    /// Returns `true` if `score` is strictly above the threshold.
    pub fn is_high_risk(&self, score: f64) -> bool {
        score > self.high_risk_threshold
    }

    /// Classifies an average score. `None` (no data) is never high risk.
    pub fn classify(&self, average: Option<f64>) -> Classification {
        match average {
            Some(score) if self.is_high_risk(score) => Classification::HighRisk,
            Some(_) | None => Classification::Monitor,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Severity bucket for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Average risk above the threshold: investigate.
    HighRisk,
    /// Everything else, including cycles without risk data.
    Monitor,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::HighRisk => f.write_str("HIGH_RISK"),
            Classification::Monitor => f.write_str("MONITOR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Metrics for one detected cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleFinding {
    /// Closed account sequence; the first id is repeated at the end.
    pub path: Vec<String>,
    /// Number of transfers around the cycle.
    pub hops: usize,
    /// Mean risk over distinct scored members, `None` when no member is scored.
    pub average_risk: Option<f64>,
    /// Number of distinct members that carry a score.
    pub scored_nodes: usize,
    /// Sum over consecutive pairs of all transfer amounts between them.
    pub total_weight: f64,
    /// Severity bucket.
    pub classification: Classification,
}

impl CycleFinding {
    /// Returns `true` if at least one member has a risk score.
    pub fn has_risk_data(&self) -> bool {
        self.average_risk.is_some()
    }
}

/// Network-wide counts, independent of cycle detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSummary {
    /// Number of accounts in the risk table.
    pub total_nodes: usize,
    /// Number of distinct ordered `(source, target)` transfer pairs.
    pub total_edges: usize,
    /// Accounts whose risk is strictly above the threshold.
    pub high_risk_node_count: usize,
    /// Number of transfers, counting parallel transfers separately.
    pub total_transfers: usize,
    /// Sum of every transfer amount.
    pub total_amount: f64,
}

/// Structured result of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// One entry per reported cycle, in detection order.
    pub cycles: Vec<CycleFinding>,
    /// Network-wide counts.
    pub summary: NetworkSummary,
}

impl AnalysisReport {
    /// Number of reported cycles.
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    /// Number of cycles classified [`Classification::HighRisk`].
    pub fn high_risk_cycle_count(&self) -> usize {
        self.cycles
            .iter()
            .filter(|c| c.classification == Classification::HighRisk)
            .count()
    }

    /// Returns `true` if any cycle is high risk.
    pub fn has_high_risk(&self) -> bool {
        self.high_risk_cycle_count() > 0
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Computes per-cycle findings and the network summary.
pub fn summarize(cycles: &[Cycle], graph: &TransferGraph, config: &RiskConfig) -> AnalysisReport {
    let findings: Vec<CycleFinding> = cycles
        .iter()
        .map(|cycle| assess_cycle(cycle, graph, config))
        .collect();
    let summary = network_summary(graph, config);

    let report = AnalysisReport {
        cycles: findings,
        summary,
    };
    debug!(
        cycles = report.cycle_count(),
        high_risk_cycles = report.high_risk_cycle_count(),
        high_risk_accounts = report.summary.high_risk_node_count,
        "risk aggregation finished"
    );
    report
}

/// Computes the metrics for one cycle.
pub fn assess_cycle(cycle: &Cycle, graph: &TransferGraph, config: &RiskConfig) -> CycleFinding {
    let average_risk_and_count = average_risk(cycle.members(), graph);
    let (average_risk, scored_nodes) = match average_risk_and_count {
        Some((avg, n)) => (Some(avg), n),
        None => (None, 0),
    };

    let total_weight = cycle
        .nodes()
        .windows(2)
        .filter_map(|pair| match pair {
            [from, to] => graph.pair_weight(*from, *to),
            _ => None,
        })
        .sum();

    CycleFinding {
        path: cycle.ids(graph),
        hops: cycle.hops(),
        average_risk,
        scored_nodes,
        total_weight,
        classification: config.classify(average_risk),
    }
}

/// Mean risk over distinct scored members and the number of scored members.
fn average_risk(members: &[NodeIndex], graph: &TransferGraph) -> Option<(f64, usize)> {
    let mut seen: HashSet<NodeIndex> = HashSet::with_capacity(members.len());
    let mut sum = 0.0;
    let mut count = 0usize;
    for &member in members {
        if !seen.insert(member) {
            continue;
        }
        if let Some(score) = graph.risk(member) {
            sum += score;
            count += 1;
        }
    }
    (count > 0).then(|| (sum / count as f64, count))
}

/// Computes the network summary in one pass over the account table.
pub fn network_summary(graph: &TransferGraph, config: &RiskConfig) -> NetworkSummary {
    let high_risk_node_count = graph
        .node_indices()
        .filter_map(|n| graph.risk(n))
        .filter(|&score| config.is_high_risk(score))
        .count();

    NetworkSummary {
        total_nodes: graph.scored_account_count(),
        total_edges: graph.distinct_edge_count(),
        high_risk_node_count,
        total_transfers: graph.transfer_count(),
        total_amount: graph.total_amount(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

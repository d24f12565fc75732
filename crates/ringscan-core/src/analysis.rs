/// End-to-end analysis pipeline.
///
/// [`analyze`] runs the full sequence on in-memory records:
///
/// 1. Validate every transfer and risk record, applying the configured
///    [`RiskPolicy`].
/// 2. Build the [`TransferGraph`].
/// 3. Detect cycles.
/// 4. Deduplicate rotations, if [`AnalysisConfig::dedupe`] is set.
/// 5. Aggregate risk into an [`AnalysisReport`].
///
/// Callers that already hold a graph (for example to run several views over
/// one snapshot) use [`build_validated_graph`] once and [`analyze_graph`] per
/// run.
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::graph::{DetectConfig, TransferGraph, build_graph, detect_cycles, detect_distinct_cycles};
use crate::records::{EdgeRecord, RecordError, RiskPolicy, RiskRecord};
use crate::risk::{AnalysisReport, RiskConfig, summarize};

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Configuration for a full analysis run.
///
/// Every field has a default, so a partial TOML or JSON document
/// deserializes cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Classification threshold.
    pub risk: RiskConfig,
    /// Detector guards and parallelism.
    pub detect: DetectConfig,
    /// Handling of out-of-range risk scores.
    pub risk_policy: RiskPolicy,
    /// Collapse rotations of the same cycle before aggregation.
    ///
    /// Default: `false`.
    pub dedupe: bool,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Validates records and builds the graph.
///
/// # Errors
///
/// The first [`RecordError`] found, transfers checked before risk records.
pub fn build_validated_graph(
    edges: &[EdgeRecord],
    risks: &[RiskRecord],
    policy: RiskPolicy,
) -> Result<TransferGraph, RecordError> {
    for (index, edge) in edges.iter().enumerate() {
        edge.validate(index)?;
    }
    let risks: Vec<RiskRecord> = risks
        .iter()
        .enumerate()
        .map(|(index, record)| record.clone().validate(index, policy))
        .collect::<Result<_, _>>()?;
    Ok(build_graph(edges, &risks))
}

/// Detects, optionally deduplicates, and summarizes cycles on a built graph.
pub fn analyze_graph(graph: &TransferGraph, config: &AnalysisConfig) -> AnalysisReport {
    let cycles = if config.dedupe {
        detect_distinct_cycles(graph, &config.detect)
    } else {
        detect_cycles(graph, &config.detect)
    };
    summarize(&cycles, graph, &config.risk)
}

/// Runs the whole pipeline.
///
/// # Errors
///
/// [`RecordError`] if any input record is malformed or carries an invalid
/// risk score. No partial report is produced.
pub fn analyze(
    edges: &[EdgeRecord],
    risks: &[RiskRecord],
    config: &AnalysisConfig,
) -> Result<AnalysisReport, RecordError> {
    let span = info_span!("analyze", transfers = edges.len(), accounts = risks.len());
    let _guard = span.enter();

    let graph = build_validated_graph(edges, risks, config.risk_policy)?;
    let report = analyze_graph(&graph, config);

    info!(
        cycles = report.cycle_count(),
        high_risk_cycles = report.high_risk_cycle_count(),
        high_risk_accounts = report.summary.high_risk_node_count,
        "analysis complete"
    );
    Ok(report)
}

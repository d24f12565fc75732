#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod accounts;
pub mod analysis;
pub mod graph;
pub mod records;
pub mod risk;
pub mod union_find;

#[cfg(test)]
mod test_helpers;

pub use accounts::{AccountFlow, RiskyAccount, account_flows, high_risk_accounts};
pub use analysis::{AnalysisConfig, analyze, analyze_graph, build_validated_graph};
pub use graph::{
    Cycle, DetectConfig, EdgeWeight, NodeWeight, TransferGraph, build_graph, canonicalize,
    cyclic_components, dedupe_cycles, detect_cycles, detect_distinct_cycles, fixed_length_cycles,
    weak_components,
};
pub use records::{
    EdgeRecord, RawEdgeRecord, RawRiskRecord, RecordError, RecordKind, RiskPolicy, RiskRecord,
    convert_edges, convert_risks,
};
pub use risk::{
    AnalysisReport, Classification, CycleFinding, DEFAULT_HIGH_RISK_THRESHOLD, NetworkSummary,
    RiskConfig, assess_cycle, network_summary, summarize,
};
pub use union_find::UnionFind;

/// Returns the current version of the ringscan-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

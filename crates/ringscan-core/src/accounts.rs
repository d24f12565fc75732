//! Per-account views over a [`TransferGraph`].
//!
//! [`account_flows`] reports transfer counts and sums in each direction for
//! every account that sends or receives money. [`high_risk_accounts`] lists
//! the accounts whose score is above the configured threshold.

use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::graph::TransferGraph;
use crate::risk::RiskConfig;

/// Transfer activity for one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountFlow {
    pub account_id: String,
    /// Number of outgoing transfers, parallel transfers counted separately.
    pub outgoing_count: usize,
    pub outgoing_total: f64,
    /// Number of incoming transfers, parallel transfers counted separately.
    pub incoming_count: usize,
    pub incoming_total: f64,
}

impl AccountFlow {
    /// Incoming minus outgoing amount.
    pub fn net_flow(&self) -> f64 {
        self.incoming_total - self.outgoing_total
    }
}

/// An account whose score is above the high-risk threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskyAccount {
    pub account_id: String,
    pub risk: f64,
}

/// Aggregates transfers per account.
///
/// Accounts that appear only in the risk table have no transfers and are
/// left out. The result is ordered by `outgoing_total` descending, ties
/// broken by account id.
pub fn account_flows(graph: &TransferGraph) -> Vec<AccountFlow> {
    let mut flows: Vec<Option<AccountFlow>> = vec![None; graph.node_count()];
    let g = graph.graph();

    for edge in g.edge_indices() {
        let (Some((source, target)), Some(weight)) = (g.edge_endpoints(edge), g.edge_weight(edge))
        else {
            continue;
        };
        if let Some(flow) = flow_slot(&mut flows, graph, source.index()) {
            flow.outgoing_count += 1;
            flow.outgoing_total += weight.amount;
        }
        if let Some(flow) = flow_slot(&mut flows, graph, target.index()) {
            flow.incoming_count += 1;
            flow.incoming_total += weight.amount;
        }
    }

    let mut flows: Vec<AccountFlow> = flows.into_iter().flatten().collect();
    flows.sort_by(|a, b| {
        b.outgoing_total
            .total_cmp(&a.outgoing_total)
            .then_with(|| a.account_id.cmp(&b.account_id))
    });
    flows
}

fn flow_slot<'a>(
    flows: &'a mut [Option<AccountFlow>],
    graph: &TransferGraph,
    position: usize,
) -> Option<&'a mut AccountFlow> {
    let slot = flows.get_mut(position)?;
    if slot.is_none() {
        let account_id = graph.account_id(NodeIndex::new(position))?.to_owned();
        *slot = Some(AccountFlow {
            account_id,
            outgoing_count: 0,
            outgoing_total: 0.0,
            incoming_count: 0,
            incoming_total: 0.0,
        });
    }
    slot.as_mut()
}

/// Lists accounts scored strictly above the threshold, highest first.
///
/// Ties are broken by account id.
pub fn high_risk_accounts(graph: &TransferGraph, config: &RiskConfig) -> Vec<RiskyAccount> {
    let mut risky: Vec<RiskyAccount> = graph
        .node_indices()
        .filter_map(|n| {
            let risk = graph.risk(n)?;
            if !config.is_high_risk(risk) {
                return None;
            }
            Some(RiskyAccount {
                account_id: graph.account_id(n)?.to_owned(),
                risk,
            })
        })
        .collect();
    risky.sort_by(|a, b| {
        b.risk
            .total_cmp(&a.risk)
            .then_with(|| a.account_id.cmp(&b.account_id))
    });
    risky
}

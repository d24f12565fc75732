//! The JSON transfer document accepted on the command line.
//!
//! ```json
//! {
//!   "transfers": [{"from": "A", "to": "B", "amount": 100.0, "transaction_id": "t-1"}],
//!   "accounts":  [{"account_id": "A", "risk_score": 0.9}]
//! }
//! ```
//!
//! `edges` and `nodes` are accepted for the two top-level arrays, and each
//! record accepts the aliases documented on [`RawEdgeRecord`] and
//! [`RawRiskRecord`]. Either array may be omitted.
use ringscan_core::{
    EdgeRecord, RawEdgeRecord, RawRiskRecord, RiskPolicy, RiskRecord, convert_edges,
    convert_risks,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::CliError;

#[derive(Debug, Default, Deserialize)]
struct InputDocument {
    #[serde(default, alias = "edges")]
    transfers: Vec<RawEdgeRecord>,
    #[serde(default, alias = "nodes")]
    accounts: Vec<RawRiskRecord>,
}

/// Checked records parsed from one transfer document.
#[derive(Debug, Clone)]
pub struct Records {
    pub transfers: Vec<EdgeRecord>,
    pub accounts: Vec<RiskRecord>,
}

/// Parses `content` and converts every record, applying `policy` to scores.
///
/// # Errors
///
/// - [`CliError::ParseFailed`] if `content` is not a JSON object of the
///   expected shape.
/// - [`CliError::InvalidRecord`] for the first incomplete or out-of-range
///   record.
pub fn parse_records(content: &str, policy: RiskPolicy) -> Result<Records, CliError> {
    let doc: InputDocument = serde_json::from_str(content).map_err(|e| CliError::ParseFailed {
        detail: format!("line {}, column {}: {e}", e.line(), e.column()),
    })?;

    let transfers = convert_edges(doc.transfers)?;
    let accounts = convert_risks(doc.accounts, policy)?;
    debug!(
        transfers = transfers.len(),
        accounts = accounts.len(),
        "parsed transfer document"
    );
    Ok(Records {
        transfers,
        accounts,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::wildcard_enum_match_arm)]

    use ringscan_core::{RecordError, RecordKind};

    use super::*;

    #[test]
    fn parses_canonical_document() {
        let records = parse_records(
            r#"{
                "transfers": [{"from": "A", "to": "B", "amount": 10.5, "transaction_id": "t-1"}],
                "accounts": [{"account_id": "A", "risk_score": 0.4}]
            }"#,
            RiskPolicy::Reject,
        )
        .expect("valid document");
        assert_eq!(
            records.transfers,
            vec![EdgeRecord::new("A", "B", 10.5).with_label("t-1")]
        );
        assert_eq!(records.accounts, vec![RiskRecord::new("A", 0.4)]);
    }

    #[test]
    fn accepts_edge_and_node_spellings() {
        let records = parse_records(
            r#"{"edges": [{"source": "A", "target": "B", "weight": 1}], "nodes": [{"id": "B", "risk": 1}]}"#,
            RiskPolicy::Reject,
        )
        .expect("valid document");
        assert_eq!(records.transfers.len(), 1);
        assert_eq!(records.accounts[0].risk, 1.0);
    }

    #[test]
    fn missing_arrays_default_to_empty() {
        let records = parse_records("{}", RiskPolicy::Reject).expect("empty document");
        assert!(records.transfers.is_empty());
        assert!(records.accounts.is_empty());
    }

    #[test]
    fn syntax_error_reports_position() {
        let err = parse_records("{\n  \"transfers\": [,]\n}", RiskPolicy::Reject)
            .expect_err("bad JSON");
        match err {
            CliError::ParseFailed { detail } => assert!(detail.contains("line 2"), "{detail}"),
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn incomplete_transfer_is_invalid_record() {
        let err = parse_records(
            r#"{"transfers": [{"from": "A", "to": "B", "amount": 1}, {"from": "B", "amount": 2}]}"#,
            RiskPolicy::Reject,
        )
        .expect_err("missing target");
        match err {
            CliError::InvalidRecord(RecordError::MalformedRecord { kind, index, field }) => {
                assert_eq!(kind, RecordKind::Edge);
                assert_eq!(index, 1);
                assert_eq!(field, "to");
            }
            other => panic!("expected InvalidRecord, got {other:?}"),
        }
    }

    #[test]
    fn clamp_policy_applies_to_scores() {
        let records = parse_records(
            r#"{"accounts": [{"account_id": "A", "risk_score": 1.7}]}"#,
            RiskPolicy::Clamp,
        )
        .expect("clamped");
        assert_eq!(records.accounts[0].risk, 1.0);
    }
}

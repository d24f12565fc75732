//! Implementation of `ringscan flows <file>`.
//!
//! Per-account transfer activity: how many transfers each account sent and
//! received, and their totals, ordered by total sent (largest first).
//!
//! Output (human mode): an aligned table with a header row.
//! Output (JSON mode): `{"accounts": [{account_id, outgoing_count, ...}], "count": N}`.
//!
//! Exit codes: 0 = success, 2 = input failure.
use std::io::Write;

use ringscan_core::{AccountFlow, AnalysisConfig, account_flows};
use serde::Serialize;

use crate::OutputFormat;
use crate::cmd::load_graph;
use crate::error::CliError;
use crate::format::{amount, emit, write_json};

#[derive(Serialize)]
struct FlowList<'a> {
    accounts: &'a [AccountFlow],
    count: usize,
}

/// Runs the `flows` command.
///
/// `limit` keeps only the first N accounts of the ordered listing.
///
/// # Errors
///
/// [`CliError`] exit code 2 if the content cannot be parsed or a record is
/// invalid.
pub fn run(
    content: &str,
    config: &AnalysisConfig,
    limit: Option<usize>,
    format: &OutputFormat,
) -> Result<(), CliError> {
    let graph = load_graph(content, config)?;
    let mut flows = account_flows(&graph);
    if let Some(n) = limit {
        flows.truncate(n);
    }

    emit(|out| match format {
        OutputFormat::Human => print_human(out, &flows),
        OutputFormat::Json => write_json(
            out,
            &FlowList {
                accounts: &flows,
                count: flows.len(),
            },
        ),
    })
}

fn print_human<W: Write>(w: &mut W, flows: &[AccountFlow]) -> std::io::Result<()> {
    if flows.is_empty() {
        return Ok(());
    }
    let width = flows
        .iter()
        .map(|f| f.account_id.len())
        .max()
        .unwrap_or(0)
        .max("account".len());

    writeln!(
        w,
        "{:<width$}  {:>6}  {:>14}  {:>6}  {:>14}  {:>14}",
        "account", "sent", "sent_total", "recv", "recv_total", "net"
    )?;
    for f in flows {
        writeln!(
            w,
            "{:<width$}  {:>6}  {:>14}  {:>6}  {:>14}  {:>14}",
            f.account_id,
            f.outgoing_count,
            amount(f.outgoing_total),
            f.incoming_count,
            amount(f.incoming_total),
            amount(f.net_flow()),
        )?;
    }
    Ok(())
}

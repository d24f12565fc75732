//! Implementation of `ringscan accounts <file>`.
//!
//! Lists accounts whose risk score is strictly above the threshold, highest
//! score first.
//!
//! Output (human mode): `account  score` lines.
//! Output (JSON mode): `{"threshold": t, "accounts": [{account_id, risk}], "count": N}`.
//!
//! Exit codes: 0 = success, 2 = input failure.
use std::io::Write as _;

use ringscan_core::{AnalysisConfig, RiskyAccount, high_risk_accounts};
use serde::Serialize;

use crate::OutputFormat;
use crate::cmd::load_graph;
use crate::error::CliError;
use crate::format::{emit, score, write_json};

#[derive(Serialize)]
struct AccountList<'a> {
    threshold: f64,
    accounts: &'a [RiskyAccount],
    count: usize,
}

/// Runs the `accounts` command.
///
/// # Errors
///
/// [`CliError`] exit code 2 if the content cannot be parsed or a record is
/// invalid.
pub fn run(content: &str, config: &AnalysisConfig, format: &OutputFormat) -> Result<(), CliError> {
    let graph = load_graph(content, config)?;
    let risky = high_risk_accounts(&graph, &config.risk);

    emit(|out| match format {
        OutputFormat::Human => {
            for account in &risky {
                writeln!(out, "{}  {}", account.account_id, score(Some(account.risk)))?;
            }
            Ok(())
        }
        OutputFormat::Json => write_json(
            out,
            &AccountList {
                threshold: config.risk.high_risk_threshold,
                accounts: &risky,
                count: risky.len(),
            },
        ),
    })
}

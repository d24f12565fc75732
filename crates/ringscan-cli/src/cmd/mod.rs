/// Command modules for the `ringscan` CLI.
///
/// Each submodule implements one subcommand. Its `run` function takes the
/// input text plus the resolved settings, writes the result to stdout, and
/// returns `Ok(())` on success or a [`crate::error::CliError`] on failure.
pub mod accounts;
pub mod analyze;
pub mod components;
pub mod cycles;
pub mod flows;
pub mod rings;

use ringscan_core::{AnalysisConfig, TransferGraph, build_validated_graph};

use crate::error::CliError;
use crate::input::parse_records;

/// Parses `content` and builds the transfer graph under `config`'s risk policy.
///
/// # Errors
///
/// [`CliError`] with exit code 2 for parse failures and invalid records.
pub fn load_graph(content: &str, config: &AnalysisConfig) -> Result<TransferGraph, CliError> {
    let records = parse_records(content, config.risk_policy)?;
    let graph = build_validated_graph(&records.transfers, &records.accounts, config.risk_policy)?;
    Ok(graph)
}

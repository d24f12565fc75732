//! Implementation of `ringscan rings <file> --hops <k>`.
//!
//! Lists every ring of exactly `k` transfers whose accounts are pairwise
//! distinct. Each ring is reported once per starting account, so a
//! three-account loop appears three times for `--hops 3`.
//!
//! Output (human mode): one `A -> B -> C -> A` line per ring.
//! Output (JSON mode): `{"hops": k, "rings": [[...], ...], "count": N}`.
//!
//! Exit codes: 0 = success, 2 = input failure.
use std::io::Write as _;

use ringscan_core::{AnalysisConfig, fixed_length_cycles};
use serde::Serialize;
use tracing::warn;

use crate::OutputFormat;
use crate::cmd::load_graph;
use crate::error::CliError;
use crate::format::{arrow_path, emit, write_json};

#[derive(Serialize)]
struct RingList<'a> {
    hops: u32,
    rings: &'a [Vec<String>],
    count: usize,
}

/// Runs the `rings` command.
///
/// # Errors
///
/// [`CliError`] exit code 2 if the content cannot be parsed or a record is
/// invalid.
pub fn run(
    content: &str,
    config: &AnalysisConfig,
    hops: u32,
    limit: Option<usize>,
    format: &OutputFormat,
) -> Result<(), CliError> {
    let graph = load_graph(content, config)?;
    let rings = fixed_length_cycles(&graph, hops as usize, limit);
    if limit.is_some_and(|cap| rings.len() >= cap) {
        warn!(limit, "ring limit reached, output may be incomplete");
    }
    let paths: Vec<Vec<String>> = rings.iter().map(|r| r.ids(&graph)).collect();

    emit(|out| match format {
        OutputFormat::Human => {
            for path in &paths {
                writeln!(out, "{}", arrow_path(path))?;
            }
            Ok(())
        }
        OutputFormat::Json => write_json(
            out,
            &RingList {
                hops,
                rings: &paths,
                count: paths.len(),
            },
        ),
    })
}

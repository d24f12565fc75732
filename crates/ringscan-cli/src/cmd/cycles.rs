//! Implementation of `ringscan cycles <file>`.
//!
//! Prints the raw cycle paths found by the back-edge detector, without risk
//! metrics. Takes the same detection flags as `analyze`.
//!
//! Output (human mode): one `A -> B -> C -> A` line per cycle.
//! Output (JSON mode): `{"cycles": [["A","B","C","A"], ...], "count": N}`.
//!
//! Exit codes: 0 = success (including no cycles), 2 = input failure.
use std::io::Write;

use ringscan_core::{AnalysisConfig, detect_cycles, detect_distinct_cycles};
use serde::Serialize;

use crate::OutputFormat;
use crate::cmd::load_graph;
use crate::error::CliError;
use crate::format::{arrow_path, emit, write_json};

#[derive(Serialize)]
struct PathList<'a> {
    cycles: &'a [Vec<String>],
    count: usize,
}

/// Runs the `cycles` command.
///
/// # Errors
///
/// [`CliError`] exit code 2 if the content cannot be parsed or a record is
/// invalid.
pub fn run(content: &str, config: &AnalysisConfig, format: &OutputFormat) -> Result<(), CliError> {
    let graph = load_graph(content, config)?;
    let cycles = if config.dedupe {
        detect_distinct_cycles(&graph, &config.detect)
    } else {
        detect_cycles(&graph, &config.detect)
    };
    let paths: Vec<Vec<String>> = cycles.iter().map(|c| c.ids(&graph)).collect();

    emit(|out| match format {
        OutputFormat::Human => print_human(out, &paths),
        OutputFormat::Json => write_json(
            out,
            &PathList {
                cycles: &paths,
                count: paths.len(),
            },
        ),
    })
}

fn print_human<W: Write>(w: &mut W, paths: &[Vec<String>]) -> std::io::Result<()> {
    for path in paths {
        writeln!(w, "{}", arrow_path(path))?;
    }
    Ok(())
}

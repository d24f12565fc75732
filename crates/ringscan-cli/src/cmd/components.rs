//! Implementation of `ringscan components <file>`.
//!
//! Lists the strongly connected groups of accounts that contain at least
//! one cycle. Unlike `cycles`, this view also covers accounts whose loops
//! the back-edge detector does not report because they are only reachable
//! through an already-explored branch.
//!
//! Output (human mode): `component 1 (3 accounts): A, B, C` lines.
//! Output (JSON mode): `{"components": [["A","B","C"], ...], "count": N}`.
//!
//! Exit codes: 0 = success, 2 = input failure.
use std::io::Write;

use ringscan_core::{AnalysisConfig, cyclic_components};
use serde::Serialize;

use crate::OutputFormat;
use crate::cmd::load_graph;
use crate::error::CliError;
use crate::format::{emit, pluralize, write_json};

#[derive(Serialize)]
struct ComponentList<'a> {
    components: &'a [Vec<String>],
    count: usize,
}

/// Runs the `components` command.
///
/// # Errors
///
/// [`CliError`] exit code 2 if the content cannot be parsed or a record is
/// invalid.
pub fn run(content: &str, config: &AnalysisConfig, format: &OutputFormat) -> Result<(), CliError> {
    let graph = load_graph(content, config)?;
    let groups: Vec<Vec<String>> = cyclic_components(&graph)
        .iter()
        .map(|members| graph.ids_of(members))
        .collect();

    emit(|out| match format {
        OutputFormat::Human => print_human(out, &groups),
        OutputFormat::Json => write_json(
            out,
            &ComponentList {
                components: &groups,
                count: groups.len(),
            },
        ),
    })
}

fn print_human<W: Write>(w: &mut W, groups: &[Vec<String>]) -> std::io::Result<()> {
    for (n, members) in groups.iter().enumerate() {
        writeln!(
            w,
            "component {} ({} {}): {}",
            n + 1,
            members.len(),
            pluralize(members.len(), "account", "accounts"),
            members.join(", ")
        )?;
    }
    Ok(())
}

//! Implementation of `ringscan analyze <file>`.
//!
//! Detects cycles, scores each one against account risk, and prints the
//! findings followed by the network summary.
//!
//! Output (human mode): one tagged line per cycle, then aligned summary lines.
//! Output (JSON mode): the full report object with `cycle_count` and
//! `high_risk_cycle_count` added at the top level.
//!
//! Exit codes: 0 = success, 1 = `--fail-on-high-risk` tripped, 2 = input
//! failure.
use std::io::Write;
use std::time::Instant;

use ringscan_core::{AnalysisConfig, AnalysisReport, analyze};
use serde::Serialize;
use tracing::info;

use crate::OutputFormat;
use crate::error::CliError;
use crate::format::{FormatterConfig, amount, arrow_path, emit, pluralize, score, write_json};
use crate::input::parse_records;

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    cycle_count: usize,
    high_risk_cycle_count: usize,
    threshold: f64,
    #[serde(flatten)]
    report: &'a AnalysisReport,
}

/// Runs the `analyze` command.
///
/// # Errors
///
/// - [`CliError`] exit code 2 if the content cannot be parsed or a record is
///   invalid.
/// - [`CliError::HighRiskCycles`] (exit code 1) when `fail_on_high_risk` is
///   set and any cycle is HIGH_RISK. The report is printed first.
pub fn run(
    content: &str,
    config: &AnalysisConfig,
    fail_on_high_risk: bool,
    format: &OutputFormat,
    fmt: &FormatterConfig,
) -> Result<(), CliError> {
    let started = Instant::now();
    let records = parse_records(content, config.risk_policy)?;
    let report = analyze(&records.transfers, &records.accounts, config)?;
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analysis finished"
    );

    let threshold = config.risk.high_risk_threshold;
    emit(|out| match format {
        OutputFormat::Human => print_human(out, &report, threshold, fmt),
        OutputFormat::Json => write_json(
            out,
            &AnalyzeOutput {
                cycle_count: report.cycle_count(),
                high_risk_cycle_count: report.high_risk_cycle_count(),
                threshold,
                report: &report,
            },
        ),
    })?;

    let high_risk = report.high_risk_cycle_count();
    if fail_on_high_risk && high_risk > 0 {
        return Err(CliError::HighRiskCycles { count: high_risk });
    }
    Ok(())
}

fn print_human<W: Write>(
    w: &mut W,
    report: &AnalysisReport,
    threshold: f64,
    fmt: &FormatterConfig,
) -> std::io::Result<()> {
    let count = report.cycle_count();
    writeln!(
        w,
        "{} {count} {} ({} high risk, threshold {threshold})",
        fmt.heading("cycles:"),
        pluralize(count, "cycle", "cycles"),
        report.high_risk_cycle_count(),
    )?;
    for finding in &report.cycles {
        writeln!(
            w,
            "  {} {}  hops={} avg_risk={} scored={} amount={}",
            fmt.classification_tag(finding.classification),
            arrow_path(&finding.path),
            finding.hops,
            score(finding.average_risk),
            finding.scored_nodes,
            amount(finding.total_weight),
        )?;
    }

    let s = &report.summary;
    writeln!(w, "{}", fmt.heading("network:"))?;
    writeln!(w, "  accounts:            {}", s.total_nodes)?;
    writeln!(w, "  high-risk accounts:  {}", s.high_risk_node_count)?;
    writeln!(w, "  transfer pairs:      {}", s.total_edges)?;
    writeln!(w, "  transfers:           {}", s.total_transfers)?;
    writeln!(w, "  total amount:        {}", amount(s.total_amount))?;
    Ok(())
}

mod cli;
mod cmd;
mod config;
mod error;
mod format;
mod input;
mod io;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

pub use cli::{Cli, Command, OutputFormat, PathOrStdin};

use crate::error::CliError;
use crate::format::FormatterConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let fmt = FormatterConfig::from_flags(cli.no_color);
    logging::init(cli.quiet, cli.verbose, fmt.colors);

    match run(&cli, &fmt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(2))
        }
    }
}

fn run(cli: &Cli, fmt: &FormatterConfig) -> Result<(), CliError> {
    let detect = match &cli.command {
        Command::Analyze { detect, .. } | Command::Cycles { detect, .. } => Some(detect),
        Command::Rings { .. }
        | Command::Flows { .. }
        | Command::Accounts { .. }
        | Command::Components { .. } => None,
    };
    let config = config::resolve(cli, detect)?;

    let source = cli.command.input();
    let content = io::read_input(source, cli.max_file_size)?;
    debug!(
        source = %io::source_label(source),
        bytes = content.len(),
        "read input"
    );

    match &cli.command {
        Command::Analyze {
            fail_on_high_risk, ..
        } => cmd::analyze::run(&content, &config, *fail_on_high_risk, &cli.format, fmt),
        Command::Cycles { .. } => cmd::cycles::run(&content, &config, &cli.format),
        Command::Rings { hops, limit, .. } => {
            cmd::rings::run(&content, &config, *hops, *limit, &cli.format)
        }
        Command::Flows { limit, .. } => cmd::flows::run(&content, &config, *limit, &cli.format),
        Command::Accounts { .. } => cmd::accounts::run(&content, &config, &cli.format),
        Command::Components { .. } => cmd::components::run(&content, &config, &cli.format),
    }
}

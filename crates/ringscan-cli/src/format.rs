/// Output helpers shared by the subcommands: color detection, human-mode
/// fragments, and JSON emission.
///
/// Colors are disabled when `--no-color` is set, when the `NO_COLOR`
/// environment variable is present (per <https://no-color.org>), or when
/// stdout is not a TTY.
use std::io::{IsTerminal as _, Write};

use ringscan_core::Classification;
use serde::Serialize;

use crate::error::CliError;

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted to stdout.
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

// ---------------------------------------------------------------------------
// ANSI escape sequences
// ---------------------------------------------------------------------------

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Rendering settings derived from the global flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether ANSI colors are enabled.
    pub colors: bool,
}

impl FormatterConfig {
    /// Constructs a [`FormatterConfig`] from the `--no-color` flag and the
    /// environment.
    pub fn from_flags(no_color_flag: bool) -> Self {
        Self {
            colors: colors_enabled(no_color_flag),
        }
    }

    /// Renders a classification tag, colored when enabled.
    ///
    /// `[HIGH_RISK]` is red, `[MONITOR]` yellow.
    pub fn classification_tag(&self, class: Classification) -> String {
        let color = match class {
            Classification::HighRisk => ANSI_RED,
            Classification::Monitor => ANSI_YELLOW,
        };
        if self.colors {
            format!("{color}[{class}]{ANSI_RESET}")
        } else {
            format!("[{class}]")
        }
    }

    /// Renders a section heading, bold when enabled.
    pub fn heading(&self, text: &str) -> String {
        if self.colors {
            format!("{ANSI_BOLD}{text}{ANSI_RESET}")
        } else {
            text.to_owned()
        }
    }
}

// ---------------------------------------------------------------------------
// Human-mode fragments
// ---------------------------------------------------------------------------

/// Joins a closed account path with arrows: `A -> B -> C -> A`.
pub fn arrow_path(ids: &[String]) -> String {
    ids.join(" -> ")
}

/// Renders an optional score with three decimals, or `n/a`.
pub fn score(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |v| format!("{v:.3}"))
}

/// Renders an amount with two decimals.
pub fn amount(value: f64) -> String {
    format!("{value:.2}")
}

/// Returns `singular` when `count == 1`, otherwise `plural`.
pub fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

/// Writes `value` as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    writeln!(w, "{json}")
}

/// Runs `render` against a locked stdout.
///
/// # Errors
///
/// [`CliError::OutputWriteError`] if writing to stdout fails.
pub fn emit<F>(render: F) -> Result<(), CliError>
where
    F: FnOnce(&mut std::io::StdoutLock<'static>) -> std::io::Result<()>,
{
    let mut out = std::io::stdout().lock();
    write_output(&mut out, render)
}

/// Runs `render` against `out` and flushes it.
///
/// # Errors
///
/// [`CliError::OutputWriteError`] if rendering or flushing fails.
pub fn write_output<W, F>(out: &mut W, render: F) -> Result<(), CliError>
where
    W: Write,
    F: FnOnce(&mut W) -> std::io::Result<()>,
{
    render(out)
        .and_then(|()| out.flush())
        .map_err(|e| CliError::OutputWriteError {
            detail: e.to_string(),
        })
}

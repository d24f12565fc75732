/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `ringscan` binary. Every
/// variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
///
/// - Exit code **2** (input failure): the input or configuration could not be
///   read, parsed or validated. Nothing is analysed.
/// - Exit code **1** (logical failure): the analysis ran to completion but
///   tripped a requested gate (`--fail-on-high-risk`).
use std::fmt;
use std::path::PathBuf;

use ringscan_core::RecordError;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `ringscan` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes; `None` for stdin.
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError { detail: String },

    /// A generic I/O error not covered by the more specific variants above.
    IoError { source: String, detail: String },

    /// Writing the report to stdout failed, e.g. on a closed pipe.
    OutputWriteError { detail: String },

    /// The input is not a well-formed transfer document.
    ParseFailed { detail: String },

    /// A transfer or account record is incomplete or out of range.
    InvalidRecord(RecordError),

    /// The `--config` file could not be read or parsed, or a setting is
    /// out of range.
    ConfigError { source: String, detail: String },

    // --- Exit code 1: logical failures ---
    /// `--fail-on-high-risk` was set and at least one cycle is HIGH_RISK.
    ///
    /// The report has already been printed.
    HighRiskCycles {
        /// Number of HIGH_RISK cycles.
        count: usize,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::OutputWriteError { .. }
            | Self::ParseFailed { .. }
            | Self::InvalidRecord(_)
            | Self::ConfigError { .. } => 2,

            Self::HighRiskCycles { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error reading {source}: {detail}")
            }
            Self::OutputWriteError { detail } => {
                format!("error: failed to write output: {detail}")
            }
            Self::ParseFailed { detail } => {
                format!("error: could not parse transfer document: {detail}")
            }
            Self::InvalidRecord(err) => format!("error: invalid record: {err}"),
            Self::ConfigError { source, detail } => {
                format!("error: bad configuration in {source}: {detail}")
            }
            Self::HighRiskCycles { count } => {
                let noun = if *count == 1 { "cycle" } else { "cycles" };
                format!("error: {count} high-risk {noun} detected")
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

impl From<RecordError> for CliError {
    fn from(err: RecordError) -> Self {
        Self::InvalidRecord(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

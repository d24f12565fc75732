//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ringscan_core::{DetectConfig, RiskPolicy};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`].
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, optionally colored output (default).
    Human,
    /// A single pretty-printed JSON object.
    Json,
}

/// Handling of risk scores outside `[0, 1]`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RiskPolicyArg {
    /// Fail with exit code 2.
    Reject,
    /// Clamp into range and log a warning.
    Clamp,
}

impl From<RiskPolicyArg> for RiskPolicy {
    fn from(arg: RiskPolicyArg) -> Self {
        match arg {
            RiskPolicyArg::Reject => RiskPolicy::Reject,
            RiskPolicyArg::Clamp => RiskPolicy::Clamp,
        }
    }
}

/// Detection flags shared by `analyze` and `cycles`.
#[derive(Args, Clone, Debug, Default)]
pub struct DetectArgs {
    /// Longest DFS path to explore (default: unbounded).
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
    /// Stop after reporting this many cycles (default: unbounded).
    #[arg(long, value_name = "N")]
    pub max_cycles: Option<usize>,
    /// Run each weakly connected component on its own worker thread.
    #[arg(long)]
    pub parallel: bool,
    /// Collapse rotations of the same cycle into one report.
    #[arg(long)]
    pub dedupe: bool,
}

impl DetectArgs {
    /// Overlays the flags that were given on top of `base`.
    pub fn apply(&self, base: DetectConfig) -> DetectConfig {
        DetectConfig {
            max_depth: self.max_depth.or(base.max_depth),
            max_cycles: self.max_cycles.or(base.max_cycles),
            parallel: self.parallel || base.parallel,
        }
    }
}

/// All top-level subcommands exposed by the `ringscan` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Detect cycles and score them against account risk.
    Analyze {
        /// Path to a transfer document, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        #[command(flatten)]
        detect: DetectArgs,
        /// Exit with code 1 when any cycle is classified HIGH_RISK.
        #[arg(long)]
        fail_on_high_risk: bool,
    },

    /// List detected cycle paths without risk metrics.
    Cycles {
        /// Path to a transfer document, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        #[command(flatten)]
        detect: DetectArgs,
    },

    /// List every ring of exactly K transfers, one row per starting account.
    Rings {
        /// Path to a transfer document, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        /// Ring length in transfers.
        #[arg(long, value_name = "K", value_parser = clap::value_parser!(u32).range(1..=16))]
        hops: u32,
        /// Maximum number of rings to report (default: unbounded).
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Summarize incoming and outgoing transfers per account.
    Flows {
        /// Path to a transfer document, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        /// Only print the first N accounts.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// List accounts whose risk score is above the threshold.
    Accounts {
        /// Path to a transfer document, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
    },

    /// List strongly connected groups of accounts that contain a cycle.
    Components {
        /// Path to a transfer document, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
    },
}

impl Command {
    /// The input argument of the active subcommand.
    pub fn input(&self) -> &PathOrStdin {
        match self {
            Command::Analyze { file, .. }
            | Command::Cycles { file, .. }
            | Command::Rings { file, .. }
            | Command::Flows { file, .. }
            | Command::Accounts { file }
            | Command::Components { file } => file,
        }
    }
}

/// Root CLI struct for the `ringscan` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "ringscan",
    version,
    about = "Transfer-ring detection and risk scoring",
    long_about = "Detects cycles of money movement in a network of account transfers\n\
                  and scores each cycle against per-account risk."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Only log errors to stderr (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log debug detail and timings to stderr (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input size in bytes.
    ///
    /// Can also be set via the `RINGSCAN_MAX_FILE_SIZE` environment variable.
    /// Default: 268435456 (256 MB).
    #[arg(
        long,
        global = true,
        env = "RINGSCAN_MAX_FILE_SIZE",
        default_value = "268435456"
    )]
    pub max_file_size: u64,

    /// Disable ANSI color codes in human output.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org>.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Average risk above which a cycle or account is HIGH_RISK (default: 0.7).
    #[arg(long, global = true, env = "RINGSCAN_RISK_THRESHOLD", value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// What to do with risk scores outside [0, 1] (default: reject).
    #[arg(long, global = true, value_enum)]
    pub risk_policy: Option<RiskPolicyArg>,

    /// TOML file with analysis settings; command-line flags take precedence.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

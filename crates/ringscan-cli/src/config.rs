//! Resolution of the effective [`AnalysisConfig`].
//!
//! Precedence, lowest to highest: built-in defaults, the `--config` TOML
//! file, environment variables and command-line flags (clap merges the last
//! two). A TOML file may set any subset of fields:
//!
//! ```toml
//! dedupe = true
//! risk_policy = "clamp"
//!
//! [risk]
//! high_risk_threshold = 0.8
//!
//! [detect]
//! max_depth = 64
//! parallel = true
//! ```
use std::path::Path;

use ringscan_core::AnalysisConfig;
use tracing::debug;

use crate::cli::{Cli, DetectArgs};
use crate::error::CliError;
use crate::io::io_error_to_cli;

/// Loads `path` as a TOML [`AnalysisConfig`].
///
/// # Errors
///
/// [`CliError`] with exit code 2 if the file cannot be read or does not
/// deserialize.
pub fn load_file(path: &Path) -> Result<AnalysisConfig, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| io_error_to_cli(&e, path))?;
    let config: AnalysisConfig = toml::from_str(&content).map_err(|e| CliError::ConfigError {
        source: path.display().to_string(),
        detail: e.message().to_owned(),
    })?;
    debug!(path = %path.display(), "loaded configuration file");
    Ok(config)
}

/// Builds the effective configuration for one invocation.
///
/// `detect` carries the detection flags of subcommands that have them.
///
/// # Errors
///
/// [`CliError::ConfigError`] if the config file is unreadable or the
/// resulting threshold is not a finite number.
pub fn resolve(cli: &Cli, detect: Option<&DetectArgs>) -> Result<AnalysisConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => load_file(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(threshold) = cli.threshold {
        config.risk.high_risk_threshold = threshold;
    }
    if let Some(policy) = cli.risk_policy {
        config.risk_policy = policy.into();
    }
    if let Some(args) = detect {
        config.detect = args.apply(config.detect);
        config.dedupe = config.dedupe || args.dedupe;
    }

    if !config.risk.high_risk_threshold.is_finite() {
        return Err(CliError::ConfigError {
            source: "--threshold".to_owned(),
            detail: format!(
                "threshold must be a finite number, got {}",
                config.risk.high_risk_threshold
            ),
        });
    }

    debug!(?config, "resolved analysis configuration");
    Ok(config)
}

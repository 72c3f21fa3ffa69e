//! Miette diagnostic conversion for CLI errors.

use crate::error::{CliError, ConfigError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        CliError::WatchSetup { path, reason } => miette::miette!(
            help = "Check permissions, or skip the directory with --ignore <NAME>",
            "Live reload could not watch {}: {}",
            path.display(),
            reason
        ),
        CliError::Watch(e) => miette::miette!(
            help = "Live reload needs a working filesystem watcher; run without --reload to serve only",
            "File watcher error: {}",
            e
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert ConfigError to miette Report
pub fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::InvalidValue { field, value, hint } => miette::miette!(
            help = hint,
            "Invalid value for '{}': {}",
            field,
            value
        ),
        other => miette::miette!("Configuration error: {}", other),
    }
}

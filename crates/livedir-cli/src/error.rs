//! Error types for livedir.
//!
//! `CliError` is the top-level type returned by setup and command code.
//! Domain-specific errors convert into it via `#[from]`. Failures scoped to a
//! single request (see [`crate::reload::RewriteError`]) never reach this type;
//! they become a 500 response for that request instead.
//!
//! # Example
//!
//! ```rust,no_run
//! use livedir_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_page(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).with_path(path)
//! }
//! ```

mod miette;

use std::path::PathBuf;
use thiserror::Error;

pub use self::miette::{cli_error_to_miette, config_error_to_miette};

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The served root exists but is not a directory
    #[error("{} is not a directory\n\nHint: Pass the directory to serve, not a file inside it", .0.display())]
    NotADirectory(PathBuf),

    /// I/O errors from file system or socket operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server errors (bind failure, serve loop failure)
    #[error("Server error: {0}")]
    Server(String),

    /// Watch backend could not be created
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// A directory in the served tree could not be walked or watched
    #[error("Cannot watch {}: {reason}\n\nHint: Check permissions, or add the directory name with --ignore", .path.display())]
    WatchSetup {
        /// Directory that failed
        path: PathBuf,
        /// Backend or walk error message
        reason: String,
    },

    /// The reload script template failed to render
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the given location
    #[error("Config file not found: {}\n\nHint: Check the path given to --config", .0.display())]
    NotFound(PathBuf),

    /// Config file uses an extension we cannot parse
    #[error("Unsupported config format: {}\n\nHint: Use a .json or .toml file", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }
}

//! Status message functions for terminal output.

use super::{color_enabled, quiet};
use owo_colors::OwoColorize;

/// Print a success message to stderr.
///
/// ```no_run
/// use livedir_cli::ui::success;
///
/// success("Serving ./public at http://127.0.0.1:8080");
/// ```
pub fn success(message: &str) {
    if quiet() {
        return;
    }
    if color_enabled() {
        eprintln!("{} {}", "✓".green().bold(), message);
    } else {
        eprintln!("✓ {}", message);
    }
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    if quiet() {
        return;
    }
    if color_enabled() {
        eprintln!("{} {}", "ℹ".blue().bold(), message);
    } else {
        eprintln!("ℹ {}", message);
    }
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    if quiet() {
        return;
    }
    if color_enabled() {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    } else {
        eprintln!("⚠ {}", message);
    }
}

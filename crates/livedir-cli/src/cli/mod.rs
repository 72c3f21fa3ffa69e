//! Command-line interface definition for livedir.
//!
//! A single command: serve one directory, optionally with live reload.
//!
//! ```text
//! livedir [--verbose|--quiet] [--no-color] [--port N] [--expose] [--reload]
//!         [--ignore NAME]... [--debounce-ms N] [--config FILE] <DIR>
//! ```

mod tests;
mod validation;

use clap::{Args, Parser};
use std::path::PathBuf;

pub use validation::{parse_debounce_ms, parse_dir_name, parse_port};

/// livedir - serve a directory with optional live reload
#[derive(Parser, Debug)]
#[command(
    name = "livedir",
    version,
    about = "Serve a directory over HTTP with optional live reload",
    long_about = "Serves static files from a directory. With --reload, changes under the\n\
                  directory trigger a reload in every connected browser tab through a\n\
                  small script injected into HTML pages."
)]
pub struct Cli {
    /// Enable verbose logging (debug level, including per-request traces)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub serve: ServeArgs,
}

/// Options for serving a directory.
///
/// Every option except `dir` is optional on the command line so that values
/// from a config file or the environment are only overridden when a flag is
/// actually given.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Directory to serve
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Port to listen on [default: 8080]
    #[arg(short, long, value_parser = parse_port)]
    pub port: Option<u16>,

    /// Listen on all interfaces instead of localhost only
    #[arg(long)]
    pub expose: bool,

    /// Watch the directory and reload connected browsers on change
    #[arg(short, long)]
    pub reload: bool,

    /// Extra directory name to skip while watching (repeatable)
    ///
    /// Added to the built-in set: .git, .hg, .svn, .idea, .vscode,
    /// node_modules, __pycache__, .venv
    #[arg(long = "ignore", value_name = "NAME", value_parser = parse_dir_name)]
    pub ignore: Vec<String>,

    /// Quiet period before a burst of changes triggers one reload [default: 100]
    #[arg(long, value_name = "MS", value_parser = parse_debounce_ms)]
    pub debounce_ms: Option<u64>,

    /// Path to a JSON or TOML config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

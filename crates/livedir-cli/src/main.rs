//! livedir - serve a directory with optional live reload.
//!
//! Parses arguments, initializes logging, and runs the serve command.

use clap::Parser;
use livedir_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init(args.quiet, args.no_color);

    commands::serve_execute(args.serve)
        .await
        .map_err(error::cli_error_to_miette)
}

//! livedir - serve a directory over HTTP with optional live reload.
//!
//! With reload on, every HTML page gets a small script that listens on a
//! Server-Sent Events endpoint. Changes anywhere under the served directory
//! (outside the ignore set) are debounced into a single `sourcechange` event
//! per burst, and each open tab reloads.
//!
//! # Architecture
//!
//! - [`reload`] - watcher, debouncer, broadcaster, event stream, HTML rewriting
//!   and the server that ties them together
//! - [`config`] - layered configuration (defaults, file, environment, flags)
//! - [`cli`] - argument parsing
//! - [`commands`] - the serve command
//! - [`error`] - error types with actionable messages
//! - [`logger`] - structured logging with tracing
//! - [`ui`] - lifecycle messages on the terminal
//!
//! # Example
//!
//! ```rust,no_run
//! use livedir_cli::config::ServeConfig;
//! use livedir_cli::reload::ReloadServer;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> livedir_cli::Result<()> {
//! let config = ServeConfig {
//!     reload: true,
//!     ..ServeConfig::new("public")
//! };
//! config.validate()?;
//!
//! let server = ReloadServer::new(config, CancellationToken::new()).bind().await?;
//! println!("listening on {}", server.url());
//! server.run().await
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod reload;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};

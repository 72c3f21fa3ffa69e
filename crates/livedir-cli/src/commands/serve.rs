//! The serve command: load configuration, bind, serve until interrupted.

use crate::cli::ServeArgs;
use crate::config::ServeConfig;
use crate::error::Result;
use crate::reload::ReloadServer;
use crate::ui;
use std::future::Future;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Execute the serve command.
///
/// # Process Flow
///
/// 1. Load and validate configuration
/// 2. Bind the listener (and start watching when reload is on)
/// 3. Serve until Ctrl+C, or SIGTERM, SIGHUP or SIGQUIT on unix
/// 4. Drain connections within the shutdown timeout
///
/// # Errors
///
/// Returns errors for invalid configuration, a missing or non-directory
/// root, bind failures and watcher setup failures.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = ServeConfig::load(&args)?;
    config.validate()?;

    let root = config.root.display().to_string();
    let reload = config.reload;
    // Handlers go in before the listening line so an early signal is not fatal.
    let termination = termination_signals();

    let shutdown = CancellationToken::new();
    let server = ReloadServer::new(config, shutdown.clone()).bind().await?;

    ui::success(&format!("Serving {} at {}", root, server.url()));
    if reload {
        ui::info("Live reload enabled");
    }
    if server.local_addr().ip().is_unspecified() {
        ui::warning("Listening on all interfaces; the directory is reachable from your network");
    }

    let signals = tokio::spawn(cancel_on_signal(shutdown.clone(), termination));

    let result = server.run().await;
    signals.abort();

    if result.is_ok() {
        ui::info("Server stopped");
    }
    result
}

/// Cancel `shutdown` on Ctrl+C or the first of `termination`.
async fn cancel_on_signal(
    shutdown: CancellationToken,
    termination: impl Future<Output = &'static str>,
) {
    tokio::select! {
        _ = ctrl_c() => ui::info("Shutting down..."),
        name = termination => ui::info(&format!("Received {}, shutting down...", name)),
        _ = shutdown.cancelled() => return,
    }
    shutdown.cancel();
}

async fn ctrl_c() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Install SIGTERM, SIGHUP and SIGQUIT handlers now and resolve with the
/// name of whichever arrives first.
#[cfg(unix)]
fn termination_signals() -> impl Future<Output = &'static str> {
    use signal::unix::SignalKind;

    let mut term = install(SignalKind::terminate(), "SIGTERM");
    let mut hangup = install(SignalKind::hangup(), "SIGHUP");
    let mut quit = install(SignalKind::quit(), "SIGQUIT");

    async move {
        tokio::select! {
            _ = recv(&mut term) => "SIGTERM",
            _ = recv(&mut hangup) => "SIGHUP",
            _ = recv(&mut quit) => "SIGQUIT",
        }
    }
}

#[cfg(unix)]
fn install(kind: signal::unix::SignalKind, name: &'static str) -> Option<signal::unix::Signal> {
    signal::unix::signal(kind)
        .map_err(|err| tracing::warn!(error = %err, signal = name, "failed to install signal handler"))
        .ok()
}

#[cfg(unix)]
async fn recv(signal: &mut Option<signal::unix::Signal>) {
    match signal {
        Some(stream) => {
            stream.recv().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(not(unix))]
fn termination_signals() -> impl Future<Output = &'static str> {
    std::future::pending()
}

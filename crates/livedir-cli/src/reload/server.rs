//! HTTP server wiring: static files, the notification endpoint and HTML
//! rewriting, plus the bind/run/shutdown lifecycle.

use crate::config::ServeConfig;
use crate::error::{CliError, Result};
use crate::reload::failure::panic_response;
use crate::reload::{
    handle_sse, inject_reload, Broadcaster, Debouncer, Injection, ReloadState, WatchLoop,
};
use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// What the router needs when live reload is on.
#[derive(Clone)]
pub struct ReloadRoutes {
    pub state: ReloadState,
    pub injection: Injection,
    pub sse_path: String,
}

/// Build the application router.
///
/// Without `reload` this is a plain static file server. With it, `sse_path`
/// serves the event stream, HTML responses get the reload script, and every
/// response is marked `Cache-Control: no-store`.
pub fn router(root: &Path, reload: Option<ReloadRoutes>) -> Router {
    let files = Router::new().fallback_service(ServeDir::new(root));

    let app = match reload {
        None => files,
        Some(ReloadRoutes {
            state,
            injection,
            sse_path,
        }) => {
            let files = files.layer(middleware::from_fn_with_state(injection, inject_reload));

            Router::new()
                .route(&sse_path, get(handle_sse))
                .with_state(state)
                .fallback_service(files)
                .layer(middleware::from_fn(no_store))
                .layer(
                    // Pages opened through another origin still reach the stream.
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
        }
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

async fn no_store(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// A server that has not bound its socket yet.
pub struct ReloadServer {
    config: ServeConfig,
    shutdown: CancellationToken,
}

impl ReloadServer {
    /// `shutdown` stops the server, the watcher and every open event stream.
    pub fn new(config: ServeConfig, shutdown: CancellationToken) -> Self {
        Self { config, shutdown }
    }

    /// Bind the listener and, with reload on, set up the watcher.
    ///
    /// The reload script is rendered with the port actually bound, so port 0
    /// works.
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound or the directory tree
    /// cannot be watched.
    pub async fn bind(self) -> Result<BoundServer> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        let (routes, watch_task) = if self.config.reload {
            let injection = Injection::render(local_addr.port(), &self.config.sse_path)?;
            let broadcaster = Arc::new(Broadcaster::new());
            let debouncer = Debouncer::new(self.config.debounce(), self.shutdown.child_token());
            let watch_loop = WatchLoop::new(
                &self.config.root,
                self.config.ignore_set(),
                debouncer,
                Arc::clone(&broadcaster),
            )?;
            let task = tokio::spawn(watch_loop.run(self.shutdown.child_token()));

            let routes = ReloadRoutes {
                state: ReloadState {
                    broadcaster,
                    shutdown: self.shutdown.clone(),
                },
                injection,
                sse_path: self.config.sse_path.clone(),
            };
            (Some(routes), Some(task))
        } else {
            (None, None)
        };

        Ok(BoundServer {
            app: router(&self.config.root, routes),
            listener,
            local_addr,
            watch_task,
            shutdown: self.shutdown,
            shutdown_timeout: self.config.shutdown_timeout(),
        })
    }
}

/// A bound server, ready to accept connections.
pub struct BoundServer {
    app: Router,
    listener: TcpListener,
    local_addr: SocketAddr,
    watch_task: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
    shutdown_timeout: Duration,
}

impl BoundServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL to print for the user.
    pub fn url(&self) -> String {
        if self.local_addr.ip().is_unspecified() {
            format!("http://localhost:{}", self.local_addr.port())
        } else {
            format!("http://{}", self.local_addr)
        }
    }

    /// Serve until the shutdown token fires, then drain.
    ///
    /// In-flight requests get `shutdown_timeout` to finish; connections still
    /// open after that are dropped.
    pub async fn run(self) -> Result<()> {
        let BoundServer {
            app,
            listener,
            watch_task,
            shutdown,
            shutdown_timeout,
            ..
        } = self;

        let graceful = shutdown.clone().cancelled_owned();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(graceful)
                .await
        });

        let finished_early = tokio::select! {
            joined = &mut server => Some(joined),
            _ = shutdown.cancelled() => None,
        };

        let result = match finished_early {
            Some(joined) => {
                shutdown.cancel();
                server_outcome(joined)
            }
            None => {
                tracing::info!("shutting down");
                match tokio::time::timeout(shutdown_timeout, &mut server).await {
                    Ok(joined) => server_outcome(joined),
                    Err(_) => {
                        tracing::warn!(
                            timeout = ?shutdown_timeout,
                            "graceful shutdown timed out, dropping open connections"
                        );
                        server.abort();
                        Ok(())
                    }
                }
            }
        };

        if let Some(task) = watch_task {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "watcher task failed");
            }
        }

        result
    }
}

fn server_outcome(joined: std::result::Result<std::io::Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(CliError::Server(format!("Server error: {}", err))),
        Err(err) => Err(CliError::Server(format!("Server task failed: {}", err))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir, reload: bool) -> ServeConfig {
        ServeConfig {
            port: 0,
            reload,
            ..ServeConfig::new(dir.path())
        }
    }

    #[tokio::test]
    async fn test_bind_reports_ephemeral_port() {
        let dir = TempDir::new().unwrap();
        let server = ReloadServer::new(config(&dir, false), CancellationToken::new())
            .bind()
            .await
            .unwrap();

        assert_ne!(server.local_addr().port(), 0);
        assert!(server.local_addr().ip().is_loopback());
        assert_eq!(server.url(), format!("http://{}", server.local_addr()));
    }

    #[tokio::test]
    async fn test_run_returns_after_shutdown() {
        let dir = TempDir::new().unwrap();
        let shutdown = CancellationToken::new();
        let server = ReloadServer::new(config(&dir, true), shutdown.clone())
            .bind()
            .await
            .unwrap();

        let running = tokio::spawn(server.run());
        shutdown.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), running)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_bind_fails_on_taken_port() {
        let dir = TempDir::new().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ServeConfig {
            port: taken.local_addr().unwrap().port(),
            ..ServeConfig::new(dir.path())
        };

        let err = ReloadServer::new(config, CancellationToken::new())
            .bind()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CliError::Server(msg) if msg.contains("Failed to bind")));
    }
}

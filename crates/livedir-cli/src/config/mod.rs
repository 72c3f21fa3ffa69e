//! Configuration for a serve session, loaded from several sources.
//!
//! Merges settings from CLI args, environment variables, and a config file.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod validation;

use crate::reload::IgnoreSet;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::*;

/// Settings for one run of the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Directory to serve
    pub root: PathBuf,

    /// TCP port (0 picks a free port)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Listen on all interfaces instead of loopback
    #[serde(default)]
    pub expose: bool,

    /// Enable file watching and browser reload
    #[serde(default)]
    pub reload: bool,

    /// Directory names skipped while watching, in addition to the built-in set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,

    /// Debounce interval for change bursts
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Path of the event-stream endpoint
    #[serde(default = "default_sse_path")]
    pub sse_path: String,

    /// Upper bound on graceful shutdown
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl ServeConfig {
    /// Defaults for serving `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            port: default_port(),
            expose: false,
            reload: false,
            ignore: Vec::new(),
            debounce_ms: default_debounce_ms(),
            sse_path: default_sse_path(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }

    /// Address to bind: loopback unless `expose` is set.
    pub fn addr(&self) -> SocketAddr {
        let ip = if self.expose {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };
        SocketAddr::new(ip, self.port)
    }

    /// The built-in ignore set plus the configured names.
    pub fn ignore_set(&self) -> IgnoreSet {
        IgnoreSet::with_defaults(self.ignore.iter().cloned())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

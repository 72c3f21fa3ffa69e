use crate::cli::ServeArgs;
use crate::config::ServeConfig;
use crate::error::{CliError, ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized, Toml},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides (`LIVEDIR_PORT`, `LIVEDIR_RELOAD`, ...).
pub const ENV_PREFIX: &str = "LIVEDIR_";

/// Keys read from the environment. `root` always comes from the command line.
const ENV_KEYS: &[&str] = &[
    "port",
    "expose",
    "reload",
    "ignore",
    "debounce_ms",
    "sse_path",
    "shutdown_timeout_secs",
];

/// Values given explicitly on the command line. Absent flags are skipped so
/// they do not mask lower-priority sources.
#[derive(Debug, Serialize)]
struct CliOverrides {
    root: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expose: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reload: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ignore: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debounce_ms: Option<u64>,
}

impl From<&ServeArgs> for CliOverrides {
    fn from(args: &ServeArgs) -> Self {
        Self {
            root: args.dir.clone(),
            port: args.port,
            expose: args.expose.then_some(true),
            reload: args.reload.then_some(true),
            ignore: args.ignore.clone(),
            debounce_ms: args.debounce_ms,
        }
    }
}

impl ServeConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    ///
    /// `--ignore` names are appended to those from lower layers rather than
    /// replacing them.
    pub fn load(args: &ServeArgs) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::new(&args.dir)));

        if let Some(path) = &args.config {
            figment = merge_file(figment, path)?;
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).only(ENV_KEYS));

        figment = figment.admerge(Serialized::defaults(CliOverrides::from(args)));

        let config: Self = figment.extract().map_err(extraction_error)?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => Ok(figment.merge(Json::file(path))),
        Some("toml") => Ok(figment.merge(Toml::file(path))),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf()).into()),
    }
}

fn extraction_error(err: figment::Error) -> CliError {
    let field = if err.path.is_empty() {
        "configuration".to_string()
    } else {
        err.path.join(".")
    };

    ConfigError::InvalidValue {
        field,
        value: err.kind.to_string(),
        hint: format!(
            "Check the config file syntax and any {}* environment variables",
            ENV_PREFIX
        ),
    }
    .into()
}

use crate::config::ServeConfig;
use crate::error::{CliError, ConfigError, Result};

/// Validate the notification endpoint path.
///
/// It must be an absolute URL path other than `/`, without query, fragment,
/// whitespace or route-pattern syntax (`{..}`, `*`, a leading `:` in a segment).
pub fn validate_sse_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(ConfigError::InvalidValue {
            field: "sse_path".to_string(),
            value: path.to_string(),
            hint: "Must start with '/', e.g. /sse".to_string(),
        }
        .into());
    }

    if path == "/" {
        return Err(ConfigError::InvalidValue {
            field: "sse_path".to_string(),
            value: path.to_string(),
            hint: "'/' would hide the served directory; pick a sub-path such as /sse".to_string(),
        }
        .into());
    }

    if let Some(c) = path
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '?' | '#' | '{' | '}' | '*'))
    {
        return Err(ConfigError::InvalidValue {
            field: "sse_path".to_string(),
            value: path.to_string(),
            hint: format!("Invalid character '{}' in path", c),
        }
        .into());
    }

    if let Some(segment) = path.split('/').find(|s| s.starts_with(':')) {
        return Err(ConfigError::InvalidValue {
            field: "sse_path".to_string(),
            value: path.to_string(),
            hint: format!("Segment '{}' would be read as a route parameter", segment),
        }
        .into());
    }

    Ok(())
}

impl ServeConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if !self.root.exists() {
            return Err(CliError::FileNotFound(self.root.clone()));
        }

        if !self.root.is_dir() {
            return Err(CliError::NotADirectory(self.root.clone()));
        }

        if self.debounce_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "debounce_ms".to_string(),
                value: "0".to_string(),
                hint: "Use at least 1 ms".to_string(),
            }
            .into());
        }

        validate_sse_path(&self.sse_path)?;

        if let Some(name) = self
            .ignore
            .iter()
            .find(|name| name.is_empty() || name.contains(['/', '\\']))
        {
            return Err(ConfigError::InvalidValue {
                field: "ignore".to_string(),
                value: name.clone(),
                hint: "Ignore entries are single directory names, not paths".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

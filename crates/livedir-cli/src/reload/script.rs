//! The client-side listener script injected into served HTML.

use crate::error::Result;
use minijinja::{context, AutoEscape, Environment};
use std::sync::Arc;

/// Name of the pushed event the client listens for.
pub const SOURCE_CHANGE_EVENT: &str = "sourcechange";

const SNIPPET_TEMPLATE: &str = include_str!("../../assets/reload-snippet.html");

/// Pre-rendered injection snippet.
///
/// Rendered once at startup; cloning shares the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    snippet: Arc<str>,
}

impl Injection {
    /// Render the listener script for a server reachable on `port` with the
    /// notification endpoint at `sse_path`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Template`](crate::error::CliError::Template) if the
    /// template fails to render.
    pub fn render(port: u16, sse_path: &str) -> Result<Self> {
        let mut env = Environment::new();
        // Values land inside a script element, not HTML text.
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template("reload-snippet", SNIPPET_TEMPLATE)?;

        let snippet = env.get_template("reload-snippet")?.render(context! {
            port => port,
            sse_path => sse_path,
            event => SOURCE_CHANGE_EVENT,
        })?;

        Ok(Self {
            snippet: Arc::from(snippet),
        })
    }

    /// Wrap already rendered text.
    pub fn from_snippet(snippet: impl Into<Arc<str>>) -> Self {
        Self {
            snippet: snippet.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.snippet
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.snippet.as_bytes()
    }

    /// Byte length of the snippet.
    pub fn len(&self) -> usize {
        self.snippet.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippet.is_empty()
    }
}

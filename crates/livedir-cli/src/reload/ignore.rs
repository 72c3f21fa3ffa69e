//! Filtering of watched paths and change kinds.

use notify::event::{EventKind, ModifyKind};
use std::collections::BTreeSet;
use std::path::Path;

/// Directory names skipped by default: VCS metadata, editor metadata and
/// dependency caches.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    "node_modules",
    "__pycache__",
    ".venv",
];

/// Set of directory names whose subtrees are never watched.
///
/// Names match a single path component exactly; there is no globbing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    names: BTreeSet<String>,
}

impl IgnoreSet {
    /// Build a set from explicit names only.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .filter(|name: &String| !name.is_empty())
                .collect(),
        }
    }

    /// The default names plus `extra`.
    pub fn with_defaults<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(DEFAULT_IGNORED_DIRS.iter().copied());
        set.names
            .extend(extra.into_iter().map(Into::into).filter(|n: &String| !n.is_empty()));
        set
    }

    /// Whether a single directory name is ignored.
    pub fn matches_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether `path` lies inside an ignored directory below `root`.
    ///
    /// Paths outside `root` count as ignored.
    pub fn is_ignored(&self, root: &Path, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return true;
        };

        relative.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| self.matches_name(name))
        })
    }

    /// Iterate over the ignored names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::with_defaults(std::iter::empty::<String>())
    }
}

/// Filesystem operations that trigger a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Write,
    Remove,
    Rename,
}

impl ChangeKind {
    /// Classify a raw notify event kind.
    ///
    /// Access events, metadata-only changes (permissions, timestamps) and
    /// unclassified events yield `None`.
    pub fn from_event_kind(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Create),
            EventKind::Remove(_) => Some(Self::Remove),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Rename),
            EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => Some(Self::Write),
            EventKind::Modify(ModifyKind::Metadata(_) | ModifyKind::Other) => None,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
        }
    }
}

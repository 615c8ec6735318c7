//! Where the file store keeps its data.

use std::path::{Path, PathBuf};

/// Directory holding session records.
pub(crate) const SESSIONS_DIR: &str = "sessions";

/// File holding the current-session pointer.
pub(crate) const CURRENT_FILE: &str = "current_session";

/// Configuration for [`FileSessionStore`](crate::FileSessionStore).
///
/// Layout under `root`:
///
/// ```text
/// <root>/
/// ├── current_session        ← raw session id, mode 0600
/// └── sessions/
///     ├── <session id>       ← JSON record, mode 0600
///     └── ...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base directory, typically `~/.aoj-cli`.
    pub root: PathBuf,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join(SESSIONS_DIR)
    }

    pub fn current_file(&self) -> PathBuf {
        self.root.join(CURRENT_FILE)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

//! Filesystem-backed [`SessionStore`].

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use aoj_core::{Error, Result, ResultExt, Session, SessionId, SessionRecord};

use crate::{SessionScan, SessionStore, StoreConfig};

/// Owner read/write only.
#[cfg(unix)]
const PRIVATE_MODE: u32 = 0o600;

/// Stores each session as a JSON file named after its id, and the current
/// pointer as a plain file holding the id.
///
/// See [`StoreConfig`] for the directory layout.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    config: StoreConfig,
}

impl FileSessionStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the record for `id` (which may or may not exist).
    pub fn session_path(&self, id: &SessionId) -> PathBuf {
        self.config.sessions_dir().join(id.as_str())
    }

    fn ensure_sessions_dir(&self) -> Result<()> {
        let dir = self.config.sessions_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            Error::internal(format!("failed to create directory {}", dir.display())).with_source(e)
        })
    }

    /// Parses one directory entry into a session, or logs why it can't.
    fn load_entry(&self, entry: io::Result<fs::DirEntry>) -> Option<Session> {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read sessions directory entry");
                return None;
            }
        };
        if !entry.file_type().is_ok_and(|t| t.is_file()) {
            return None;
        }

        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        let id = match SessionId::new(&name) {
            Ok(id) => id,
            Err(_) => {
                tracing::warn!(filename = %name, "invalid session file name");
                return None;
            }
        };

        match self.get_by_id(&id) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(
                    session_id = %id.masked(),
                    error = %e.chain(),
                    "failed to load session"
                );
                None
            }
        }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        let id = session.id();
        tracing::debug!(session_id = %id.masked(), "saving session");

        self.ensure_sessions_dir()
            .context("failed to ensure config directory")?;

        let data = SessionRecord::from(session).to_json()?;
        let path = self.session_path(id);
        write_private(&path, &data).context("failed to write session file")?;

        tracing::debug!(
            session_id = %id.masked(),
            file = %path.display(),
            "session saved"
        );
        Ok(())
    }

    fn get_by_id(&self, id: &SessionId) -> Result<Session> {
        tracing::debug!(session_id = %id.masked(), "getting session by ID");

        let path = self.session_path(id);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::not_found("session not found"));
            }
            Err(e) => {
                return Err(Error::internal("failed to read session file").with_source(e));
            }
        };

        SessionRecord::from_json(&data)
            .and_then(SessionRecord::into_session)
            .context("failed to convert session data")
    }

    fn delete(&self, id: &SessionId) -> Result<()> {
        tracing::debug!(session_id = %id.masked(), "deleting session");
        remove_if_exists(&self.session_path(id))
            .map_err(|e| Error::internal("failed to delete session file").with_source(e))
    }

    fn exists(&self, id: &SessionId) -> Result<bool> {
        self.session_path(id)
            .try_exists()
            .map_err(|e| Error::internal("failed to check session file").with_source(e))
    }

    fn set_current(&self, session: &Session) -> Result<()> {
        let id = session.id();
        tracing::debug!(session_id = %id.masked(), "setting current session");

        self.ensure_sessions_dir()
            .context("failed to ensure config directory")?;
        write_private(&self.config.current_file(), id.as_str().as_bytes())
            .context("failed to write current session file")
    }

    fn clear_current(&self) -> Result<()> {
        tracing::debug!("clearing current session");
        remove_if_exists(&self.config.current_file())
            .map_err(|e| Error::internal("failed to remove current session file").with_source(e))
    }

    fn current_id(&self) -> Result<SessionId> {
        let content = match fs::read_to_string(self.config.current_file()) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::not_found("no current session"));
            }
            Err(e) => {
                return Err(
                    Error::internal("failed to read current session file").with_source(e)
                );
            }
        };
        SessionId::new(&content).context("invalid session ID in current session file")
    }

    fn scan(&self) -> Result<SessionScan<'_>> {
        tracing::debug!("listing sessions");

        let dir = self.config.sessions_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Box::new(std::iter::empty()));
            }
            Err(e) => {
                return Err(Error::internal("failed to read sessions directory").with_source(e));
            }
        };

        Ok(Box::new(entries.filter_map(|entry| self.load_entry(entry))))
    }
}

/// Writes `data` to `path` with owner-only permissions.
///
/// The bytes land in a temporary sibling first and are renamed into
/// place, so readers never see a half-written file.
fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = temp_sibling(path);
    write_temp(&tmp, data)
        .and_then(|()| fs::rename(&tmp, path))
        .map_err(|e| {
            let _ = fs::remove_file(&tmp);
            Error::internal(format!("failed to write {}", path.display())).with_source(e)
        })
}

fn write_temp(tmp: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(PRIVATE_MODE);
    }

    let mut file = options.open(tmp)?;

    // `mode` only applies on creation; a stale temp file keeps its old mode.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(PRIVATE_MODE))
            .inspect_err(|e| tracing::error!(error = %e, "failed to set session file permissions"))?;
    }

    file.write_all(data)?;
    file.sync_all()
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

//! The store abstraction: keyed session records plus one pointer slot.
//!
//! Implementors provide the primitive key-value operations. The queries
//! that filter by content (`get_by_username`, `delete_by_username`,
//! `delete_expired`, `list`) are provided on top of [`SessionStore::scan`],
//! which re-reads the store on every call. Stores hold a handful of
//! sessions per local account, so a linear scan is all they need.

use aoj_core::{Error, ErrorKind, Result, ResultExt, Session, SessionId};

/// A lazy, finite pass over every session that loads successfully.
///
/// Each call to [`SessionStore::scan`] starts a new pass; entries that
/// cannot be read are logged and skipped, never yielded as errors.
pub type SessionScan<'a> = Box<dyn Iterator<Item = Session> + 'a>;

/// Durable persistence for sessions and the current-session pointer.
pub trait SessionStore {
    /// Writes (or overwrites) the record keyed by `session.id()`.
    fn save(&self, session: &Session) -> Result<()>;

    /// Loads a session.
    ///
    /// # Errors
    /// [`ErrorKind::NotFound`] if no record exists for `id`.
    fn get_by_id(&self, id: &SessionId) -> Result<Session>;

    /// Removes a record. Removing an absent record succeeds.
    fn delete(&self, id: &SessionId) -> Result<()>;

    fn exists(&self, id: &SessionId) -> Result<bool>;

    /// Points the current slot at `session.id()`.
    ///
    /// Does not save the session; callers must [`save`](Self::save) it
    /// first.
    fn set_current(&self, session: &Session) -> Result<()>;

    /// Empties the current slot. Clearing an empty slot succeeds.
    fn clear_current(&self) -> Result<()>;

    /// Reads the id held by the current slot.
    ///
    /// # Errors
    /// [`ErrorKind::NotFound`] if the slot is empty.
    fn current_id(&self) -> Result<SessionId>;

    /// Starts a fresh pass over all stored sessions.
    fn scan(&self) -> Result<SessionScan<'_>>;

    /// Resolves the current slot to its session.
    ///
    /// The pointer target is not checked beforehand: a pointer to a
    /// deleted record surfaces as the same [`ErrorKind::NotFound`] as an
    /// empty slot.
    fn get_current(&self) -> Result<Session> {
        let id = self.current_id()?;
        self.get_by_id(&id)
    }

    /// The first stored session for `username` that is still valid.
    fn get_by_username(&self, username: &str) -> Result<Session> {
        tracing::debug!(%username, "getting session by username");
        self.scan()
            .context("failed to list sessions")?
            .find(|s| s.username() == username && s.is_valid())
            .ok_or_else(|| Error::not_found("no valid session found for username"))
    }

    /// Deletes every session belonging to `username`.
    ///
    /// Best effort: failures are logged and skipped. Returns how many
    /// records were removed.
    fn delete_by_username(&self, username: &str) -> usize {
        tracing::debug!(%username, "deleting sessions by username");
        let deleted = delete_matching(self, |s| s.username() == username);
        tracing::debug!(%username, deleted, "sessions deleted by username");
        deleted
    }

    /// Deletes every session that is expired right now.
    ///
    /// Same best-effort contract as
    /// [`delete_by_username`](Self::delete_by_username).
    fn delete_expired(&self) -> usize {
        tracing::debug!("deleting expired sessions");
        let deleted = delete_matching(self, Session::is_expired);
        tracing::debug!(deleted, "expired sessions deleted");
        deleted
    }

    /// Whether `id` names a stored, currently valid session.
    ///
    /// A missing record is `Ok(false)`; other load failures propagate.
    fn is_valid(&self, id: &SessionId) -> Result<bool> {
        match self.get_by_id(id) {
            Ok(session) => Ok(session.is_valid()),
            Err(e) if e.is(ErrorKind::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Collects one [`scan`](Self::scan).
    fn list(&self) -> Result<Vec<Session>> {
        Ok(self.scan()?.collect())
    }
}

/// Collects the ids first so deletion never races the pass that found
/// them.
fn delete_matching<S, F>(store: &S, predicate: F) -> usize
where
    S: SessionStore + ?Sized,
    F: Fn(&Session) -> bool,
{
    let doomed: Vec<SessionId> = match store.scan() {
        Ok(scan) => scan.filter(|s| predicate(s)).map(|s| s.id().clone()).collect(),
        Err(e) => {
            tracing::warn!(error = %e.chain(), "failed to list sessions");
            return 0;
        }
    };

    let mut deleted = 0;
    for id in doomed {
        match store.delete(&id) {
            Ok(()) => deleted += 1,
            Err(e) => tracing::warn!(
                session_id = %id.masked(),
                error = %e.chain(),
                "failed to delete session"
            ),
        }
    }
    deleted
}

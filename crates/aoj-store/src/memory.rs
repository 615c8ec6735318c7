//! In-memory [`SessionStore`], for tests and for callers that must not
//! touch the disk.

use std::collections::BTreeMap;

use aoj_core::{Error, Result, Session, SessionId};
use parking_lot::Mutex;

use crate::{SessionScan, SessionStore};

#[derive(Debug, Default)]
struct State {
    /// Keyed by the id string so scans run in a stable order.
    sessions: BTreeMap<String, Session>,
    current: Option<SessionId>,
}

/// A [`SessionStore`] held entirely in process memory.
///
/// Behaves like [`FileSessionStore`](crate::FileSessionStore) minus the
/// durability: same `NotFound` contract, same dangling-pointer behavior.
/// Scans iterate over a snapshot, so deleting during a scan is safe.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<State>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.state.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        tracing::debug!(session_id = %session.id().masked(), "saving session");
        self.state
            .lock()
            .sessions
            .insert(session.id().to_string(), session.clone());
        Ok(())
    }

    fn get_by_id(&self, id: &SessionId) -> Result<Session> {
        self.state
            .lock()
            .sessions
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| Error::not_found("session not found"))
    }

    fn delete(&self, id: &SessionId) -> Result<()> {
        tracing::debug!(session_id = %id.masked(), "deleting session");
        self.state.lock().sessions.remove(id.as_str());
        Ok(())
    }

    fn exists(&self, id: &SessionId) -> Result<bool> {
        Ok(self.state.lock().sessions.contains_key(id.as_str()))
    }

    fn set_current(&self, session: &Session) -> Result<()> {
        tracing::debug!(session_id = %session.id().masked(), "setting current session");
        self.state.lock().current = Some(session.id().clone());
        Ok(())
    }

    fn clear_current(&self) -> Result<()> {
        self.state.lock().current = None;
        Ok(())
    }

    fn current_id(&self) -> Result<SessionId> {
        self.state
            .lock()
            .current
            .clone()
            .ok_or_else(|| Error::not_found("no current session"))
    }

    fn scan(&self) -> Result<SessionScan<'_>> {
        let snapshot: Vec<Session> = self.state.lock().sessions.values().cloned().collect();
        Ok(Box::new(snapshot.into_iter()))
    }
}

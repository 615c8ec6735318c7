//! The persisted form of a [`Session`].
//!
//! On disk a session is a flat JSON object of primitives:
//!
//! ```json
//! {"id":"9f3c…","username":"alice","token":"…",
//!  "expires_at":1767225600,"created_at":1767139200,"last_used":1767139200}
//! ```
//!
//! Timestamps are whole Unix-epoch seconds, so a round trip drops any
//! sub-second part.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, Session, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub username: String,
    pub token: String,
    pub expires_at: i64,
    pub created_at: i64,
    pub last_used: i64,
}

impl SessionRecord {
    /// Encodes the record as JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| Error::internal("failed to encode session data").with_source(e))
    }

    /// Parses a record from JSON bytes.
    ///
    /// # Errors
    /// [`ErrorKind::InvalidInput`](crate::ErrorKind::InvalidInput) if the
    /// bytes are not a well-formed record.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| Error::invalid_input("failed to decode session data").with_source(e))
    }

    /// Rebuilds the entity.
    ///
    /// # Errors
    /// [`ErrorKind::InvalidInput`](crate::ErrorKind::InvalidInput) if `id`
    /// is not a valid [`SessionId`] or a timestamp is out of range.
    pub fn into_session(self) -> Result<Session> {
        let id = SessionId::new(&self.id)?;
        Ok(Session::from_parts(
            id,
            self.username,
            self.token,
            from_epoch(self.expires_at, "expires_at")?,
            from_epoch(self.created_at, "created_at")?,
            from_epoch(self.last_used, "last_used")?,
        ))
    }
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id().to_string(),
            username: session.username().to_string(),
            token: session.token().to_string(),
            expires_at: session.expires_at().timestamp(),
            created_at: session.created_at().timestamp(),
            last_used: session.last_used_at().timestamp(),
        }
    }
}

impl TryFrom<SessionRecord> for Session {
    type Error = Error;

    fn try_from(record: SessionRecord) -> Result<Self> {
        record.into_session()
    }
}

fn from_epoch(secs: i64, field: &'static str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Error::invalid_input(format!("session field {field} is out of range")))
}

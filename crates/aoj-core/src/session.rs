//! The session entity: an authenticated identity valid until an expiry
//! instant.
//!
//! A session tracks:
//! - WHO is logged in (`username`)
//! - WHAT proves it to the judge (`token`, a secret)
//! - WHEN it stops being usable (`expires_at`)
//! - WHEN it was created and last used

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::session_id::mask;
use crate::{Error, Result, SessionId};

/// Lifetime granted to a session by a fresh login or a refresh.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::hours(24);

/// An authenticated identity held locally.
///
/// Fields are private: every mutator also bumps `last_used_at`, and the
/// id is only ever a validated [`SessionId`]. `Clone` produces a fully
/// independent copy.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    username: String,
    token: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    last_used_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session expiring at `expires_at`. Created and last-used
    /// timestamps are set to now.
    pub fn new(
        id: SessionId,
        username: impl Into<String>,
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.into(),
            token: token.into(),
            expires_at,
            created_at: now,
            last_used_at: now,
        }
    }

    /// Creates a session expiring `duration` from now.
    ///
    /// A negative duration yields an already-expired session. An expiry
    /// past the representable range is clamped to it.
    pub fn with_duration(
        id: SessionId,
        username: impl Into<String>,
        token: impl Into<String>,
        duration: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.into(),
            token: token.into(),
            expires_at: offset(now, duration),
            created_at: now,
            last_used_at: now,
        }
    }

    /// Rebuilds a session with every timestamp given explicitly.
    ///
    /// Used when loading a persisted record.
    pub fn from_parts(
        id: SessionId,
        username: impl Into<String>,
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
        last_used_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            token: token.into(),
            expires_at,
            created_at,
            last_used_at,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The secret token. Never log this.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used_at(&self) -> DateTime<Utc> {
        self.last_used_at
    }

    /// `true` once the current instant is strictly after `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        at > self.expires_at
    }

    /// Structurally complete and not expired.
    ///
    /// The id needs no check here: a `SessionId` is valid by construction.
    pub fn is_valid(&self) -> bool {
        !self.username.is_empty() && !self.token.is_empty() && !self.is_expired()
    }

    /// Time left before expiry; negative once expired.
    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Time left before expiry, clamped at zero.
    pub fn remaining_time(&self) -> Duration {
        self.time_until_expiry().max(Duration::zero())
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.created_at
    }

    pub fn time_since_last_use(&self) -> Duration {
        Utc::now() - self.last_used_at
    }

    /// Sets `expires_at` to now + `duration`.
    pub fn refresh(&mut self, duration: Duration) {
        self.expires_at = offset(Utc::now(), duration);
        self.touch();
    }

    /// Extends the expiry by `duration`, counting from the later of now
    /// and the current expiry. An already-expired session is anchored to
    /// now instead of being extended from a past instant.
    pub fn refresh_from_now(&mut self, duration: Duration) {
        let anchor = self.expires_at.max(Utc::now());
        self.expires_at = offset(anchor, duration);
        self.touch();
    }

    /// Replaces the token.
    ///
    /// # Errors
    /// [`ErrorKind::InvalidInput`](crate::ErrorKind::InvalidInput) if
    /// `token` is empty; the session is left unchanged.
    pub fn update_token(&mut self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::invalid_input("session token cannot be empty"));
        }
        self.token = token;
        self.touch();
        Ok(())
    }

    pub fn update_last_used_at(&mut self, at: DateTime<Utc>) {
        self.last_used_at = at;
    }

    /// Marks the session as used right now.
    pub fn touch(&mut self) {
        self.last_used_at = Utc::now();
    }
}

/// `at + duration`, saturating at the bounds of `DateTime<Utc>`.
fn offset(at: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    at.checked_add_signed(duration).unwrap_or(if duration < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("token", &mask(&self.token))
            .field("expires_at", &self.expires_at)
            .field("created_at", &self.created_at)
            .field("last_used_at", &self.last_used_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn session(duration: Duration) -> Session {
        Session::with_duration(
            SessionId::generate().unwrap(),
            "alice",
            "secret-token-value",
            duration,
        )
    }

    #[test]
    fn test_with_duration_sets_expiry_from_now() {
        let s = session(Duration::hours(24));
        assert!(!s.is_expired());
        assert!(s.is_valid());
        assert_eq!(s.created_at(), s.last_used_at());
        assert_eq!(s.expires_at() - s.created_at(), Duration::hours(24));
    }

    #[test]
    fn test_new_uses_explicit_expiry() {
        let at = Utc::now() + Duration::minutes(5);
        let s = Session::new(SessionId::generate().unwrap(), "bob", "t", at);
        assert_eq!(s.expires_at(), at);
    }

    #[test]
    fn test_is_expired_is_strictly_after() {
        let s = session(Duration::hours(1));
        let at = s.expires_at();
        assert!(!s.is_expired_at(at));
        assert!(s.is_expired_at(at + Duration::nanoseconds(1)));
        assert!(!s.is_expired_at(at - Duration::seconds(1)));
    }

    #[test]
    fn test_negative_duration_is_expired_and_invalid() {
        let s = session(Duration::hours(-1));
        assert!(s.is_expired());
        assert!(!s.is_valid());
    }

    #[test]
    fn test_is_valid_requires_username_and_token() {
        let id = SessionId::generate().unwrap();
        let no_user = Session::with_duration(id.clone(), "", "t", Duration::hours(1));
        let no_token = Session::with_duration(id, "alice", "", Duration::hours(1));
        assert!(!no_user.is_valid());
        assert!(!no_token.is_valid());
    }

    #[test]
    fn test_refresh_unexpires_session() {
        let mut s = session(Duration::hours(-2));
        let before = s.last_used_at();
        s.refresh(Duration::hours(1));
        assert!(!s.is_expired());
        assert!(s.last_used_at() >= before);
    }

    #[test]
    fn test_refresh_from_now_extends_live_session_from_expiry() {
        let mut s = session(Duration::hours(2));
        let old_expiry = s.expires_at();
        s.refresh_from_now(Duration::hours(1));
        assert_eq!(s.expires_at(), old_expiry + Duration::hours(1));
    }

    #[test]
    fn test_huge_durations_saturate_instead_of_panicking() {
        let forever = Duration::weeks(52 * 300_000);

        let mut s = session(forever);
        assert_eq!(s.expires_at(), DateTime::<Utc>::MAX_UTC);
        assert!(s.is_valid());

        s.refresh_from_now(Duration::hours(1));
        assert_eq!(s.expires_at(), DateTime::<Utc>::MAX_UTC);

        s.refresh(-forever);
        assert_eq!(s.expires_at(), DateTime::<Utc>::MIN_UTC);
        assert!(s.is_expired());
    }

    #[test]
    fn test_refresh_from_now_anchors_expired_session_to_now() {
        let mut s = session(Duration::hours(-10));
        let before = Utc::now();
        s.refresh_from_now(Duration::hours(1));
        assert!(s.expires_at() >= before + Duration::hours(1));
        assert!(!s.is_expired());
    }

    #[test]
    fn test_update_token_replaces_and_touches() {
        let mut s = session(Duration::hours(1));
        s.update_last_used_at(Utc::now() - Duration::hours(3));
        s.update_token("new-token").unwrap();
        assert_eq!(s.token(), "new-token");
        assert!(s.time_since_last_use() < Duration::minutes(1));
    }

    #[test]
    fn test_update_token_rejects_empty() {
        let mut s = session(Duration::hours(1));
        let err = s.update_token("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(s.token(), "secret-token-value");
    }

    #[test]
    fn test_remaining_time_clamps_at_zero() {
        assert_eq!(session(Duration::hours(-1)).remaining_time(), Duration::zero());
        assert!(session(Duration::hours(1)).remaining_time() > Duration::minutes(59));
        assert!(session(Duration::hours(-1)).time_until_expiry() < Duration::zero());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = session(Duration::hours(1));
        let mut copy = original.clone();
        copy.update_token("changed").unwrap();
        copy.refresh(Duration::hours(48));
        assert_eq!(original.token(), "secret-token-value");
        assert_ne!(original.expires_at(), copy.expires_at());
        assert_eq!(original.id(), copy.id());
    }

    #[test]
    fn test_debug_redacts_token() {
        let s = session(Duration::hours(1));
        let debug = format!("{s:?}");
        assert!(!debug.contains("secret-token-value"));
        assert!(!debug.contains(s.id().as_str()));
        assert!(debug.contains("alice"));
    }
}

//! Login and logout sequences over a gateway and a store.
//!
//! Workflows own their collaborators, passed in at construction, so tests
//! can hand in a [`MemorySessionStore`](aoj_store::MemorySessionStore)
//! and a fake gateway. Each step runs only if the previous one succeeded.

use std::fmt;

use aoj_auth::AuthGateway;
use aoj_core::{Error, ErrorKind, Result, ResultExt, Session, SessionId};
use aoj_store::SessionStore;

/// Credentials for one login attempt.
///
/// `Debug` omits the password.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The trimmed username and the password as given. Neither may be
    /// blank.
    fn validate(&self) -> Result<(&str, &str)> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(Error::invalid_input("username is required"));
        }
        if self.password.trim().is_empty() {
            return Err(Error::invalid_input("password is required"));
        }
        Ok((username, &self.password))
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What a successful login produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Username as confirmed by the judge.
    pub username: String,
    /// Id of the stored session, now the current one.
    pub session_id: SessionId,
}

/// Authenticate, persist the session, then make it current.
///
/// A failed save never reaches `set_current`, so the pointer never names
/// an unsaved session. A failed `set_current` after a successful save is
/// reported as an error and the saved record is kept.
pub struct LoginWorkflow<A, S> {
    gateway: A,
    store: S,
}

impl<A: AuthGateway, S: SessionStore> LoginWorkflow<A, S> {
    pub fn new(gateway: A, store: S) -> Self {
        Self { gateway, store }
    }

    pub fn gateway(&self) -> &A {
        &self.gateway
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn execute(&self, request: LoginRequest) -> Result<LoginOutcome> {
        let (username, password) = request.validate().inspect_err(|e| {
            tracing::warn!(error = %e, "login request rejected");
        })?;

        let session = self
            .gateway
            .login(username, password)
            .await
            .inspect_err(|e| {
                tracing::warn!(%username, error = %e.chain(), "authentication failed");
            })
            .context("authentication failed")?;

        self.store
            .save(&session)
            .inspect_err(|e| {
                tracing::error!(
                    session_id = %session.id().masked(),
                    error = %e.chain(),
                    "failed to save session"
                );
            })
            .context("failed to save session")?;

        self.store
            .set_current(&session)
            .inspect_err(|e| {
                tracing::error!(
                    session_id = %session.id().masked(),
                    error = %e.chain(),
                    "session saved but could not be made current"
                );
            })
            .context("failed to set current session")?;

        tracing::info!(
            username = %session.username(),
            session_id = %session.id().masked(),
            "login complete"
        );

        Ok(LoginOutcome {
            username: session.username().to_string(),
            session_id: session.id().clone(),
        })
    }
}

/// End the current session remotely and locally.
///
/// The remote logout is best effort: if it fails the error is logged and
/// the local record and pointer are removed anyway.
pub struct LogoutWorkflow<A, S> {
    gateway: A,
    store: S,
}

impl<A: AuthGateway, S: SessionStore> LogoutWorkflow<A, S> {
    pub fn new(gateway: A, store: S) -> Self {
        Self { gateway, store }
    }

    pub fn gateway(&self) -> &A {
        &self.gateway
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the username that was logged out.
    ///
    /// # Errors
    /// [`ErrorKind::NotFound`] if there is no current session.
    pub async fn execute(&self) -> Result<String> {
        let session = self
            .store
            .get_current()
            .context("failed to get current session")?;

        if let Err(e) = self.gateway.logout(&session).await {
            tracing::warn!(
                session_id = %session.id().masked(),
                error = %e.chain(),
                "remote logout failed, removing local session anyway"
            );
        }

        self.store
            .delete(session.id())
            .context("failed to delete session")?;
        self.store
            .clear_current()
            .context("failed to clear current session")?;

        tracing::info!(username = %session.username(), "logout complete");
        Ok(session.username().to_string())
    }
}

/// The current session, checked for use by an authenticated command.
///
/// Marks the session as used and writes it back.
///
/// # Errors
/// [`ErrorKind::Unauthorized`] if there is no current session, if its
/// pointer or record cannot be decoded, or if it is no longer valid.
pub fn current_session<S: SessionStore + ?Sized>(store: &S) -> Result<Session> {
    let mut session = match store.get_current() {
        Ok(session) => session,
        Err(e) if e.is(ErrorKind::NotFound) => {
            return Err(
                Error::unauthorized("no active session found, please login first").with_source(e),
            );
        }
        Err(e) if e.is(ErrorKind::InvalidInput) => {
            tracing::warn!(error = %e.chain(), "current session is unreadable");
            return Err(
                Error::unauthorized("current session is corrupted, please login again")
                    .with_source(e),
            );
        }
        Err(e) => return Err(e.context("failed to get current session")),
    };

    if !session.is_valid() {
        return Err(Error::unauthorized(
            "session expired or invalid, please login again",
        ));
    }

    session.touch();
    store.save(&session).context("failed to update session")?;
    Ok(session)
}

/// What [`prune`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Expired records deleted.
    pub deleted: usize,
    /// Whether the current pointer was cleared because its target was gone.
    pub cleared_current: bool,
}

/// Deletes expired sessions and clears the current pointer if it no
/// longer resolves.
///
/// A pointer that does not parse as a session id counts as dangling.
pub fn prune<S: SessionStore + ?Sized>(store: &S) -> Result<PruneReport> {
    let deleted = store.delete_expired();

    let dangling = match store.current_id() {
        Ok(id) => !store.exists(&id).context("failed to check current session")?,
        Err(e) if e.is(ErrorKind::NotFound) => false,
        Err(e) if e.is(ErrorKind::InvalidInput) => true,
        Err(e) => return Err(e),
    };

    if dangling {
        store
            .clear_current()
            .context("failed to clear current session")?;
        tracing::info!("cleared dangling current session pointer");
    }

    Ok(PruneReport {
        deleted,
        cleared_current: dangling,
    })
}

//! The remote authentication boundary.

use std::future::Future;

use aoj_core::{DEFAULT_SESSION_DURATION, Error, Result, ResultExt, Session, SessionId};

/// Talks to the judge on behalf of a local session.
///
/// Implementations are shared by reference across the login and logout
/// workflows, so they must be `Send + Sync`. Each call is independent;
/// none of them retries.
///
/// # Example
///
/// ```rust
/// use aoj_auth::AuthGateway;
/// use aoj_core::{Error, Result, Session, SessionId};
///
/// /// Accepts a single hard-coded account.
/// struct FixedGateway;
///
/// impl AuthGateway for FixedGateway {
///     async fn login(&self, username: &str, password: &str) -> Result<Session> {
///         if username != "alice" || password != "secret" {
///             return Err(Error::unauthorized("invalid username or password"));
///         }
///         Ok(Session::with_duration(
///             SessionId::generate()?,
///             username,
///             "token",
///             chrono::Duration::hours(1),
///         ))
///     }
///
///     async fn logout(&self, _session: &Session) -> Result<()> {
///         Ok(())
///     }
///
///     async fn validate_session(&self, session: &Session) -> Result<bool> {
///         Ok(session.is_valid())
///     }
/// }
/// ```
pub trait AuthGateway: Send + Sync {
    /// Exchanges credentials for a fresh session.
    ///
    /// The returned session carries a locally generated id, the username
    /// the judge confirmed, and the judge's token.
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session>> + Send;

    /// Tells the judge to end the session.
    ///
    /// Only a transport failure is an error; a non-success status is
    /// logged and otherwise ignored.
    fn logout(&self, session: &Session) -> impl Future<Output = Result<()>> + Send;

    /// Checks whether the judge still honours the session.
    ///
    /// A locally expired session is `Ok(false)` without a remote call.
    fn validate_session(&self, session: &Session) -> impl Future<Output = Result<bool>> + Send;

    /// Mints a replacement session for a still-valid one.
    ///
    /// The replacement has a new id, the same username and token, and a
    /// full [`DEFAULT_SESSION_DURATION`] lifetime. The original session
    /// is left untouched.
    fn refresh_session(&self, session: &Session) -> impl Future<Output = Result<Session>> + Send {
        async move {
            let valid = self
                .validate_session(session)
                .await
                .context("failed to validate session for refresh")?;
            if !valid {
                return Err(Error::unauthorized("session is no longer valid"));
            }

            let refreshed = Session::with_duration(
                SessionId::generate()?,
                session.username(),
                session.token(),
                DEFAULT_SESSION_DURATION,
            );

            tracing::info!(
                old_session = %session.id().masked(),
                new_session = %refreshed.id().masked(),
                "session refreshed"
            );

            Ok(refreshed)
        }
    }
}

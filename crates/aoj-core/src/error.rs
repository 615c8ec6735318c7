//! Error types shared by every aoj crate.
//!
//! Every failure carries an [`ErrorKind`]. Callers branch on the kind
//! (for example "no current session yet" is [`ErrorKind::NotFound`]),
//! not on the message. Adding context with [`Error::context`] produces a
//! new error whose kind is copied from the wrapped one, so the kind
//! survives any number of layers.

use std::borrow::Cow;
use std::fmt;

/// Classification of a failure.
///
/// The set is fixed: store, gateway, and workflow errors all map onto
/// one of these nine kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input (bad session id, empty username, ...).
    InvalidInput,

    /// Credentials were rejected or no usable session exists.
    Unauthorized,

    /// The requested record or pointer does not exist.
    NotFound,

    /// The remote service could not be reached.
    NetworkError,

    /// The remote service answered with a server-side failure.
    ServiceUnavailable,

    /// Anything unexpected: local I/O, encoding, unknown remote status.
    InternalServer,

    Conflict,

    Forbidden,

    Timeout,
}

impl ErrorKind {
    /// Stable machine-readable code, e.g. `"NOT_FOUND"`.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::NetworkError => "NETWORK_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::InternalServer => "INTERNAL_SERVER",
            Self::Conflict => "CONFLICT",
            Self::Forbidden => "FORBIDDEN",
            Self::Timeout => "TIMEOUT",
        }
    }

    /// Returns `true` for failures the user may simply try again.
    ///
    /// Nothing in aoj retries on its own; this only drives the wording of
    /// messages shown to the user.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::ServiceUnavailable | Self::Timeout
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by every fallible aoj operation.
///
/// `Display` prints only this layer's message; walk
/// [`std::error::Error::source`] (or use [`Error::chain`]) for the full
/// story.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxError>,
}

/// Shorthand for `Result<T, aoj_core::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn network(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NetworkError, message)
    }

    pub fn service_unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServer, message)
    }

    /// Attaches the underlying cause.
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Wraps `self` under a new message, keeping its kind.
    pub fn context(self, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: self.kind,
            message: message.into(),
            source: Some(Box::new(self)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` if this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Renders the message followed by every cause, joined by `": "`.
    pub fn chain(&self) -> String {
        let mut out = self.message.to_string();
        let mut next = std::error::Error::source(self);
        while let Some(cause) = next {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            next = cause.source();
        }
        out
    }
}

/// Adds [`context`](ResultExt::context) to `Result<T, Error>`.
pub trait ResultExt<T> {
    /// Wraps the error (if any) under `message`, keeping its kind.
    fn context(self, message: impl Into<Cow<'static, str>>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, message: impl Into<Cow<'static, str>>) -> Result<T> {
        self.map_err(|e| e.context(message))
    }
}

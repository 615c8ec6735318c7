//! Core domain types for aoj.
//!
//! This crate defines the vocabulary every other layer speaks:
//!
//! - **Errors** ([`Error`], [`ErrorKind`]): one error type with a fixed
//!   kind taxonomy. Wrapping an error with context keeps its kind.
//! - **Identity** ([`SessionId`]): the validated hex handle of a stored
//!   session.
//! - **Sessions** ([`Session`]): who is logged in, with which token,
//!   until when.
//! - **Records** ([`SessionRecord`]): the flat form a session takes on
//!   disk.
//!
//! # Architecture
//!
//! ```text
//! CLI (aoj-cli) → Workflows (aoj) → Store (aoj-store) / Gateway (aoj-auth)
//!                                        ↘            ↙
//!                                     Core (this crate)
//! ```

mod error;
mod record;
mod session;
mod session_id;

pub use error::{Error, ErrorKind, Result, ResultExt};
pub use record::SessionRecord;
pub use session::{DEFAULT_SESSION_DURATION, Session};
pub use session_id::SessionId;

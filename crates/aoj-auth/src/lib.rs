//! Authentication against the AOJ judge service.
//!
//! The [`AuthGateway`] trait is the boundary between local session state
//! and the remote judge: it turns credentials into a [`Session`], checks
//! whether a session is still honoured remotely, and mints refreshed
//! sessions. [`AojAuthGateway`] implements it over HTTP.
//!
//! Every remote failure is mapped onto an [`ErrorKind`]:
//!
//! | Remote outcome | Kind |
//! |---|---|
//! | 200 | success |
//! | 400 | `InvalidInput` |
//! | 401 | `Unauthorized` |
//! | 500 | `ServiceUnavailable` |
//! | other status | `InternalServer` |
//! | transport failure | `NetworkError` |
//!
//! Nothing is retried; a failed request surfaces immediately.
//!
//! [`Session`]: aoj_core::Session
//! [`ErrorKind`]: aoj_core::ErrorKind

mod aoj;
mod config;
mod gateway;
mod wire;

pub use aoj::AojAuthGateway;
pub use config::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, GatewayConfig};
pub use gateway::AuthGateway;
pub use wire::{LoginRequest, LoginResponse};

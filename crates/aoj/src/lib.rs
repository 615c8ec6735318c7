//! # aoj
//!
//! Session management for the AOJ judge command line.
//!
//! This crate ties the layers together: [`aoj_auth`] talks to the judge,
//! [`aoj_store`] keeps sessions on disk, and the workflows here sequence
//! the two.
//!
//! ```text
//!   LoginWorkflow ──► AuthGateway::login ──► SessionStore::save ──► set_current
//!   LogoutWorkflow ─► get_current ──► AuthGateway::logout ──► delete ──► clear_current
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aoj::prelude::*;
//!
//! # async fn run() -> aoj::Result<()> {
//! let config = AojConfig::load(None)?;
//! let workflow = LoginWorkflow::new(
//!     AojAuthGateway::new(config.gateway_config())?,
//!     FileSessionStore::new(config.store_config()),
//! );
//! let outcome = workflow.execute(LoginRequest::new("alice", "secret")).await?;
//! println!("logged in as {}", outcome.username);
//! # Ok(())
//! # }
//! ```

mod config;
mod workflow;

pub use aoj_auth::{AojAuthGateway, AuthGateway, GatewayConfig};
pub use aoj_core::{
    DEFAULT_SESSION_DURATION, Error, ErrorKind, Result, ResultExt, Session, SessionId,
};
pub use aoj_store::{FileSessionStore, MemorySessionStore, SessionScan, SessionStore, StoreConfig};
pub use config::{AojConfig, CONFIG_FILE, DEFAULT_CONFIG_DIR, default_config_dir};
pub use workflow::{
    LoginOutcome, LoginRequest, LoginWorkflow, LogoutWorkflow, PruneReport, current_session,
    prune,
};

pub mod prelude {
    pub use crate::{
        AojAuthGateway, AojConfig, AuthGateway, Error, ErrorKind, FileSessionStore, LoginOutcome,
        LoginRequest, LoginWorkflow, LogoutWorkflow, MemorySessionStore, Result, Session,
        SessionId, SessionStore, current_session, prune,
    };
}

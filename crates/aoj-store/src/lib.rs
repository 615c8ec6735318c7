//! Session persistence for aoj.
//!
//! This crate keeps sessions between process invocations:
//!
//! 1. **Records**: one per [`SessionId`](aoj_core::SessionId), holding a
//!    serialized [`Session`](aoj_core::Session).
//! 2. **Current pointer**: a single slot naming the session that the
//!    rest of the tool should act as. It references a record; it never
//!    owns one.
//!
//! The [`SessionStore`] trait describes both. Two implementations ship:
//! [`FileSessionStore`] (the real one, under `~/.aoj-cli`) and
//! [`MemorySessionStore`] (for tests and dry runs).
//!
//! # Concurrency note
//!
//! Nothing here locks across processes. Two invocations touching the same
//! directory can interleave saves, deletes, and pointer updates. Each
//! individual file write is atomic (write to a temporary sibling, then
//! rename), which is the only guarantee offered.

mod config;
mod file;
mod memory;
mod store;

pub use config::StoreConfig;
pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
pub use store::{SessionScan, SessionStore};

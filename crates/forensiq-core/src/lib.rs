//! ForensIQ core — types, configuration, and session-id storage shared by the
//! client library and the CLI.
//!
//! - **types**: session id, interaction kinds/records, session context
//! - **config**: `~/.forensiq/config.json` schema + loader
//! - **session**: durable storage slot for the active session id

pub mod config;
pub mod session;
pub mod types;
pub mod utils;

pub use session::{FileIdStore, IdStore, MemoryIdStore};
pub use types::{InteractionKind, InteractionRecord, NewInteraction, SessionContext, SessionId};

//! Session-id persistence.
//!
//! The client keeps exactly one session id per storage scope. It is only ever
//! touched through [`IdStore`]; `SessionClient` in `forensiq-client` owns the
//! lifecycle (create on miss, replace when the server forgets it, explicit
//! clear).
//!
//! # Disk format
//!
//! `~/.forensiq/state.json`, a JSON object with the id under
//! [`store::SESSION_ID_KEY`].

pub mod store;

pub use store::{FileIdStore, IdStore, MemoryIdStore, SESSION_ID_KEY};

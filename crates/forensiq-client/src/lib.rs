//! Session-tracking client for the ForensIQ backend.
//!
//! # Architecture
//!
//! - [`traits::SessionApi`] — one async method per session-service endpoint
//! - [`http_api::HttpSessionApi`] — `reqwest` implementation of that trait
//! - [`session_client::SessionClient`] — lazy session provisioning plus
//!   best-effort logging, history, and context calls
//! - [`outcome::Outcome`] — neutral value + optional [`error::SessionError`]
//! - [`session_client::create_client`] — convenience builder from config

pub mod error;
pub mod http_api;
pub mod outcome;
pub mod session_client;
pub mod traits;

pub use error::SessionError;
pub use http_api::HttpSessionApi;
pub use outcome::Outcome;
pub use session_client::{create_client, create_client_with_store, SessionClient};
pub use traits::SessionApi;

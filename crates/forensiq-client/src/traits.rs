//! Session service trait — the seam between `SessionClient` and the backend.
//!
//! `HttpSessionApi` in `http_api.rs` is the production implementation; tests
//! may swap in anything else.

use async_trait::async_trait;
use forensiq_core::types::{InteractionRecord, NewInteraction, SessionContext, SessionId};

use crate::error::SessionError;

/// One method per endpoint of the session service.
///
/// Implementations report failures as `Err`; turning those into neutral values
/// is `SessionClient`'s job, not the transport's.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// `GET /sessions/{id}`. `Ok(false)` means the server does not know the id
    /// (missing or expired).
    async fn session_exists(&self, id: &SessionId) -> Result<bool, SessionError>;

    /// `POST /sessions`. Returns the freshly issued id.
    async fn create_session(&self, user_id: Option<&str>) -> Result<SessionId, SessionError>;

    /// `POST /sessions/{id}/interactions`.
    async fn append_interaction(
        &self,
        id: &SessionId,
        interaction: &NewInteraction,
    ) -> Result<(), SessionError>;

    /// `GET /sessions/{id}/history?limit=N`, most recent first.
    async fn fetch_history(
        &self,
        id: &SessionId,
        limit: usize,
    ) -> Result<Vec<InteractionRecord>, SessionError>;

    /// `PUT /sessions/{id}/context`.
    async fn replace_context(
        &self,
        id: &SessionId,
        context: &SessionContext,
    ) -> Result<(), SessionError>;

    /// `GET /sessions/{id}/context`.
    async fn fetch_context(&self, id: &SessionId) -> Result<SessionContext, SessionError>;

    /// `DELETE /sessions/{id}`.
    async fn delete_session(&self, id: &SessionId) -> Result<(), SessionError>;

    /// Where requests go, for logging.
    fn endpoint(&self) -> &str;
}

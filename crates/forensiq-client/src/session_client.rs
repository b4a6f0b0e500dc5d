//! `SessionClient` — lazily provisioned session id plus best-effort logging.
//!
//! # Session id lifecycle
//!
//! 1. **Create on miss**: no stored id → `POST /sessions`, persist the result.
//! 2. **Invalidate on 404**: a stored id the server no longer knows (or that
//!    cannot be validated) is replaced by a freshly provisioned one.
//! 3. **Explicit clear**: [`SessionClient::clear_session`] forgets the local id;
//!    [`SessionClient::end_session`] also deletes it server-side.
//!
//! With exclusive provisioning on, only creating (and ending) a session is
//! serialized; validating a stored id is not.
//!
//! Every operation returns an [`Outcome`]: failures degrade to a neutral value
//! and are logged at `warn`, never propagated.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use forensiq_core::config::Config;
use forensiq_core::session::{FileIdStore, IdStore};
use forensiq_core::types::{InteractionRecord, NewInteraction, SessionContext, SessionId};
use forensiq_core::utils::expand_home;

use crate::error::SessionError;
use crate::http_api::HttpSessionApi;
use crate::outcome::Outcome;
use crate::traits::SessionApi;

/// Attaches user activity to a server-side session without ever getting in the
/// way of the action being logged.
pub struct SessionClient {
    api: Arc<dyn SessionApi>,
    store: Arc<dyn IdStore>,
    user_id: Option<String>,
    /// In-flight guard: while held, nobody else provisions or ends the session.
    provisioning: Option<Mutex<()>>,
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("endpoint", &self.api.endpoint())
            .field("user_id", &self.user_id)
            .field("exclusive_provisioning", &self.provisioning.is_some())
            .finish()
    }
}

impl SessionClient {
    /// Create a client over any API/store pair. Exclusive provisioning is on.
    pub fn new(api: Arc<dyn SessionApi>, store: Arc<dyn IdStore>) -> Self {
        SessionClient {
            api,
            store,
            user_id: None,
            provisioning: Some(Mutex::new(())),
        }
    }

    /// Identify the user when provisioning new sessions.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// When disabled, concurrent first-time callers may each provision their
    /// own session; the last one persisted wins.
    pub fn with_exclusive_provisioning(mut self, enabled: bool) -> Self {
        self.provisioning = enabled.then(|| Mutex::new(()));
        self
    }

    pub fn endpoint(&self) -> &str {
        self.api.endpoint()
    }

    /// The locally persisted id, without asking the server.
    pub fn stored_session_id(&self) -> Option<SessionId> {
        self.store.load()
    }

    /// Return a session id the server accepts, provisioning one if needed.
    ///
    /// `None` means "logging unavailable this round". At most one create call
    /// is made; nothing is retried.
    pub async fn ensure_session_id(&self) -> Outcome<Option<SessionId>> {
        match self.resolve().await {
            Ok(id) => Outcome::done(Some(id)),
            Err(e) => {
                warn!(op = "ensure_session_id", error = %e, "Session unavailable");
                Outcome::unavailable(e)
            }
        }
    }

    /// Validate the stored id without the guard; provision under it.
    ///
    /// Callers that lost the race for the guard pick up whatever id the
    /// winner persisted instead of creating another session.
    async fn resolve(&self) -> Result<SessionId, SessionError> {
        let seen = self.store.load();
        if let Some(id) = &seen {
            match self.api.session_exists(id).await {
                Ok(true) => {
                    debug!(session = %id, "Stored session is valid");
                    return Ok(id.clone());
                }
                Ok(false) => {
                    info!(session = %id, "Stored session unknown to server, provisioning a new one");
                }
                Err(e) => {
                    warn!(session = %id, error = %e, "Could not validate stored session, provisioning a new one");
                }
            }
        }

        let _guard = self.lock_provisioning().await;

        if let Some(current) = self.store.load() {
            if seen.as_ref() != Some(&current) {
                debug!(session = %current, "Session provisioned by a concurrent caller");
                return Ok(current);
            }
        }

        let id = self.api.create_session(self.user_id.as_deref()).await?;
        info!(session = %id, endpoint = self.api.endpoint(), "Provisioned session");

        if let Err(e) = self.store.save(&id) {
            warn!(session = %id, error = %e, "Failed to persist session id");
        }
        Ok(id)
    }

    async fn lock_provisioning(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.provisioning {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    /// Append one interaction to the active session's log.
    ///
    /// The boolean is diagnostic only; callers normally ignore it.
    pub async fn log_interaction(&self, interaction: &NewInteraction) -> Outcome<bool> {
        let id = match self.resolve().await {
            Ok(id) => id,
            Err(e) => {
                warn!(op = "log_interaction", kind = %interaction.kind(), error = %e, "No session, interaction dropped");
                return Outcome::unavailable(e);
            }
        };

        match self.api.append_interaction(&id, interaction).await {
            Ok(()) => Outcome::done(true),
            Err(e) => {
                warn!(op = "log_interaction", session = %id, kind = %interaction.kind(), error = %e, "Interaction not logged");
                Outcome::unavailable(e)
            }
        }
    }

    /// Up to `limit` most recent interactions, newest first.
    ///
    /// A fresh snapshot on every call. `limit == 0` yields an empty list
    /// without touching the network.
    pub async fn get_history(&self, limit: usize) -> Outcome<Vec<InteractionRecord>> {
        if limit == 0 {
            return Outcome::done(Vec::new());
        }

        let id = match self.resolve().await {
            Ok(id) => id,
            Err(e) => {
                warn!(op = "get_history", error = %e, "No session, returning empty history");
                return Outcome::unavailable(e);
            }
        };

        match self.api.fetch_history(&id, limit).await {
            Ok(mut history) => {
                if history.len() > limit {
                    debug!(received = history.len(), limit, "Server sent more history than asked, truncating");
                    history.truncate(limit);
                }
                Outcome::done(history)
            }
            Err(e) => {
                warn!(op = "get_history", session = %id, error = %e, "History unavailable");
                Outcome::unavailable(e)
            }
        }
    }

    /// Replace the server-side context with `context`. Last write wins.
    pub async fn update_context(&self, context: &SessionContext) -> Outcome<bool> {
        let id = match self.resolve().await {
            Ok(id) => id,
            Err(e) => {
                warn!(op = "update_context", error = %e, "No session, context not saved");
                return Outcome::unavailable(e);
            }
        };

        match self.api.replace_context(&id, context).await {
            Ok(()) => Outcome::done(true),
            Err(e) => {
                warn!(op = "update_context", session = %id, error = %e, "Context not saved");
                Outcome::unavailable(e)
            }
        }
    }

    /// Read back the server-side context.
    pub async fn get_context(&self) -> Outcome<Option<SessionContext>> {
        let id = match self.resolve().await {
            Ok(id) => id,
            Err(e) => {
                warn!(op = "get_context", error = %e, "No session, context unavailable");
                return Outcome::unavailable(e);
            }
        };

        match self.api.fetch_context(&id).await {
            Ok(context) => Outcome::done(Some(context)),
            Err(e) => {
                warn!(op = "get_context", session = %id, error = %e, "Context unavailable");
                Outcome::unavailable(e)
            }
        }
    }

    /// Forget the local session id. The server is not told.
    pub fn clear_session(&self) -> Outcome<()> {
        match self.store.clear() {
            Ok(()) => {
                debug!("Cleared local session id");
                Outcome::done(())
            }
            Err(e) => {
                warn!(op = "clear_session", error = %e, "Failed to clear local session id");
                Outcome::unavailable(e.into())
            }
        }
    }

    /// Delete the stored session server-side, then forget it locally.
    ///
    /// The local id is cleared even if the delete fails. Returns whether the
    /// server confirmed the delete; `false` without error if nothing was stored.
    pub async fn end_session(&self) -> Outcome<bool> {
        let _guard = self.lock_provisioning().await;
        let Some(id) = self.store.load() else {
            return Outcome::done(false);
        };

        let remote = self.api.delete_session(&id).await;
        let local = self.clear_session();

        match (remote, local.into_parts().1) {
            (Ok(()), None) => {
                info!(session = %id, "Ended session");
                Outcome::done(true)
            }
            (Ok(()), Some(e)) => Outcome::degraded(true, e),
            (Err(e), _) => {
                warn!(op = "end_session", session = %id, error = %e, "Server-side delete failed");
                Outcome::unavailable(e)
            }
        }
    }
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build a `SessionClient` from configuration: HTTP API + file-backed id store.
pub fn create_client(config: &Config) -> Result<SessionClient, SessionError> {
    let store = FileIdStore::new(Some(expand_home(&config.session.state_file)));
    debug!(state_file = %store.path().display(), "Using file-backed session store");
    create_client_with_store(config, Arc::new(store))
}

/// Build a `SessionClient` from configuration over a caller-chosen id store.
pub fn create_client_with_store(
    config: &Config,
    store: Arc<dyn IdStore>,
) -> Result<SessionClient, SessionError> {
    let api = HttpSessionApi::new(&config.api)?;
    debug!(endpoint = api.endpoint(), "Creating session client");

    let mut client = SessionClient::new(Arc::new(api), store)
        .with_exclusive_provisioning(config.session.exclusive_provisioning);
    if let Some(user_id) = &config.api.user_id {
        client = client.with_user_id(user_id.clone());
    }
    Ok(client)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

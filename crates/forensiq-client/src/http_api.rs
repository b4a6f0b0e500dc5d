//! HTTP implementation of [`SessionApi`] for the ForensIQ backend.
//!
//! Talks JSON over `reqwest` to the `/sessions` routes hanging off the
//! configured base URL (by default `http://localhost:8000/api`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use forensiq_core::config::ApiConfig;
use forensiq_core::types::{InteractionRecord, NewInteraction, SessionContext, SessionId};

use crate::error::SessionError;
use crate::traits::SessionApi;

// ─────────────────────────────────────────────
// Wire payloads
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    user_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct CreateSessionResponse {
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    history: Vec<InteractionRecord>,
}

#[derive(Serialize)]
struct ContextUpdateRequest<'a> {
    context_data: &'a SessionContext,
}

#[derive(Deserialize)]
struct ContextResponse {
    context: SessionContext,
}

/// `{"success": bool, ...}` acknowledgement most write routes answer with.
#[derive(Deserialize)]
struct Ack {
    #[serde(default)]
    success: Option<bool>,
}

// ─────────────────────────────────────────────
// HttpSessionApi
// ─────────────────────────────────────────────

/// [`SessionApi`] over HTTP.
///
/// The request timeout lives on the `reqwest` client; nothing above this
/// layer enforces one.
pub struct HttpSessionApi {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// Parsed base URL; always usable as a base for path segments.
    base_url: Url,
    endpoint: String,
}

impl std::fmt::Debug for HttpSessionApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSessionApi")
            .field("base_url", &self.endpoint)
            .finish()
    }
}

impl HttpSessionApi {
    /// Build from the `api` config section.
    pub fn new(config: &ApiConfig) -> Result<Self, SessionError> {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        Self::with_timeout(&config.base_url, timeout)
    }

    /// Build against an explicit base URL. `None` disables the request timeout.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, SessionError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| SessionError::Config(format!("invalid base URL '{}': {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(SessionError::Config(format!(
                "base URL '{}' cannot carry a path",
                base_url
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SessionError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpSessionApi {
            client,
            endpoint: base_url.trim_end_matches('/').to_string(),
            base_url: parsed,
        })
    }

    /// Append percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `cannot_be_a_base` was rejected in the constructor.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Turn a non-2xx response into [`SessionError::Status`].
async fn ensure_success(response: Response) -> Result<Response, SessionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    Err(SessionError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Accept a 2xx write unless its body explicitly says `"success": false`.
async fn read_ack(response: Response) -> Result<(), SessionError> {
    let body = response.text().await?;
    match serde_json::from_str::<Ack>(&body) {
        Ok(Ack {
            success: Some(false),
        }) => Err(SessionError::Rejected),
        _ => Ok(()),
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn session_exists(&self, id: &SessionId) -> Result<bool, SessionError> {
        let url = self.url(&["sessions", id.as_str()]);
        debug!(session = %id, "Validating session");

        let response = self.client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        ensure_success(response).await?;
        Ok(true)
    }

    async fn create_session(&self, user_id: Option<&str>) -> Result<SessionId, SessionError> {
        let url = self.url(&["sessions"]);
        debug!(user_id = user_id.unwrap_or("-"), "Creating session");

        let response = self
            .client
            .post(url)
            .json(&CreateSessionRequest { user_id })
            .send()
            .await?;
        let body: CreateSessionResponse = ensure_success(response).await?.json().await?;

        body.session_id
            .and_then(SessionId::new)
            .ok_or_else(|| SessionError::Malformed("create response has no session_id".into()))
    }

    async fn append_interaction(
        &self,
        id: &SessionId,
        interaction: &NewInteraction,
    ) -> Result<(), SessionError> {
        let url = self.url(&["sessions", id.as_str(), "interactions"]);
        debug!(session = %id, kind = %interaction.kind(), "Appending interaction");

        let response = self.client.post(url).json(interaction).send().await?;
        read_ack(ensure_success(response).await?).await
    }

    async fn fetch_history(
        &self,
        id: &SessionId,
        limit: usize,
    ) -> Result<Vec<InteractionRecord>, SessionError> {
        let mut url = self.url(&["sessions", id.as_str(), "history"]);
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        debug!(session = %id, limit, "Fetching history");

        let response = self.client.get(url).send().await?;
        let body: HistoryResponse = ensure_success(response).await?.json().await?;
        Ok(body.history)
    }

    async fn replace_context(
        &self,
        id: &SessionId,
        context: &SessionContext,
    ) -> Result<(), SessionError> {
        let url = self.url(&["sessions", id.as_str(), "context"]);
        debug!(session = %id, keys = context.len(), "Replacing context");

        let response = self
            .client
            .put(url)
            .json(&ContextUpdateRequest {
                context_data: context,
            })
            .send()
            .await?;
        read_ack(ensure_success(response).await?).await
    }

    async fn fetch_context(&self, id: &SessionId) -> Result<SessionContext, SessionError> {
        let url = self.url(&["sessions", id.as_str(), "context"]);
        debug!(session = %id, "Fetching context");

        let response = self.client.get(url).send().await?;
        let body: ContextResponse = ensure_success(response).await?.json().await?;
        Ok(body.context)
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), SessionError> {
        let url = self.url(&["sessions", id.as_str()]);
        debug!(session = %id, "Deleting session");

        let response = self.client.delete(url).send().await?;
        read_ack(ensure_success(response).await?).await
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use forensiq_core::types::InteractionKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn id(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    async fn api_for(server: &MockServer) -> HttpSessionApi {
        HttpSessionApi::with_timeout(&server.uri(), Some(Duration::from_secs(5))).unwrap()
    }

    // ── URL building ──

    #[test]
    fn test_url_with_prefix_and_trailing_slash() {
        let api = HttpSessionApi::with_timeout("http://localhost:8000/api/", None).unwrap();
        assert_eq!(
            api.url(&["sessions", "abc", "history"]).as_str(),
            "http://localhost:8000/api/sessions/abc/history"
        );
        assert_eq!(api.endpoint(), "http://localhost:8000/api");
    }

    #[test]
    fn test_url_without_prefix() {
        let api = HttpSessionApi::with_timeout("http://localhost:8000", None).unwrap();
        assert_eq!(
            api.url(&["sessions"]).as_str(),
            "http://localhost:8000/sessions"
        );
    }

    #[test]
    fn test_url_encodes_segments() {
        let api = HttpSessionApi::with_timeout("http://localhost:8000/api", None).unwrap();
        let url = api.url(&["sessions", "a/b c"]);
        assert_eq!(url.path(), "/api/sessions/a%2Fb%20c");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpSessionApi::with_timeout("not a url", None).unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));

        let err = HttpSessionApi::with_timeout("mailto:someone@example.org", None).unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
    }

    #[test]
    fn test_new_from_config() {
        let api = HttpSessionApi::new(&ApiConfig::default()).unwrap();
        assert_eq!(api.endpoint(), "http://localhost:8000/api");
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_session_exists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sessions/live"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "data": {"session_id": "live"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sessions/gone"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"detail": "Session not found or expired"})),
            )
            .mount(&server)
            .await;

        let api = api_for(&server).await;
        assert!(api.session_exists(&id("live")).await.unwrap());
        assert!(!api.session_exists(&id("gone")).await.unwrap());
    }

    #[tokio::test]
    async fn test_session_exists_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sessions/s1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let err = api_for(&server)
            .await
            .session_exists(&id("s1"))
            .await
            .unwrap_err();
        match err {
            SessionError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal");
            }
            other => panic!("Expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_session_sends_user_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .and(body_json(json!({"user_id": "det-ortiz"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "session_id": "new-1",
                "created_at": "2024-05-01T10:00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = api_for(&server)
            .await
            .create_session(Some("det-ortiz"))
            .await
            .unwrap();
        assert_eq!(created.as_str(), "new-1");
    }

    #[tokio::test]
    async fn test_create_session_anonymous_sends_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .and(body_json(json!({"user_id": null})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": "anon"})))
            .mount(&server)
            .await;

        let created = api_for(&server).await.create_session(None).await.unwrap();
        assert_eq!(created.as_str(), "anon");
    }

    #[tokio::test]
    async fn test_create_session_missing_id_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let err = api_for(&server).await.create_session(None).await.unwrap_err();
        assert!(matches!(err, SessionError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_create_session_non_json_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let err = api_for(&server).await.create_session(None).await.unwrap_err();
        assert!(matches!(err, SessionError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_append_interaction_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions/s1/interactions"))
            .and(body_json(json!({
                "interaction_type": "search",
                "query": "scar on left cheek",
                "results": null,
                "metadata": {"top_k": 5}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "message": "Interaction logged"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let interaction = NewInteraction::new(InteractionKind::Search)
            .with_query("scar on left cheek")
            .with_metadata("top_k", 5);
        api_for(&server)
            .await
            .append_interaction(&id("s1"), &interaction)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_append_interaction_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions/s1/interactions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&server)
            .await;

        let err = api_for(&server)
            .await
            .append_interaction(&id("s1"), &NewInteraction::new(InteractionKind::View))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Rejected));
    }

    #[tokio::test]
    async fn test_append_interaction_empty_body_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions/s1/interactions"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        api_for(&server)
            .await
            .append_interaction(&id("s1"), &NewInteraction::new(InteractionKind::View))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fetch_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sessions/s1/history"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "session_id": "s1",
                "history": [
                    {"type": "view", "query": null, "results": {"suspect_id": "X"},
                     "metadata": {}, "timestamp": "2024-05-01T10:00:02"},
                    {"type": "search", "query": "beard", "results": null,
                     "metadata": {}, "timestamp": "2024-05-01T10:00:01"}
                ],
                "count": 2
            })))
            .mount(&server)
            .await;

        let history = api_for(&server)
            .await
            .fetch_history(&id("s1"), 2)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, InteractionKind::View);
        assert_eq!(history[1].query.as_deref(), Some("beard"));
    }

    #[tokio::test]
    async fn test_fetch_history_missing_field_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sessions/s1/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let err = api_for(&server)
            .await
            .fetch_history(&id("s1"), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_replace_and_fetch_context() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/sessions/s1/context"))
            .and(body_json(json!({"context_data": {"case": "C-17"}})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "message": "Context updated"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sessions/s1/context"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "context": {"case": "C-17"}})),
            )
            .mount(&server)
            .await;

        let api = api_for(&server).await;
        let ctx: SessionContext = [("case", json!("C-17"))].into_iter().collect();
        api.replace_context(&id("s1"), &ctx).await.unwrap();
        assert_eq!(api.fetch_context(&id("s1")).await.unwrap(), ctx);
    }

    #[tokio::test]
    async fn test_replace_context_unknown_session() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/sessions/s1/context"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "Session not found"})),
            )
            .mount(&server)
            .await;

        let err = api_for(&server)
            .await
            .replace_context(&id("s1"), &SessionContext::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/sessions/s1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "message": "Session deleted"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        api_for(&server).await.delete_session(&id("s1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_network_error() {
        // Nothing listens on port 1
        let api = HttpSessionApi::with_timeout("http://127.0.0.1:1", None).unwrap();
        let err = api.session_exists(&id("s1")).await.unwrap_err();
        assert!(matches!(err, SessionError::Transport(_)));
    }
}

//! Core types for the ForensIQ session client.
//!
//! These model the session service's JSON payloads. The backend speaks in
//! loosely typed dicts; here the interaction kind is an enum, the session id a
//! non-empty newtype, and the context a JSON object wrapper.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────
// SessionId
// ─────────────────────────────────────────────

/// Opaque handle to a server-side session.
///
/// Always non-empty: [`SessionId::new`] rejects blank tokens, and
/// deserialization goes through the same check.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a token, trimming surrounding whitespace. Returns `None` if blank.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == token.len() {
            Some(SessionId(token))
        } else {
            Some(SessionId(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SessionId::new(value).ok_or_else(|| "session id must not be empty".to_string())
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────
// InteractionKind
// ─────────────────────────────────────────────

/// What the user did.
///
/// Unknown kinds coming back from the server decode as [`InteractionKind::Other`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Search,
    Generate,
    Detect,
    View,
    Delete,
    #[serde(other)]
    Other,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 6] = [
        InteractionKind::Search,
        InteractionKind::Generate,
        InteractionKind::Detect,
        InteractionKind::View,
        InteractionKind::Delete,
        InteractionKind::Other,
    ];

    /// Wire name (`"search"`, `"view"`, …).
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Search => "search",
            InteractionKind::Generate => "generate",
            InteractionKind::Detect => "detect",
            InteractionKind::View => "view",
            InteractionKind::Delete => "delete",
            InteractionKind::Other => "other",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    /// Strict parse, for user input. Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        InteractionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| {
                format!(
                    "unknown interaction kind '{}' (expected one of: search, generate, detect, view, delete, other)",
                    s
                )
            })
    }
}

// ─────────────────────────────────────────────
// NewInteraction (append request body)
// ─────────────────────────────────────────────

/// Payload for `POST /sessions/{id}/interactions`.
///
/// All four fields are always serialized; absent optionals go out as `null`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewInteraction {
    pub interaction_type: InteractionKind,
    pub query: Option<String>,
    pub results: Option<Map<String, Value>>,
    pub metadata: Option<Map<String, Value>>,
}

impl NewInteraction {
    pub fn new(kind: InteractionKind) -> Self {
        Self {
            interaction_type: kind,
            query: None,
            results: None,
            metadata: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Attach a structured result summary, replacing any set so far.
    pub fn with_results(mut self, results: Map<String, Value>) -> Self {
        self.results = Some(results);
        self
    }

    /// Add one result entry (e.g. `suspect_id = "X"`), creating the map on first use.
    pub fn with_result(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.results
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add one metadata entry, creating the map on first use.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> InteractionKind {
        self.interaction_type
    }
}

// ─────────────────────────────────────────────
// InteractionRecord (history entry)
// ─────────────────────────────────────────────

/// One logged user action as returned by the history endpoint.
///
/// The server stores the kind under `type`; `interaction_type` is accepted too.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    #[serde(rename = "type", alias = "interaction_type")]
    pub kind: InteractionKind,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub results: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    /// Server-assigned timestamp, kept verbatim.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl InteractionRecord {
    /// Parse the server timestamp.
    ///
    /// Accepts RFC 3339 and offset-less ISO 8601 (read as UTC), which is what
    /// the backend emits.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

// ─────────────────────────────────────────────
// SessionContext
// ─────────────────────────────────────────────

/// Free-form investigation state attached to a session.
///
/// Serializes as a bare JSON object. Updates replace it wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionContext(Map<String, Value>);

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for SessionContext {
    fn from(map: Map<String, Value>) -> Self {
        SessionContext(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SessionContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        SessionContext(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

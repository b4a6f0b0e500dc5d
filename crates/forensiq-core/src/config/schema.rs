//! Configuration schema.
//!
//! Hierarchy: `Config` → `ApiConfig`, `SessionConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.forensiq/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

// ─────────────────────────────────────────────
// API
// ─────────────────────────────────────────────

/// How to reach the session service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    /// Base URL that the `/sessions/...` paths hang off.
    pub base_url: String,
    /// Per-request timeout enforced by the HTTP transport.
    pub timeout_secs: u64,
    /// Sent as `user_id` when provisioning. The server falls back to `"anonymous"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 30,
            user_id: None,
        }
    }
}

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// Client-side session tracking settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Durable state file holding the session id (`~` is expanded).
    pub state_file: String,
    /// Share one in-flight provisioning among concurrent callers.
    pub exclusive_provisioning: bool,
    /// Default number of history entries to fetch.
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_file: "~/.forensiq/state.json".to_string(),
            exclusive_provisioning: true,
            history_limit: 50,
        }
    }
}

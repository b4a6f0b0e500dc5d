//! Durable storage for the active session id.
//!
//! File format: a small JSON object, by default `~/.forensiq/state.json`:
//! `{"forensiq_session_id":"...","forensiq_session_saved_at":"..."}`.
//! Unknown keys in the file are preserved across writes.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::SessionId;
use crate::utils;

/// Well-known key the session id is stored under.
pub const SESSION_ID_KEY: &str = "forensiq_session_id";

const SAVED_AT_KEY: &str = "forensiq_session_saved_at";

/// One durable slot holding at most one session id.
///
/// `load` never fails: an unreadable slot reads as empty.
pub trait IdStore: Send + Sync {
    fn load(&self) -> Option<SessionId>;

    /// Overwrite the slot.
    fn save(&self, id: &SessionId) -> std::io::Result<()>;

    /// Empty the slot. Clearing an empty slot is not an error.
    fn clear(&self) -> std::io::Result<()>;
}

// ─────────────────────────────────────────────
// FileIdStore
// ─────────────────────────────────────────────

/// [`IdStore`] backed by a JSON state file.
///
/// No in-memory cache: another process may have rewritten the file, so every
/// `load` reads it again.
#[derive(Debug)]
pub struct FileIdStore {
    path: PathBuf,
}

impl FileIdStore {
    /// `path` defaults to `~/.forensiq/state.json` if `None`.
    /// The file itself is created lazily on the first save.
    pub fn new(path: Option<PathBuf>) -> Self {
        FileIdStore {
            path: path.unwrap_or_else(utils::get_state_path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_state(&self) -> Map<String, Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!("Failed to read state file {}: {}", self.path.display(), e);
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(
                    "State file {} is not a JSON object, ignoring it",
                    self.path.display()
                );
                Map::new()
            }
        }
    }

    /// Write via a sibling temp file + rename so readers never see half a file.
    fn write_state(&self, state: &Map<String, Value>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;

        debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}

impl IdStore for FileIdStore {
    fn load(&self) -> Option<SessionId> {
        let state = self.read_state();
        let id = state
            .get(SESSION_ID_KEY)
            .and_then(Value::as_str)
            .and_then(SessionId::new);
        if id.is_none() && state.contains_key(SESSION_ID_KEY) {
            warn!("Ignoring unusable session id in {}", self.path.display());
        }
        id
    }

    fn save(&self, id: &SessionId) -> std::io::Result<()> {
        let mut state = self.read_state();
        state.insert(SESSION_ID_KEY.to_string(), Value::from(id.as_str()));
        state.insert(SAVED_AT_KEY.to_string(), Value::from(utils::timestamp()));
        self.write_state(&state)
    }

    fn clear(&self) -> std::io::Result<()> {
        let mut state = self.read_state();
        let had_id = state.remove(SESSION_ID_KEY).is_some();
        state.remove(SAVED_AT_KEY);

        if !had_id {
            return Ok(());
        }
        if state.is_empty() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
            debug!("Removed state file {}", self.path.display());
            Ok(())
        } else {
            self.write_state(&state)
        }
    }
}

// ─────────────────────────────────────────────
// MemoryIdStore
// ─────────────────────────────────────────────

/// Process-local [`IdStore`]; forgets everything on exit.
#[derive(Debug, Default)]
pub struct MemoryIdStore {
    slot: RwLock<Option<SessionId>>,
}

impl MemoryIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an id already stored.
    pub fn with_id(id: SessionId) -> Self {
        MemoryIdStore {
            slot: RwLock::new(Some(id)),
        }
    }
}

impl IdStore for MemoryIdStore {
    fn load(&self) -> Option<SessionId> {
        self.slot.read().ok().and_then(|slot| slot.clone())
    }

    fn save(&self, id: &SessionId) -> std::io::Result<()> {
        let mut slot = self.slot.write().map_err(poisoned)?;
        *slot = Some(id.clone());
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        let mut slot = self.slot.write().map_err(poisoned)?;
        *slot = None;
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, "session id slot lock poisoned")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

//! Shared CLI helpers — path expansion, argument parsing, outcome reporting.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use serde_json::Value;

use forensiq_client::Outcome;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Parse a `KEY=VALUE` argument. VALUE is read as JSON if it parses, else as a string.
pub fn parse_entry(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in '{}'", raw);
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Parse a JSON argument, naming the flag in the error.
pub fn parse_json(raw: &str, what: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("{} is not valid JSON", what))
}

/// Turn a degraded outcome into a CLI error; hand back the value otherwise.
pub fn finish<T>(outcome: Outcome<T>, what: &str) -> Result<T> {
    match outcome.into_parts() {
        (value, None) => Ok(value),
        (_, Some(e)) => Err(anyhow!("{} unavailable: {}", what, e)),
    }
}

pub fn ok_mark() -> String {
    "✓".green().to_string()
}

pub fn dim(text: &str) -> String {
    text.dimmed().to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

//! Config loader — reads `~/.forensiq/config.json`, merges env vars, and
//! applies legacy migrations.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.forensiq/config.json`
//! 3. Environment variables `FORENSIQ_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    migrate_config(&mut raw);

    let config: Config = match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply legacy config migrations.
///
/// Moves a top-level `apiUrl` → `api.baseUrl` (older front-end configs kept
/// the backend URL at the root).
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(root) = raw.as_object_mut() else {
        return;
    };
    let Some(legacy) = root.remove("apiUrl") else {
        return;
    };

    let api = root
        .entry("api")
        .or_insert_with(|| serde_json::Value::Object(Default::default()));
    if let Some(api) = api.as_object_mut() {
        if !api.contains_key("baseUrl") {
            api.insert("baseUrl".to_string(), legacy);
            debug!("Migrated apiUrl → api.baseUrl");
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `FORENSIQ_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `FORENSIQ_API__BASE_URL` → `api.base_url`
/// - `FORENSIQ_API__TIMEOUT_SECS` → `api.timeout_secs`
/// - `FORENSIQ_API__USER_ID` → `api.user_id`
/// - `FORENSIQ_SESSION__STATE_FILE` → `session.state_file`
/// - `FORENSIQ_SESSION__EXCLUSIVE_PROVISIONING` → `session.exclusive_provisioning`
/// - `FORENSIQ_SESSION__HISTORY_LIMIT` → `session.history_limit`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Override fields from `lookup`. Unparseable numbers are ignored.
fn apply_overrides(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(val) = lookup("FORENSIQ_API__BASE_URL") {
        config.api.base_url = val;
    }
    if let Some(val) = lookup("FORENSIQ_API__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.api.timeout_secs = n;
        }
    }
    if let Some(val) = lookup("FORENSIQ_API__USER_ID") {
        config.api.user_id = if val.is_empty() { None } else { Some(val) };
    }

    if let Some(val) = lookup("FORENSIQ_SESSION__STATE_FILE") {
        config.session.state_file = val;
    }
    if let Some(val) = lookup("FORENSIQ_SESSION__EXCLUSIVE_PROVISIONING") {
        config.session.exclusive_provisioning = val == "true" || val == "1";
    }
    if let Some(val) = lookup("FORENSIQ_SESSION__HISTORY_LIMIT") {
        if let Ok(n) = val.parse::<usize>() {
            config.session.history_limit = n;
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.session.history_limit, 50);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "api": {
                "baseUrl": "https://forensics.example.org/api",
                "userId": "det-ortiz"
            }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.api.base_url, "https://forensics.example.org/api");
        assert_eq!(config.api.user_id.as_deref(), Some("det-ortiz"));
        // Default preserved
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.session.history_limit, 50);
        assert!(config.session.exclusive_provisioning);
    }

    #[test]
    fn test_load_wrong_types_returns_defaults() {
        let file = write_temp_json(r#"{"session": {"historyLimit": "lots"}}"#);
        let config = load_config_from_path(file.path());
        assert_eq!(config.session.history_limit, 50);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.session.state_file = "/tmp/forensiq-state.json".to_string();
        config.session.exclusive_provisioning = false;

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert_eq!(reloaded.session.state_file, "/tmp/forensiq-state.json");
        assert!(!reloaded.session.exclusive_provisioning);
    }

    #[test]
    fn test_migrate_api_url() {
        let file = write_temp_json(r#"{"apiUrl": "http://10.0.0.5:8000/api"}"#);
        let config = load_config_from_path(file.path());
        assert_eq!(config.api.base_url, "http://10.0.0.5:8000/api");
    }

    #[test]
    fn test_migrate_no_overwrite() {
        let file = write_temp_json(
            r#"{
            "apiUrl": "http://old:8000/api",
            "api": { "baseUrl": "http://new:8000/api" }
        }"#,
        );
        let config = load_config_from_path(file.path());
        assert_eq!(config.api.base_url, "http://new:8000/api");
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert!(raw["session"].get("historyLimit").is_some());
        assert!(raw["session"].get("history_limit").is_none());
    }

    fn overrides(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        apply_overrides(Config::default(), |key| vars.get(key).cloned())
    }

    #[test]
    fn test_override_base_url_and_user() {
        let config = overrides(&[
            ("FORENSIQ_API__BASE_URL", "http://env-host:9000/api"),
            ("FORENSIQ_API__USER_ID", "analyst-3"),
        ]);
        assert_eq!(config.api.base_url, "http://env-host:9000/api");
        assert_eq!(config.api.user_id.as_deref(), Some("analyst-3"));
    }

    #[test]
    fn test_override_empty_user_id_clears_it() {
        let config = overrides(&[("FORENSIQ_API__USER_ID", "")]);
        assert!(config.api.user_id.is_none());
    }

    #[test]
    fn test_override_numbers() {
        let config = overrides(&[
            ("FORENSIQ_SESSION__HISTORY_LIMIT", "7"),
            ("FORENSIQ_API__TIMEOUT_SECS", "soon"),
        ]);
        assert_eq!(config.session.history_limit, 7);
        // Unparseable value leaves the default
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_override_exclusive_provisioning() {
        let config = overrides(&[("FORENSIQ_SESSION__EXCLUSIVE_PROVISIONING", "0")]);
        assert!(!config.session.exclusive_provisioning);
        let config = overrides(&[("FORENSIQ_SESSION__EXCLUSIVE_PROVISIONING", "true")]);
        assert!(config.session.exclusive_provisioning);
    }
}

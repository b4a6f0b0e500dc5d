//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use forensiq_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Backend: {}", cfg.api.base_url);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{ApiConfig, Config, SessionConfig};

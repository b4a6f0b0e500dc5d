//! `forensiq status` — show configuration and the stored session.
//!
//! With `--check`, the stored id is validated against the server (no session
//! is provisioned).

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use forensiq_client::{HttpSessionApi, SessionApi};
use forensiq_core::config::{get_config_path, Config};
use forensiq_core::session::{FileIdStore, IdStore};

use crate::helpers::{dim, expand_tilde, ok_mark};

/// Run the status command.
pub async fn run(config: &Config, config_path: Option<PathBuf>, check: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(get_config_path);
    let state_path = expand_tilde(&config.session.state_file);

    println!();
    println!("{}", "ForensIQ Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        presence(config_path.exists())
    );
    println!("  {:<18} {}", "Backend:".bold(), config.api.base_url);
    println!(
        "  {:<18} {}",
        "User:".bold(),
        config.api.user_id.as_deref().unwrap_or("anonymous")
    );
    println!(
        "  {:<18} {}s | history limit: {} | exclusive provisioning: {}",
        "Parameters:".bold(),
        config.api.timeout_secs,
        config.session.history_limit,
        config.session.exclusive_provisioning
    );
    println!(
        "  {:<18} {} {}",
        "State file:".bold(),
        state_path.display(),
        presence(state_path.exists())
    );

    let stored = FileIdStore::new(Some(state_path)).load();
    let Some(id) = stored else {
        println!("  {:<18} {}", "Session:".bold(), dim("· none stored"));
        println!();
        return Ok(());
    };
    println!("  {:<18} {}", "Session:".bold(), id);

    if check {
        let api = HttpSessionApi::new(&config.api)?;
        let verdict = match api.session_exists(&id).await {
            Ok(true) => format!("{} valid", ok_mark()),
            Ok(false) => format!("{}", "✗ unknown or expired".yellow()),
            Err(e) => format!("{} {}", "✗ unreachable:".red(), e),
        };
        println!("  {:<18} {}", "Server check:".bold(), verdict);
    }

    println!();
    Ok(())
}

fn presence(exists: bool) -> String {
    if exists {
        ok_mark()
    } else {
        "(not found)".red().to_string()
    }
}

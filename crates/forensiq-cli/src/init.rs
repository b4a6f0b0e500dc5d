//! `forensiq init` — write a default configuration file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;

use forensiq_core::config::{get_config_path, save_config, Config};

/// Run the init command. `path` overrides `~/.forensiq/config.json`.
pub fn run(path: Option<PathBuf>) -> Result<()> {
    let config_path = path.unwrap_or_else(get_config_path);

    println!();
    println!("{}", "ForensIQ — Setup".cyan().bold());
    println!();

    let created = write_default_config(&config_path)?;
    let verb = if created { "created" } else { "config already exists at" };
    println!("  {} {} {}", "✓".green(), verb, config_path.display());

    println!();
    println!(
        "{}",
        "  Setup complete! Point api.baseUrl at your backend, then run `forensiq session ensure`."
            .green()
    );
    println!();
    Ok(())
}

/// Write defaults unless a file is already there. Returns whether it wrote.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))?;
    Ok(true)
}

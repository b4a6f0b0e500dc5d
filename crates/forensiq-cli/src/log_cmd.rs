//! `forensiq log` and `forensiq history` — write and read the interaction log.

use anyhow::{bail, Result};
use colored::Colorize;
use serde_json::Value;

use forensiq_client::SessionClient;
use forensiq_core::types::{InteractionKind, InteractionRecord, NewInteraction};
use forensiq_core::utils::truncate_string;

use crate::helpers::{dim, finish, ok_mark, parse_entry, parse_json};

/// Build the append payload from CLI arguments.
fn build_interaction(
    kind: InteractionKind,
    query: Option<String>,
    results: Option<String>,
    meta: &[String],
) -> Result<NewInteraction> {
    let mut interaction = NewInteraction::new(kind);
    if let Some(query) = query {
        interaction = interaction.with_query(query);
    }
    if let Some(raw) = results {
        match parse_json(&raw, "--results")? {
            Value::Object(map) => interaction = interaction.with_results(map),
            _ => bail!("--results must be a JSON object"),
        }
    }
    for entry in meta {
        let (key, value) = parse_entry(entry)?;
        interaction = interaction.with_metadata(key, value);
    }
    Ok(interaction)
}

/// `forensiq log KIND ...`
pub async fn log(
    client: &SessionClient,
    kind: InteractionKind,
    query: Option<String>,
    results: Option<String>,
    meta: Vec<String>,
) -> Result<()> {
    let interaction = build_interaction(kind, query, results, &meta)?;
    finish(client.log_interaction(&interaction).await, "interaction logging")?;
    println!("  {} logged {}", ok_mark(), kind.to_string().bold());
    Ok(())
}

/// `forensiq history [--limit N] [--json]`
pub async fn history(client: &SessionClient, limit: usize, json: bool) -> Result<()> {
    let records = finish(client.get_history(limit).await, "history")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("  {}", dim("No interactions yet."));
        return Ok(());
    }

    println!();
    println!(
        "  {:<10} {:<20} {:<32} {}",
        "Kind".bold(),
        "When".bold(),
        "Query".bold(),
        "Results".bold(),
    );
    println!("  {}", "─".repeat(86));
    for record in &records {
        println!("  {}", format_row(record));
    }
    println!();
    Ok(())
}

fn format_row(record: &InteractionRecord) -> String {
    let when = record
        .recorded_at()
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "—".to_string());
    let query = record
        .query
        .as_deref()
        .map(|q| truncate_string(q, 30))
        .unwrap_or_else(|| "—".to_string());
    let results = record
        .results
        .as_ref()
        .map(|r| truncate_string(&r.to_string(), 30))
        .unwrap_or_else(|| "—".to_string());
    format!("{:<10} {:<20} {:<32} {}", record.kind.as_str(), when, query, results)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

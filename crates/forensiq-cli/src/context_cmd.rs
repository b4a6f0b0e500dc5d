//! `forensiq context` — read or replace the session's investigation context.
//!
//! `set` always sends the complete map: whatever is given replaces what the
//! server had.

use anyhow::{bail, Result};
use clap::Subcommand;
use serde_json::Value;

use forensiq_client::SessionClient;
use forensiq_core::types::SessionContext;

use crate::helpers::{dim, finish, ok_mark, parse_entry, parse_json};

/// Context subcommands.
#[derive(Subcommand)]
pub enum ContextCommands {
    /// Print the current context as JSON
    Get,
    /// Replace the context
    Set {
        /// Full context as a JSON object
        json: Option<String>,

        /// Context entry KEY=VALUE, applied on top of JSON
        #[arg(short, long = "entry")]
        entry: Vec<String>,
    },
}

/// Dispatch a context subcommand.
pub async fn dispatch(client: &SessionClient, cmd: ContextCommands) -> Result<()> {
    match cmd {
        ContextCommands::Get => {
            match finish(client.get_context().await, "context")? {
                Some(context) if !context.is_empty() => {
                    println!("{}", serde_json::to_string_pretty(&context)?)
                }
                _ => println!("{}", dim("(empty context)")),
            }
            Ok(())
        }
        ContextCommands::Set { json, entry } => {
            let context = build_context(json.as_deref(), &entry)?;
            finish(client.update_context(&context).await, "context update")?;
            println!("  {} context replaced ({} keys)", ok_mark(), context.len());
            Ok(())
        }
    }
}

fn build_context(json: Option<&str>, entries: &[String]) -> Result<SessionContext> {
    if json.is_none() && entries.is_empty() {
        bail!("nothing to set: pass a JSON object and/or --entry KEY=VALUE");
    }

    let mut context = match json.map(|raw| parse_json(raw, "context")).transpose()? {
        None => SessionContext::new(),
        Some(Value::Object(map)) => SessionContext::from(map),
        Some(_) => bail!("context must be a JSON object"),
    };
    for entry in entries {
        let (key, value) = parse_entry(entry)?;
        context.insert(key, value);
    }
    Ok(context)
}

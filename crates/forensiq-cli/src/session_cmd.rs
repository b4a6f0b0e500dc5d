//! `forensiq session` — inspect and manage the session id.
//!
//! - `forensiq session ensure` — validate the stored id, provisioning one if needed
//! - `forensiq session show` — print the stored id without contacting the server
//! - `forensiq session clear` — forget the stored id locally
//! - `forensiq session end` — delete the session server-side, then forget it

use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;

use forensiq_client::SessionClient;

use crate::helpers::{dim, finish, ok_mark};

/// Session subcommands.
#[derive(Subcommand)]
pub enum SessionCommands {
    /// Make sure a valid session exists and print its id
    Ensure,
    /// Print the stored session id (no network)
    Show,
    /// Forget the stored session id (server data is kept)
    Clear,
    /// Delete the session on the server and forget it locally
    End,
}

/// Dispatch a session subcommand.
pub async fn dispatch(client: &SessionClient, cmd: SessionCommands) -> Result<()> {
    match cmd {
        SessionCommands::Ensure => {
            let id = finish(client.ensure_session_id().await, "session")?
                .ok_or_else(|| anyhow!("session unavailable"))?;
            println!("{}", id);
        }
        SessionCommands::Show => match client.stored_session_id() {
            Some(id) => println!("{}", id),
            None => println!("{}", dim("(no stored session)")),
        },
        SessionCommands::Clear => {
            finish(client.clear_session(), "local session store")?;
            println!("  {} local session id cleared", ok_mark());
        }
        SessionCommands::End => {
            let deleted = finish(client.end_session().await, "session delete")?;
            if deleted {
                println!("  {} session ended", ok_mark());
            } else {
                println!("  {}", "no stored session to end".dimmed());
            }
        }
    }
    Ok(())
}

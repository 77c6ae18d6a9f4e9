// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use tracing::debug;

use super::{authed_client, session_error};
use crate::utils::fmt_money;
use crate::validate;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("add", sub)) = m.subcommand() {
        add(conn, sub)?;
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let amount = sub.get_one::<String>("amount").map(String::as_str).unwrap_or_default();
    let kind = sub.get_one::<String>("type").map(String::as_str).unwrap_or_default();
    let description = sub.get_one::<String>("description").map(String::as_str);
    let category = sub.get_one::<i64>("category").copied();
    let new = validate::transaction(amount, kind, description, category).map_err(|e| anyhow!(e))?;

    let (_, client) = authed_client(conn)?;
    let created = client
        .create_transaction(&new)
        .map_err(|e| session_error(conn, e))?;
    debug!(response = %created, "transaction created");

    let id = created.get("id").and_then(|v| v.as_i64());
    match id {
        Some(id) => println!(
            "Recorded {} of {} (id {}).",
            new.transaction_type,
            fmt_money(new.amount),
            id
        ),
        None => println!("Recorded {} of {}.", new.transaction_type, fmt_money(new.amount)),
    }
    Ok(())
}

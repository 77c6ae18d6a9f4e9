// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Result};
use rusqlite::Connection;

use super::{authed_client, session_error};
use crate::models::InitialBalance;
use crate::session::SessionStore;
use crate::utils::fmt_money;
use crate::validate;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let raw = sub.get_one::<String>("balance").map(String::as_str).unwrap_or_default();
    let initial_balance = validate::initial_balance(raw).map_err(|e| anyhow!(e))?;

    let (_, client) = authed_client(conn)?;
    client
        .submit_initial_balance(&InitialBalance { initial_balance })
        .map_err(|e| session_error(conn, e))?;

    let session = SessionStore::new(conn);
    if let Some(username) = session.username()? {
        session.mark_onboarded(&username)?;
    }
    println!("Initial balance set to {}.", fmt_money(initial_balance));
    Ok(())
}

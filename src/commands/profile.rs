// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use tracing::info;

use super::{authed_client, session_error};
use crate::session::SessionStore;
use crate::validate;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let username = sub.get_one::<String>("username").map(String::as_str);
    let password = sub.get_one::<String>("password").map(String::as_str);
    let update = validate::profile(username, password).map_err(|e| anyhow!(e))?;

    let (_, client) = authed_client(conn)?;
    client
        .update_profile(&update)
        .map_err(|e| session_error(conn, e))?;

    let session = SessionStore::new(conn);
    if let Some(new_name) = &update.username {
        let old = session.username()?;
        if old.as_deref() != Some(new_name.as_str()) {
            // Onboarding is keyed by username; carry it over.
            let onboarded = match old.as_deref() {
                Some(o) => session.is_onboarded(o)?,
                None => false,
            };
            session.set_username(new_name)?;
            if onboarded {
                session.mark_onboarded(new_name)?;
            }
            info!(username = %new_name, "username changed");
        }
    }
    if update.password.is_some() {
        println!("Password updated.");
    }
    if let Some(u) = &update.username {
        println!("Username is now {}.", u);
    }
    Ok(())
}

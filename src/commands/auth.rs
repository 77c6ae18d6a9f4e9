// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use tracing::info;

use super::anon_client;
use crate::error::ApiError;
use crate::models::AuthToken;
use crate::session::{Screen, SessionStore};
use crate::utils::pretty_table;
use crate::validate;

pub fn login(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let username = sub.get_one::<String>("username").map(String::as_str).unwrap_or_default();
    let password = sub.get_one::<String>("password").map(String::as_str).unwrap_or_default();
    let creds = validate::login(username, password).map_err(|e| anyhow!(e))?;

    let (_, client) = anon_client(conn)?;
    let next = finish_login(conn, &creds.username, client.login(&creds))?;
    println!("Logged in as {}.", creds.username);
    if next == Screen::Onboarding {
        println!("Next: set your starting balance with `smartexpense onboard --balance <amount>`.");
    }
    Ok(())
}

/// Stores the session on success. A rejected login leaves any existing session alone
/// and reports the server's message.
pub fn finish_login(
    conn: &Connection,
    username: &str,
    result: Result<AuthToken, ApiError>,
) -> Result<Screen> {
    let token = result.map_err(|e| anyhow!(e.user_message()))?;
    let session = SessionStore::new(conn);
    session.save_login(&token.token, username, token.user_id)?;
    info!(username, "logged in");
    Ok(session.initial_screen()?)
}

pub fn register(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let username = sub.get_one::<String>("username").map(String::as_str).unwrap_or_default();
    let email = sub.get_one::<String>("email").map(String::as_str).unwrap_or_default();
    let password = sub.get_one::<String>("password").map(String::as_str).unwrap_or_default();
    let reg = validate::registration(username, email, password).map_err(|e| anyhow!(e))?;

    let session = SessionStore::new(conn);
    let cleared = session.clear_onboarding_flags()?;
    if cleared > 0 {
        info!(cleared, "cleared previous onboarding flags");
    }

    let (_, client) = anon_client(conn)?;
    let token = client.register(&reg).map_err(|e| anyhow!(e.user_message()))?;
    session.save_login(&token.token, &reg.username, token.user_id)?;
    println!("Registered {}. Log in with `smartexpense login` to continue.", reg.username);
    Ok(())
}

pub fn logout(conn: &Connection) -> Result<()> {
    SessionStore::new(conn).clear()?;
    println!("Logged out.");
    Ok(())
}

pub fn status(conn: &Connection) -> Result<()> {
    let session = SessionStore::new(conn);
    let screen = session.initial_screen()?;
    let user = session.username()?.unwrap_or_else(|| "(guest)".to_string());
    let rows = vec![
        vec!["User".to_string(), user],
        vec![
            "Token".to_string(),
            if session.token()?.is_some() { "stored" } else { "none" }.to_string(),
        ],
        vec!["Opens on".to_string(), screen.to_string()],
    ];
    println!("{}", pretty_table(&["Session", "Value"], rows));
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod auth;
pub mod categories;
pub mod home;
pub mod onboarding;
pub mod profile;
pub mod search;
pub mod settings;
pub mod stats;
pub mod transactions;

use anyhow::{anyhow, Result};
use rusqlite::Connection;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::session::SessionStore;

/// Client carrying the stored token, or an error telling the user to log in.
pub fn authed_client(conn: &Connection) -> Result<(Config, ApiClient)> {
    let config = Config::load(conn)?;
    let token = SessionStore::new(conn)
        .require_token()
        .map_err(|e| session_error(conn, e))?;
    let client = ApiClient::new(&config, Some(token))?;
    Ok((config, client))
}

pub fn anon_client(conn: &Connection) -> Result<(Config, ApiClient)> {
    let config = Config::load(conn)?;
    let client = ApiClient::new(&config, None)?;
    Ok((config, client))
}

/// Turns an API error into a user-facing one. Auth failures also end the session.
pub fn session_error(conn: &Connection, err: ApiError) -> anyhow::Error {
    if err.is_auth() {
        if let Err(e) = SessionStore::new(conn).clear() {
            tracing::warn!(error = %e, "could not clear session");
        }
        return anyhow!("{}. Run `smartexpense login` to continue.", err);
    }
    anyhow!(err.user_message())
}

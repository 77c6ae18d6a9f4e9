// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persisted session state: auth token, username, user id and the
//! per-user onboarding flags. Everything that needs the session takes a
//! [`SessionStore`] explicitly.

use std::fmt;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::ApiError;

const TOKEN: &str = "token";
const USERNAME: &str = "username";
const USER_ID: &str = "user_id";
const ONBOARDED_PREFIX: &str = "onboarding_completed_";

/// Where a fresh start lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Screen {
    Login,
    Onboarding,
    Home,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub struct SessionStore<'a> {
    conn: &'a Connection,
}

impl<'a> SessionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SessionStore { conn }
    }

    fn get(&self, key: &str) -> rusqlite::Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM session WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()
    }

    fn set(&self, key: &str, value: &str) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO session(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> rusqlite::Result<()> {
        self.conn
            .execute("DELETE FROM session WHERE key=?1", params![key])?;
        Ok(())
    }

    pub fn token(&self) -> rusqlite::Result<Option<String>> {
        self.get(TOKEN)
    }

    /// The token, or [`ApiError::MissingToken`] when nobody is logged in.
    pub fn require_token(&self) -> Result<String, ApiError> {
        self.token()?.ok_or(ApiError::MissingToken)
    }

    pub fn username(&self) -> rusqlite::Result<Option<String>> {
        self.get(USERNAME)
    }

    pub fn set_username(&self, username: &str) -> rusqlite::Result<()> {
        self.set(USERNAME, username)
    }

    pub fn user_id(&self) -> rusqlite::Result<Option<i64>> {
        Ok(self.get(USER_ID)?.and_then(|s| s.parse().ok()))
    }

    pub fn save_login(
        &self,
        token: &str,
        username: &str,
        user_id: Option<i64>,
    ) -> rusqlite::Result<()> {
        self.set(TOKEN, token)?;
        self.set(USERNAME, username)?;
        match user_id {
            Some(id) => self.set(USER_ID, &id.to_string()),
            None => self.remove(USER_ID),
        }
    }

    /// Forgets the token, identity and unconfirmed category deletes.
    /// Onboarding flags survive logout.
    pub fn clear(&self) -> rusqlite::Result<()> {
        self.remove(TOKEN)?;
        self.remove(USERNAME)?;
        self.remove(USER_ID)?;
        self.conn.execute("DELETE FROM category_tombstones", [])?;
        Ok(())
    }

    pub fn mark_onboarded(&self, username: &str) -> rusqlite::Result<()> {
        self.set(&format!("{ONBOARDED_PREFIX}{username}"), "true")
    }

    pub fn is_onboarded(&self, username: &str) -> rusqlite::Result<bool> {
        Ok(self
            .get(&format!("{ONBOARDED_PREFIX}{username}"))?
            .is_some_and(|v| v == "true"))
    }

    pub fn clear_onboarding_flags(&self) -> rusqlite::Result<usize> {
        self.conn.execute(
            "DELETE FROM session WHERE substr(key, 1, ?1) = ?2",
            params![ONBOARDED_PREFIX.len() as i64, ONBOARDED_PREFIX],
        )
    }

    /// No token: Login. Token but not onboarded: Onboarding. Otherwise Home.
    pub fn initial_screen(&self) -> rusqlite::Result<Screen> {
        if self.token()?.is_none() {
            return Ok(Screen::Login);
        }
        let onboarded = match self.username()? {
            Some(u) => self.is_onboarded(&u)?,
            None => false,
        };
        Ok(if onboarded {
            Screen::Home
        } else {
            Screen::Onboarding
        })
    }
}

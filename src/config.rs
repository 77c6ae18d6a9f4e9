// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::utils::RetryPolicy;

pub const API_URL_ENV: &str = "SMARTEXPENSE_API_URL";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Deletes get a longer budget; slow backends were dropping them.
    pub delete_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(15),
            delete_timeout: Duration::from_secs(50),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Environment first, then the stored setting, then the default.
    pub fn load(conn: &Connection) -> Result<Config> {
        let url = match std::env::var(API_URL_ENV) {
            Ok(v) if !v.trim().is_empty() => v,
            _ => get_api_base_url(conn)?,
        };
        Ok(Config {
            api_base_url: normalize_url(&url),
            ..Config::default()
        })
    }
}

pub fn get_api_base_url(conn: &Connection) -> Result<String> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='api_base_url'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.unwrap_or_else(|| DEFAULT_API_URL.to_string()))
}

pub fn set_api_base_url(conn: &Connection, url: &str) -> Result<String> {
    let url = normalize_url(url);
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("Invalid API URL '{}', expected http:// or https://", url);
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('api_base_url', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![url],
    )?;
    Ok(url)
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

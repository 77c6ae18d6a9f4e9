// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::config::{set_api_base_url, Config, API_URL_ENV};
use crate::db;
use crate::utils::pretty_table;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => show(conn)?,
        Some(("set-api", sub)) => {
            let url = sub.get_one::<String>("url").map(String::as_str).unwrap_or_default();
            let stored = set_api_base_url(conn, url)?;
            println!("API base URL set to {}", stored);
            if std::env::var(API_URL_ENV).is_ok_and(|v| !v.trim().is_empty()) {
                println!("Note: {} is set and takes precedence.", API_URL_ENV);
            }
        }
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection) -> Result<()> {
    let config = Config::load(conn)?;
    let rows = vec![
        vec!["API base URL".to_string(), config.api_base_url.clone()],
        vec![
            "Request timeout".to_string(),
            format!("{}s", config.request_timeout.as_secs()),
        ],
        vec![
            "Delete timeout".to_string(),
            format!("{}s", config.delete_timeout.as_secs()),
        ],
        vec![
            "Retries".to_string(),
            format!(
                "{} attempts, {}s apart",
                config.retry.attempts,
                config.retry.delay.as_secs()
            ),
        ],
        vec!["Database".to_string(), db::db_path()?.display().to_string()],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));
    Ok(())
}

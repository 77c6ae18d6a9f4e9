// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::{authed_client, session_error};
use crate::loaders::load_home;
use crate::session::SessionStore;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let username = SessionStore::new(conn).username()?;
    let (_, client) = authed_client(conn)?;
    let view = load_home(&client).map_err(|e| session_error(conn, e))?;

    if maybe_print_json(json_flag, &view)? {
        return Ok(());
    }
    println!("Hello {}!", username.as_deref().unwrap_or("guest"));
    println!(
        "{}",
        pretty_table(
            &["Balance", "Income", "Expense"],
            vec![vec![
                fmt_money(view.current_balance),
                fmt_money(view.total_income),
                fmt_money(view.total_expense),
            ]],
        )
    );
    let rows: Vec<Vec<String>> = view
        .recent_transactions
        .iter()
        .map(|t| {
            vec![
                t.created_at.format("%d/%m/%Y").to_string(),
                t.description.clone(),
                fmt_money(t.amount),
                t.transaction_type.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Description", "Amount", "Type"], rows)
    );
    Ok(())
}

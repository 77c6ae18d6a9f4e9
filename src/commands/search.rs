// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use rusqlite::Connection;

use super::{authed_client, session_error};
use crate::loaders::{search_transactions, SearchQuery};
use crate::models::TransactionType;
use crate::period::DateWindow;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table, today};

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let query = build_query(sub, today())?;
    let limit = sub.get_one::<usize>("limit").copied();

    let (_, client) = authed_client(conn)?;
    let mut hits = search_transactions(&client, &query).map_err(|e| session_error(conn, e))?;
    let total = hits.len();
    if let Some(n) = limit {
        hits.truncate(n);
    }

    if maybe_print_json(json_flag, &hits)? {
        return Ok(());
    }
    if hits.is_empty() {
        println!("No matching transactions.");
        return Ok(());
    }
    let rows = hits
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.created_at.format("%d/%m/%Y %H:%M").to_string(),
                t.transaction_type.to_string(),
                t.description.clone(),
                t.category_name.clone().unwrap_or_default(),
                fmt_money(t.amount),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["ID", "Date", "Type", "Description", "Category", "Amount"], rows)
    );
    if hits.len() < total {
        println!("Showing {} of {} matches.", hits.len(), total);
    }
    Ok(())
}

/// Builds the filter from the command line. A window is only sent when a date bound is given;
/// a missing `--to` means today and a missing `--from` means the epoch.
pub fn build_query(sub: &clap::ArgMatches, today: NaiveDate) -> Result<SearchQuery> {
    let arg = |name: &str| sub.get_one::<String>(name).map(String::as_str);

    let kind = arg("type")
        .map(|s| s.parse::<TransactionType>().map_err(|e| anyhow!(e)))
        .transpose()?;
    let from = arg("from").map(parse_date).transpose()?;
    let to = arg("to").map(parse_date).transpose()?;
    let window = match (from, to) {
        (None, None) => None,
        (from, to) => {
            let end = to.unwrap_or(today);
            let start = from.unwrap_or_default();
            if start > end {
                bail!("--from {} is after --to {}", start, end);
            }
            Some(DateWindow { start, end })
        }
    };
    let min_amount = arg("min").map(parse_decimal).transpose()?;
    let max_amount = arg("max").map(parse_decimal).transpose()?;
    if let (Some(lo), Some(hi)) = (min_amount, max_amount) {
        if lo > hi {
            bail!("--min {} is greater than --max {}", lo, hi);
        }
    }

    Ok(SearchQuery {
        text: arg("query").map(str::to_string),
        kind,
        window,
        min_amount,
        max_amount,
    })
}

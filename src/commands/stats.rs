// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{authed_client, session_error};
use crate::loaders::load_statistics;
use crate::period::{shift, Granularity};
use crate::utils::{fmt_millions, fmt_money, maybe_print_json, parse_date, pretty_table, today};

const BAR_WIDTH: usize = 24;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let granularity: Granularity = sub
        .get_one::<String>("period")
        .map(String::as_str)
        .unwrap_or("week")
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let today = today();
    let reference = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => today,
    };
    let offset = sub.get_one::<i32>("offset").copied().unwrap_or(0);
    let reference = shift(granularity, reference, offset, today);

    let (_, client) = authed_client(conn)?;
    let view = load_statistics(&client, granularity, reference, today)
        .map_err(|e| session_error(conn, e))?;

    if maybe_print_json(json_flag, &view)? {
        return Ok(());
    }

    let agg = &view.aggregate;
    println!("{} ({})", agg.window, granularity);
    let rows: Vec<Vec<String>> = agg
        .buckets
        .iter()
        .map(|b| {
            vec![
                b.label.clone(),
                fmt_millions(b.income_millions()),
                bar(b.income_millions(), agg.scale.max_value, '+'),
                fmt_millions(b.expense_millions()),
                bar(b.expense_millions(), agg.scale.max_value, '-'),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Period", "Income", "", "Expense", ""], rows)
    );
    println!(
        "Scale: 0 - {}M, step {}M",
        agg.scale.max_value.normalize(),
        agg.scale.step.normalize()
    );

    let t = &agg.totals;
    println!(
        "{}",
        pretty_table(
            &["", "Total", "Count"],
            vec![
                vec!["Income".into(), fmt_money(t.income), t.income_count.to_string()],
                vec!["Expense".into(), fmt_money(t.expense), t.expense_count.to_string()],
                vec!["Net".into(), fmt_money(t.net()), String::new()],
            ],
        )
    );
    Ok(())
}

fn bar(value: Decimal, max: Decimal, ch: char) -> String {
    if max.is_zero() {
        return String::new();
    }
    let ratio = (value / max).to_f64().unwrap_or(0.0).clamp(0.0, 1.0);
    let n = (ratio * BAR_WIDTH as f64).round() as usize;
    std::iter::repeat(ch).take(n).collect()
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};
use rusqlite::Connection;

use super::{authed_client, session_error};
use crate::category_sync::{
    load_tombstones, retry_resync, run_delete, save_tombstones, CategoryBook,
};
use crate::loaders::{add_category, edit_category, load_categories};
use crate::models::{Category, CategoryKind, NewCategory, CATEGORY_ICONS};
use crate::session::SessionStore;
use crate::utils::{maybe_print_json, pretty_table};
use crate::validate;

const PREVIEW: usize = 3;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("icons", _)) => icons(),
        _ => {}
    }
    Ok(())
}

fn load_book(conn: &Connection) -> Result<(crate::config::Config, crate::api::ApiClient, CategoryBook)> {
    let (config, client) = authed_client(conn)?;
    let pending = load_tombstones(conn)?;
    let book = load_categories(&client, config.retry, pending)
        .map_err(|e| session_error(conn, e))?;
    save_tombstones(conn, book.pending())?;
    for c in book.unconfirmed() {
        eprintln!(
            "Note: category '{}' (id {}) is still on the server; an earlier delete did not go through.",
            c.name, c.id
        );
    }
    Ok((config, client, book))
}

fn section_rows(items: &[&Category], show_all: bool) -> Vec<Vec<String>> {
    let take = if show_all { items.len() } else { PREVIEW };
    let mut rows: Vec<Vec<String>> = items
        .iter()
        .take(take)
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.icon_or_default().to_string(),
                if c.is_default { "yes" } else { "" }.to_string(),
            ]
        })
        .collect();
    if !show_all && items.len() > PREVIEW {
        rows.push(vec![
            String::new(),
            format!("... {} more (use --all)", items.len() - PREVIEW),
            String::new(),
            String::new(),
        ]);
    }
    rows
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let show_all = sub.get_flag("all");
    let (_, _, book) = load_book(conn)?;
    if maybe_print_json(json_flag, &book.categories())? {
        return Ok(());
    }
    for (title, kind) in [("Income", CategoryKind::Income), ("Expense", CategoryKind::Expense)] {
        let items: Vec<&Category> = book.of_kind(kind).collect();
        println!("{}", title);
        if items.is_empty() {
            println!("  No {} categories.", kind);
            continue;
        }
        println!(
            "{}",
            pretty_table(&["ID", "Name", "Icon", "Default"], section_rows(&items, show_all))
        );
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").map(String::as_str).unwrap_or_default();
    let kind = sub.get_one::<String>("type").map(String::as_str).unwrap_or("income");
    let icon = sub.get_one::<String>("icon").map(String::as_str);
    let form = validate::category(name, kind, icon).map_err(|e| anyhow!(e))?;

    let (config, client, mut book) = load_book(conn)?;
    let user_id = SessionStore::new(conn).user_id()?.map(|id| id.to_string());
    let new = NewCategory {
        name: form.name,
        kind: form.kind,
        icon: form.icon,
        user_id,
        is_default: false,
    };
    let created = add_category(&client, &mut book, &new, config.retry)
        .map_err(|e| session_error(conn, e))?;
    println!("Added {} category '{}' (id {}).", created.kind, created.name, created.id);
    Ok(())
}

fn parse_id(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("id").map(String::as_str).unwrap_or_default();
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid category id '{}'", raw))
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let name = sub.get_one::<String>("name").map(String::as_str).unwrap_or_default();
    let kind = sub.get_one::<String>("type").map(String::as_str).unwrap_or_default();
    let icon = sub.get_one::<String>("icon").map(String::as_str);
    let update = validate::category(name, kind, icon).map_err(|e| anyhow!(e))?;

    let (config, client, mut book) = load_book(conn)?;
    let updated = edit_category(&client, &mut book, id, &update, config.retry)
        .map_err(|e| session_error(conn, e))?;
    println!("Updated category {} -> '{}'.", updated.id, updated.name);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let assume_yes = sub.get_flag("yes");
    let (config, client, mut book) = load_book(conn)?;

    let name = book.check_delete(id)?.name.clone();
    if !assume_yes && !confirm(&format!("Delete category \"{}\"?", name))? {
        println!("Cancelled.");
        return Ok(());
    }

    let report = run_delete(&client, &mut book, id, config.retry)?;
    save_tombstones(conn, book.pending())?;
    println!("{}", report.message());

    if let Some(err) = report.resync_error {
        if err.is_auth() {
            return Err(session_error(conn, err));
        }
        while book.is_busy() && !assume_yes && confirm("Sync failed. Retry?")? {
            match retry_resync(&client, &mut book, config.retry) {
                Ok(_) => {
                    save_tombstones(conn, book.pending())?;
                    println!("Categories synced.");
                }
                Err(e) => println!("Could not sync: {}", e.user_message()),
            }
        }
        if book.is_busy() {
            println!("Run `smartexpense category list` to refresh.");
        }
    }
    Ok(())
}

fn icons() {
    let rows = CATEGORY_ICONS
        .iter()
        .map(|(id, label)| vec![id.to_string(), label.to_string()])
        .collect();
    println!("{}", pretty_table(&["Icon", "Label"], rows));
}

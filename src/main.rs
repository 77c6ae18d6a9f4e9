// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use smartexpense::{cli, commands, db, init_tracing};

fn main() -> Result<()> {
    init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("status", _)) => commands::auth::status(&conn)?,
        Some(("login", sub)) => commands::auth::login(&conn, sub)?,
        Some(("register", sub)) => commands::auth::register(&conn, sub)?,
        Some(("logout", _)) => commands::auth::logout(&conn)?,
        Some(("onboard", sub)) => commands::onboarding::handle(&conn, sub)?,
        Some(("home", sub)) => commands::home::handle(&conn, sub)?,
        Some(("stats", sub)) => commands::stats::handle(&conn, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, sub)?,
        Some(("search", sub)) => commands::search::handle(&conn, sub)?,
        Some(("profile", sub)) => commands::profile::handle(&conn, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

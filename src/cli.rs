// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, value_parser, Arg, ArgAction, Command};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn req(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn yes_flag() -> Arg {
    Arg::new("yes")
        .long("yes")
        .short('y')
        .action(ArgAction::SetTrue)
        .help("Skip the confirmation prompt")
}

pub fn build_cli() -> Command {
    Command::new("smartexpense")
        .version(crate_version!())
        .about("SmartExpense: track income and expenses against the SmartExpense API")
        .subcommand(Command::new("status").about("Show the session and the screen it opens on"))
        .subcommand(
            Command::new("login")
                .about("Log in and store the session token")
                .arg(req("username", "Username"))
                .arg(req("password", "Password (at least 6 characters)")),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account")
                .arg(req("username", "Username"))
                .arg(req("email", "Email address"))
                .arg(req("password", "Password (at least 6 characters)")),
        )
        .subcommand(Command::new("logout").about("Forget the stored session"))
        .subcommand(
            Command::new("onboard")
                .about("Submit the initial balance for a new account")
                .arg(req("balance", "Initial balance (0 or more)")),
        )
        .subcommand(
            Command::new("home")
                .about("Balance, totals and recent transactions")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("stats")
                .about("Income and expense chart for a day, week, month or year")
                .arg(
                    Arg::new("period")
                        .long("period")
                        .short('p')
                        .default_value("week")
                        .help("day | week | month | year"),
                )
                .arg(opt("date", "Reference date YYYY-MM-DD (default: today)"))
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .value_parser(value_parser!(i32))
                        .allow_negative_numbers(true)
                        .default_value("0")
                        .help("Move by N periods (negative goes back)"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("category")
                .about("Manage income and expense categories")
                .subcommand(
                    Command::new("list")
                        .about("List categories")
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Show every category instead of the first three per type"),
                        )
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("add")
                        .about("Add a category")
                        .arg(req("name", "Category name"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("income")
                                .help("income | expense"),
                        )
                        .arg(opt("icon", "Icon identifier (see `category icons`)")),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Edit a non-default category")
                        .arg(req("id", "Category id"))
                        .arg(req("name", "New name"))
                        .arg(req("type", "income | expense"))
                        .arg(opt("icon", "Icon identifier")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a non-default category")
                        .arg(req("id", "Category id"))
                        .arg(yes_flag()),
                )
                .subcommand(Command::new("icons").about("List available icons")),
        )
        .subcommand(
            Command::new("tx").about("Transactions").subcommand(
                Command::new("add")
                    .about("Record a transaction")
                    .arg(req("amount", "Amount (greater than 0)"))
                    .arg(req("type", "income | expense"))
                    .arg(opt("description", "Free-text description"))
                    .arg(
                        Arg::new("category")
                            .long("category")
                            .value_parser(value_parser!(i64))
                            .help("Category id"),
                    ),
            ),
        )
        .subcommand(
            Command::new("search")
                .about("Search transactions")
                .arg(
                    Arg::new("query")
                        .long("query")
                        .short('q')
                        .help("Text to look for in description or category"),
                )
                .arg(opt("type", "income | expense"))
                .arg(opt("from", "Start date YYYY-MM-DD"))
                .arg(opt("to", "End date YYYY-MM-DD"))
                .arg(opt("min", "Minimum amount"))
                .arg(opt("max", "Maximum amount"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .help("Show at most N results"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("profile")
                .about("Change username and/or password")
                .arg(opt("username", "New username"))
                .arg(opt("password", "New password (at least 6 characters)")),
        )
        .subcommand(
            Command::new("config")
                .about("Client configuration")
                .subcommand(Command::new("show").about("Show the active configuration"))
                .subcommand(
                    Command::new("set-api")
                        .about("Set the API base URL")
                        .arg(req("url", "Base URL, e.g. http://192.168.1.4:8000")),
                ),
        )
}

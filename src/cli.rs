// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};

fn filter_args() -> [Arg; 3] {
    [
        Arg::new("from")
            .long("from")
            .value_name("YYYY-MM-DD")
            .help("Only expenses on or after this date"),
        Arg::new("to")
            .long("to")
            .value_name("YYYY-MM-DD")
            .help("Only expenses on or before this date"),
        Arg::new("category")
            .long("category")
            .help("Only this category ('All' for every category)"),
    ]
}

fn output_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    ]
}

fn expense_fields(required: bool) -> [Arg; 4] {
    [
        Arg::new("amount").long("amount").required(required),
        Arg::new("category").long("category").required(required),
        Arg::new("date")
            .long("date")
            .value_name("YYYY-MM-DD")
            .help("Defaults to today for new expenses"),
        Arg::new("description").long("description").alias("note"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("spendclip")
        .version(clap::crate_version!())
        .about("Track expenses and see where the money goes")
        .arg(
            Arg::new("server")
                .long("server")
                .global(true)
                .env("SPENDCLIP_SERVER")
                .value_name("URL")
                .help("Use the expense API at URL instead of a local database"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("SPENDCLIP_DB")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Local SQLite database file"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .global(true)
                .env("SPENDCLIP_TIMEOUT_SECS")
                .value_name("SECS")
                .value_parser(value_parser!(u64))
                .help("HTTP timeout in seconds"),
        )
        .subcommand(
            Command::new("expense")
                .about("Record, edit and list expenses")
                .subcommand(Command::new("add").args(expense_fields(true)))
                .subcommand(
                    Command::new("edit")
                        .about("Replace an expense; omitted fields keep their current value")
                        .arg(Arg::new("id").required(true).value_parser(value_parser!(i64)))
                        .args(expense_fields(false)),
                )
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("id").required(true).value_parser(value_parser!(i64))),
                )
                .subcommand(
                    Command::new("list")
                        .args(filter_args())
                        .args(output_args())
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("color").long("color").value_name("#RRGGBB")),
                )
                .subcommand(Command::new("list").args(output_args())),
        )
        .subcommand(
            Command::new("report")
                .about("Spending analytics for a filtered view")
                .subcommand(
                    Command::new("summary")
                        .args(filter_args())
                        .args(output_args()),
                )
                .subcommand(
                    Command::new("trend")
                        .args(filter_args())
                        .args(output_args())
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .default_value("month")
                                .help("day|week|month|year"),
                        ),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write the filtered expenses to a file")
                .args(filter_args())
                .arg(Arg::new("format").long("format").default_value("csv"))
                .arg(Arg::new("out").long("out").required(true)),
        )
        .subcommand(Command::new("doctor").about("Check store health and data consistency"))
}

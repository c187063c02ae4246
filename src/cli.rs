// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("account")
            .long("account")
            .required(required)
            .help("Account name"),
    )
    .arg(
        Arg::new("type")
            .long("type")
            .required(required)
            .value_parser(["income", "expense"]),
    )
    .arg(Arg::new("category").long("category").required(required))
    .arg(
        Arg::new("amount")
            .long("amount")
            .required(required)
            .allow_hyphen_values(true)
            .help("Positive amount, e.g. 12.50"),
    )
    .arg(Arg::new("description").long("description"))
    .arg(Arg::new("date").long("date").help("YYYY-MM-DD"))
    .arg(
        Arg::new("status")
            .long("status")
            .value_parser(["pending", "completed", "cancelled"]),
    )
}

pub fn build_cli() -> Command {
    Command::new("ledgerline")
        .about("Account balances kept in step with income and expense transactions")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Database file (overrides LEDGERLINE_DB)"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .value_parser(value_parser!(i64))
                .help("Owning user id (overrides LEDGERLINE_USER and settings)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("number").long("number"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("savings")
                                .value_parser(["savings", "checking", "credit", "investment"]),
                        )
                        .arg(Arg::new("currency").long("currency"))
                        .arg(
                            Arg::new("balance")
                                .long("balance")
                                .default_value("0")
                                .allow_hyphen_values(true)
                                .help("Opening balance"),
                        ),
                )
                .subcommand(json_args(
                    Command::new("list").arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("Include closed accounts"),
                    ),
                ))
                .subcommand(json_args(
                    Command::new("show").arg(Arg::new("name").required(true)),
                ))
                .subcommand(Command::new("close").arg(Arg::new("name").required(true)))
                .subcommand(Command::new("rm").arg(Arg::new("name").required(true))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record, edit and list transactions")
                .subcommand(tx_fields(Command::new("add"), true))
                .subcommand(tx_fields(
                    Command::new("edit").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                    false,
                ))
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_parser(["pending", "completed", "cancelled"]),
                        )
                        .arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
                        .arg(Arg::new("to").long("to").help("YYYY-MM-DD"))
                        .arg(Arg::new("account").long("account"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(json_args(
            Command::new("summary").about("Income, expense and balance totals"),
        ))
        .subcommand(
            Command::new("interest")
                .about("Monthly interest by account kind")
                .subcommand(json_args(Command::new("preview")))
                .subcommand(
                    Command::new("apply")
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today")),
                ),
        )
        .subcommand(json_args(
            Command::new("doctor")
                .about("Check stored balances against transactions")
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Rewrite drifted balances"),
                ),
        ))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show"))
                .subcommand(Command::new("set-currency").arg(Arg::new("currency").required(true)))
                .subcommand(
                    Command::new("set-user").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
}

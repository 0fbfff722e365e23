// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
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
            .help("Print as JSON lines"),
    )
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn amount(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).allow_negative_numbers(true)
}

/// Payroll inputs shared by `payroll calc` and `salary add`. Taken as raw text so
/// blank, negative or garbled values fall back to zero instead of failing the parse.
fn payroll_args(cmd: Command) -> Command {
    cmd.arg(amount("basic", "Basic monthly salary"))
        .arg(amount("allowances", "Allowances"))
        .arg(amount("ot-weekday", "Weekday/Saturday overtime hours (1.0x)"))
        .arg(amount("ot-holiday", "Sunday/holiday overtime hours (1.5x)"))
        .arg(amount("epf", "EPF deduction"))
        .arg(amount("etf", "ETF deduction"))
        .arg(amount("loan", "Loan deduction"))
        .arg(amount("tax", "Tax deduction"))
}

fn dir_arg() -> Arg {
    opt("dir", "Directory to write the report into").default_value(".")
}

pub fn build_cli() -> Command {
    Command::new("aqualink")
        .version(env!("CARGO_PKG_VERSION"))
        .about("AquaLink payroll, finance ledger and reports")
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(
            Command::new("payroll")
                .about("Pay slip arithmetic")
                .subcommand(json_flags(payroll_args(
                    Command::new("calc").about("Compute a pay slip without saving it"),
                ))),
        )
        .subcommand(
            Command::new("salary")
                .about("Salary runs (owner only)")
                .subcommand(payroll_args(
                    Command::new("add")
                        .about("Compute and record a salary run")
                        .arg(req("staff-id", "Staff identifier"))
                        .arg(req("staff-name", "Staff display name"))
                        .arg(req("from", "Period start YYYY-MM-DD"))
                        .arg(req("to", "Period end YYYY-MM-DD")),
                ))
                .subcommand(json_flags(Command::new("list").about("List salary runs")))
                .subcommand(Command::new("rm").about("Delete a salary run").arg(req("id", "Salary run id"))),
        )
        .subcommand(
            Command::new("tx")
                .about("Ledger transactions")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Transaction name"))
                        .arg(req("amount", "Positive amount"))
                        .arg(req("type", "CR or DR"))
                        .arg(opt("date", "YYYY-MM-DD (default today)"))
                        .arg(opt("description", "Free text")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("type", "Only CR or DR"))
                        .arg(opt("month", "Only YYYY-MM"))
                        .arg(opt("limit", "Newest N").value_parser(value_parser!(usize))),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(req("id", "Transaction id"))
                        .arg(opt("name", "New name"))
                        .arg(opt("amount", "New amount"))
                        .arg(opt("type", "CR or DR"))
                        .arg(opt("date", "YYYY-MM-DD"))
                        .arg(opt("description", "Free text")),
                )
                .subcommand(Command::new("rm").arg(req("id", "Transaction id"))),
        )
        .subcommand(
            Command::new("finance")
                .about("Finance overview, live updates and withdrawals")
                .subcommand(json_flags(
                    Command::new("overview").about("Fetch the overview").arg(
                        Arg::new("local")
                            .long("local")
                            .action(ArgAction::SetTrue)
                            .help("Aggregate locally from transactions and payments"),
                    ),
                ))
                .subcommand(
                    Command::new("watch")
                        .about("Follow the finance event stream")
                        .arg(
                            opt("max-retries", "Give up after N failed reconnects")
                                .value_parser(value_parser!(u32)),
                        ),
                )
                .subcommand(
                    Command::new("withdraw")
                        .about("Record an owner withdrawal")
                        .arg(req("amount", "Amount to withdraw"))
                        .arg(opt("note", "Description")),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write reports")
                .subcommand(
                    Command::new("finance")
                        .arg(req("format", "csv or pdf"))
                        .arg(dir_arg()),
                )
                .subcommand(Command::new("inventory-history").arg(dir_arg()))
                .subcommand(Command::new("assigned-items").arg(dir_arg())),
        )
        .subcommand(
            Command::new("inventory")
                .about("Fish stock")
                .subcommand(json_flags(
                    Command::new("list").arg(
                        opt("low", "Only items at or below this stock")
                            .value_parser(value_parser!(i64)),
                    ),
                ))
                .subcommand(
                    Command::new("assign")
                        .about("Move stock into a tank")
                        .arg(req("item", "Inventory item id"))
                        .arg(req("qty", "Quantity").value_parser(value_parser!(i64)))
                        .arg(req("tank", "Tank label")),
                )
                .subcommand(
                    Command::new("watch").about("Poll stock levels").arg(
                        opt("interval", "Seconds between polls")
                            .value_parser(value_parser!(u64))
                            .default_value("30"),
                    ),
                ),
        )
        .subcommand(
            Command::new("feedback").about("Testimonials").subcommand(
                Command::new("submit")
                    .arg(req("message", "10 to 200 characters"))
                    .arg(
                        req("rating", "1 to 5")
                            .value_parser(value_parser!(u8)),
                    ),
            ),
        )
        .subcommand(
            Command::new("session")
                .about("Who the CLI acts as")
                .subcommand(
                    Command::new("login")
                        .arg(req("user", "User name"))
                        .arg(req("role", "owner|admin|staff|user"))
                        .arg(opt("token", "Bearer token")),
                )
                .subcommand(Command::new("show"))
                .subcommand(Command::new("logout")),
        )
        .subcommand(
            Command::new("config")
                .about("Stored settings")
                .subcommand(
                    Command::new("set")
                        .arg(req("key", "api_url|currency|timeout_secs|recent_limit|earnings_months"))
                        .arg(req("value", "Value")),
                )
                .subcommand(Command::new("unset").arg(req("key", "Setting key")))
                .subcommand(Command::new("show")),
        )
}

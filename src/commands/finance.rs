// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use tracing::warn;

use super::Ctx;
use crate::db;
use crate::error::ApiResult;
use crate::events::{FinanceWatcher, StopHandle};
use crate::finance::{Freshness, OverviewView, aggregate};
use crate::models::FinanceOverview;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use crate::withdrawal::Withdrawals;

pub fn handle(ctx: &Ctx<'_>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("overview", sub)) => overview(ctx, sub)?,
        Some(("watch", sub)) => watch(ctx, sub)?,
        Some(("withdraw", sub)) => withdraw(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

/// Builds the overview on this side from the raw ledger instead of asking the backend.
pub fn aggregate_locally(ctx: &Ctx<'_>) -> ApiResult<FinanceOverview> {
    let transactions = ctx.backend.transactions()?;
    let payments = ctx.backend.payments()?;
    Ok(aggregate(
        &transactions,
        &payments,
        ctx.today(),
        ctx.config.earnings_months,
    ))
}

/// Fetches the overview, falling back to the last stored snapshot when the
/// backend is unreachable. Fresh results replace the snapshot.
pub fn load_overview(ctx: &Ctx<'_>, local: bool) -> Result<(FinanceOverview, Freshness)> {
    let fetched = if local {
        aggregate_locally(ctx)
    } else {
        ctx.backend.overview()
    };
    let mut view = match db::last_overview_snapshot(ctx.conn)? {
        Some((_, snapshot)) => OverviewView::with_snapshot(snapshot),
        None => OverviewView::new(),
    };
    let (overview, freshness) = view.apply(fetched).context("Load finance overview")?;
    if freshness == Freshness::Fresh {
        db::save_overview_snapshot(ctx.conn, overview, ctx.now)?;
    }
    Ok((overview.clone(), freshness))
}

pub fn print_overview(o: &FinanceOverview, ccy: &str) {
    let totals = vec![
        vec!["Available Balance".into(), fmt_money(&o.available_balance, ccy, false)],
        vec!["This Month Net".into(), fmt_money(&o.this_month_net, ccy, false)],
        vec!["Lifetime Earnings".into(), fmt_money(&o.lifetime_earnings, ccy, false)],
        vec!["Income".into(), fmt_money(&o.income, ccy, false)],
        vec!["Expense".into(), fmt_money(&o.expense, ccy, false)],
        vec!["Net".into(), fmt_money(&o.net, ccy, false)],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], totals));

    let trend = o
        .earnings
        .iter()
        .map(|e| {
            vec![
                e.month.clone(),
                fmt_money(&e.amount, ccy, false),
                e.growth
                    .map(|g| format!("{:.2}%", g))
                    .unwrap_or_else(|| "n/a".into()),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Month", "Net", "Growth"], trend));

    let recent = o
        .recent
        .iter()
        .map(|a| {
            vec![
                a.date.to_string(),
                a.source.to_string(),
                a.description.clone(),
                a.display_amount(ccy),
                a.status.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Source", "Description", "Amount", "Status"], recent)
    );
}

fn overview(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let (o, freshness) = load_overview(ctx, sub.get_flag("local"))?;
    if let Freshness::Stale(why) = &freshness {
        warn!(error = %why, "showing last saved overview");
        eprintln!("warning: backend unavailable ({}); showing last saved overview", why);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &o)? {
        print_overview(&o, &ctx.config.currency);
    }
    Ok(())
}

fn watch(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let mut backoff = ctx.config.reconnect.clone();
    if let Some(n) = sub.get_one::<u32>("max-retries") {
        backoff.max_attempts = Some(*n);
    }
    let view = match db::last_overview_snapshot(ctx.conn)? {
        Some((_, snapshot)) => OverviewView::with_snapshot(snapshot),
        None => OverviewView::new(),
    };
    let mut watcher = FinanceWatcher::new(backoff, StopHandle::new()).with_view(view);
    let ccy = ctx.config.currency.clone();
    watcher
        .run(
            || ctx.backend.subscribe(),
            || ctx.backend.overview(),
            |o, freshness| {
                if *freshness == Freshness::Fresh {
                    if let Err(e) = db::save_overview_snapshot(ctx.conn, o, chrono::Utc::now()) {
                        warn!(error = %e, "could not store overview snapshot");
                    }
                }
                print_overview(o, &ccy);
            },
        )
        .context("Finance event stream")?;
    Ok(())
}

fn withdraw(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<()> {
    ctx.require_owner()?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let note = sub.get_one::<String>("note").map(|s| s.trim());
    let receipt = Withdrawals::new()
        .submit(ctx.backend, amount, note, ctx.today())
        .context("Withdrawal")?;
    let ccy = &ctx.config.currency;
    println!(
        "Withdrew {} (transaction {})",
        fmt_money(&amount, ccy, false),
        receipt.transaction.id
    );
    match receipt.after {
        Some(after) => println!(
            "Available balance: {} -> {}",
            fmt_money(&receipt.before.available_balance, ccy, false),
            fmt_money(&after.available_balance, ccy, false)
        ),
        None => println!("Balance refresh failed; run `aqualink finance overview` to update"),
    }
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use tracing::info;

use super::Ctx;
use super::finance::load_overview;
use crate::finance::Freshness;
use crate::report::{self, FinanceReportData, ReportFormat};

pub fn handle(ctx: &Ctx<'_>, m: &clap::ArgMatches) -> Result<()> {
    let written = match m.subcommand() {
        Some(("finance", sub)) => export_finance(ctx, sub)?,
        Some(("inventory-history", sub)) => export_inventory_history(ctx, sub)?,
        Some(("assigned-items", sub)) => export_assigned_items(ctx, sub)?,
        _ => return Ok(()),
    };
    println!("Exported {}", written.display());
    Ok(())
}

fn out_dir(sub: &clap::ArgMatches) -> &Path {
    Path::new(sub.get_one::<String>("dir").map(|s| s.trim()).unwrap_or("."))
}

/// Everything is fetched and rendered before the file is created, so a failure
/// at any step leaves nothing behind.
pub fn export_finance(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<PathBuf> {
    let fmt_raw = sub.get_one::<String>("format").unwrap();
    let format = ReportFormat::parse(fmt_raw)
        .ok_or_else(|| anyhow!("Unknown format: {} (use csv|pdf)", fmt_raw))?;
    let (overview, freshness) = load_overview(ctx, false)?;
    if let Freshness::Stale(why) = freshness {
        return Err(anyhow!("Backend unavailable, refusing to export stale figures: {}", why));
    }
    let bytes = match format {
        ReportFormat::Csv => report::finance_csv(&overview, ctx.config.recent_limit)?,
        ReportFormat::Pdf => {
            let transactions = ctx.backend.transactions().context("Fetch transactions")?;
            let payments = ctx.backend.payments().context("Fetch payments")?;
            let salaries = ctx.backend.salaries().context("Fetch salary runs")?;
            report::finance_pdf(
                &FinanceReportData {
                    overview: &overview,
                    transactions: &transactions,
                    payments: &payments,
                    salaries: &salaries,
                },
                ctx.now,
            )?
        }
    };
    let path = report::report_path(out_dir(sub), "finance-report", format, ctx.now);
    report::save(&path, &bytes).with_context(|| format!("Write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "finance report written");
    Ok(path)
}

pub fn export_inventory_history(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<PathBuf> {
    let items = ctx.backend.inventory().context("Fetch inventory")?;
    let bytes = report::inventory_history_pdf(&items, ctx.now)?;
    let path = report::report_path(out_dir(sub), "inventory-history", ReportFormat::Pdf, ctx.now);
    report::save(&path, &bytes).with_context(|| format!("Write {}", path.display()))?;
    Ok(path)
}

pub fn export_assigned_items(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<PathBuf> {
    let assignments = ctx.backend.assignments().context("Fetch tank assignments")?;
    let bytes = report::assigned_items_pdf(&assignments, ctx.now)?;
    let path = report::report_path(out_dir(sub), "assigned-items", ReportFormat::Pdf, ctx.now);
    report::save(&path, &bytes).with_context(|| format!("Write {}", path.display()))?;
    Ok(path)
}

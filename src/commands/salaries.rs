// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use super::Ctx;
use super::payroll::{raw_input, slip_table};
use crate::models::SalaryRecord;
use crate::payroll::PayrollInput;
use crate::utils::{maybe_print_json, parse_date, pretty_table};

pub fn handle(ctx: &Ctx<'_>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim();
            ctx.backend
                .delete_salary(id)
                .with_context(|| format!("Delete salary run {}", id))?;
            println!("Removed salary run {}", id);
        }
        _ => {}
    }
    Ok(())
}

pub fn record_from_args(sub: &clap::ArgMatches) -> Result<SalaryRecord> {
    let period_start = parse_date(sub.get_one::<String>("from").unwrap())?;
    let period_end = parse_date(sub.get_one::<String>("to").unwrap())?;
    if period_end < period_start {
        return Err(anyhow!(
            "Pay period ends ({}) before it starts ({})",
            period_end,
            period_start
        ));
    }
    let staff_id = sub.get_one::<String>("staff-id").unwrap().trim().to_string();
    let staff_name = sub.get_one::<String>("staff-name").unwrap().trim().to_string();
    if staff_id.is_empty() || staff_name.is_empty() {
        return Err(anyhow!("Staff id and name are required"));
    }
    Ok(SalaryRecord {
        id: None,
        staff_id,
        staff_name,
        period_start,
        period_end,
        input: PayrollInput::from_raw(&raw_input(sub)),
    })
}

fn add(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let record = record_from_args(sub)?;
    let slip = record.slip();
    let saved = ctx
        .backend
        .create_salary(&record)
        .context("Record salary run")?;
    println!(
        "Recorded salary run for {} ({} to {}){}",
        record.staff_name,
        record.period_start,
        record.period_end,
        saved.id.map(|id| format!(" as {}", id)).unwrap_or_default()
    );
    println!("{}", slip_table(&record.input, &slip));
    Ok(())
}

#[derive(Serialize)]
pub struct SalaryRow {
    pub id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub period: String,
    pub gross_pay: String,
    pub deductions: String,
    pub net_pay: String,
}

/// Pay figures are recomputed from each run's inputs, never taken from the wire.
pub fn salary_rows(records: &[SalaryRecord]) -> Vec<SalaryRow> {
    records
        .iter()
        .map(|r| {
            let slip = r.slip();
            SalaryRow {
                id: r.id.clone().unwrap_or_default(),
                staff_id: r.staff_id.clone(),
                staff_name: r.staff_name.clone(),
                period: format!("{} to {}", r.period_start, r.period_end),
                gross_pay: format!("{:.2}", slip.gross_pay),
                deductions: format!("{:.2}", r.input.total_deductions()),
                net_pay: format!("{:.2}", slip.net_pay),
            }
        })
        .collect()
}

fn list(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let records = ctx.backend.salaries().context("Fetch salary runs")?;
    let data = salary_rows(&records);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.staff_id.clone(),
                    r.staff_name.clone(),
                    r.period.clone(),
                    r.gross_pay.clone(),
                    r.deductions.clone(),
                    r.net_pay.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Staff", "Name", "Period", "Gross", "Deductions", "Net"],
                rows
            )
        );
    }
    Ok(())
}

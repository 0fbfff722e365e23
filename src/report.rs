// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Finance and inventory reports as CSV or PDF bytes.

use chrono::{DateTime, Utc};
use csv::{QuoteStyle, WriterBuilder};
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::models::{FinanceOverview, InventoryItem, Payment, SalaryRecord, TankAssignment, Transaction};
use crate::pdf::{self, TableSection, col};
use crate::utils::{dated_filename, sanitize_csv_field, write_atomic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Pdf,
}

impl ReportFormat {
    pub fn parse(s: &str) -> Option<ReportFormat> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(ReportFormat::Csv),
            "pdf" => Some(ReportFormat::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Pdf => "pdf",
        }
    }
}

fn money(d: &rust_decimal::Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

fn signed_money(d: &rust_decimal::Decimal) -> String {
    let r = d.round_dp(2);
    if r > rust_decimal::Decimal::ZERO {
        format!("+{:.2}", r)
    } else {
        format!("{:.2}", r)
    }
}

fn csv_section(title: &str, headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());
    wtr.write_record([title])?;
    wtr.write_record(headers)?;
    for r in rows {
        wtr.write_record(r.iter().map(|f| sanitize_csv_field(f)))?;
    }
    Ok(wtr.into_inner()?)
}

pub fn totals_rows(o: &FinanceOverview) -> Vec<Vec<String>> {
    [
        ("Available Balance", &o.available_balance),
        ("This Month Net", &o.this_month_net),
        ("Lifetime Earnings", &o.lifetime_earnings),
        ("Income", &o.income),
        ("Expense", &o.expense),
        ("Net", &o.net),
    ]
    .into_iter()
    .map(|(k, v)| vec![k.to_string(), money(v)])
    .collect()
}

fn earnings_rows(o: &FinanceOverview) -> Vec<Vec<String>> {
    o.earnings
        .iter()
        .map(|e| {
            vec![
                e.month.clone(),
                money(&e.amount),
                e.growth.map(|g| format!("{:.2}", g)).unwrap_or_else(|| "n/a".into()),
            ]
        })
        .collect()
}

/// Three sections separated by a blank line: Totals, Monthly Earnings, and the
/// newest `recent_limit` rows of Recent Activity. Fields are never quoted.
pub fn finance_csv(overview: &FinanceOverview, recent_limit: usize) -> Result<Vec<u8>, ExportError> {
    let recent: Vec<Vec<String>> = overview
        .recent
        .iter()
        .take(recent_limit)
        .map(|a| {
            vec![
                a.date.to_string(),
                a.source.to_string(),
                a.kind.to_string(),
                a.description.clone(),
                signed_money(&a.amount),
                a.status.clone(),
            ]
        })
        .collect();
    let sections = [
        csv_section("Totals", &["Metric", "Value"], &totals_rows(overview))?,
        csv_section(
            "Monthly Earnings",
            &["Month", "Amount", "Growth %"],
            &earnings_rows(overview),
        )?,
        csv_section(
            "Recent Activity",
            &["Date", "Source", "Type", "Description", "Amount", "Status"],
            &recent,
        )?,
    ];
    Ok(sections.join(&b"\n"[..]))
}

pub fn transaction_rows(transactions: &[Transaction]) -> Vec<Vec<String>> {
    transactions
        .iter()
        .enumerate()
        .map(|(i, t)| {
            vec![
                (i + 1).to_string(),
                t.name.clone(),
                t.tx_type.to_string(),
                money(&t.amount),
                t.date.to_string(),
                t.description.clone(),
                t.order_id.clone().unwrap_or_else(|| "-".into()),
                t.staff.clone().unwrap_or_else(|| "-".into()),
            ]
        })
        .collect()
}

pub struct FinanceReportData<'a> {
    pub overview: &'a FinanceOverview,
    pub transactions: &'a [Transaction],
    pub payments: &'a [Payment],
    pub salaries: &'a [SalaryRecord],
}

/// Summary and trend on the cover page; transactions, payments and staff pay each
/// start their own page.
pub fn finance_pdf(
    data: &FinanceReportData<'_>,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    let payments = data
        .payments
        .iter()
        .enumerate()
        .map(|(i, p)| {
            vec![
                (i + 1).to_string(),
                p.id.clone(),
                p.order_id.clone().unwrap_or_else(|| "-".into()),
                p.method.clone(),
                p.status.clone(),
                money(&p.amount),
                p.created_at.to_string(),
            ]
        })
        .collect();
    let staff = data
        .salaries
        .iter()
        .map(|s| {
            let slip = s.slip();
            vec![
                s.staff_id.clone(),
                s.staff_name.clone(),
                format!("{} to {}", s.period_start, s.period_end),
                money(&s.input.basic_salary),
                money(&s.input.allowances),
                money(&(slip.ot_weekday_amount + slip.ot_holiday_amount)),
                money(&slip.gross_pay),
                money(&s.input.total_deductions()),
                money(&slip.net_pay),
            ]
        })
        .collect();
    let sections = vec![
        TableSection {
            title: "Summary".into(),
            columns: vec![col("Metric", 60.0), col("Value", 50.0)],
            rows: totals_rows(data.overview),
            new_page: false,
        },
        TableSection {
            title: "Monthly Earnings".into(),
            columns: vec![col("Month", 40.0), col("Amount", 40.0), col("Growth %", 30.0)],
            rows: earnings_rows(data.overview),
            new_page: false,
        },
        TableSection {
            title: "Transactions".into(),
            columns: vec![
                col("Txn#", 14.0),
                col("Name", 40.0),
                col("Type", 14.0),
                col("Amount", 28.0),
                col("Date", 24.0),
                col("Description", 82.0),
                col("OrderId", 36.0),
                col("Staff", 35.0),
            ],
            rows: transaction_rows(data.transactions),
            new_page: true,
        },
        TableSection {
            title: "Payments".into(),
            columns: vec![
                col("#", 12.0),
                col("Payment ID", 55.0),
                col("Order ID", 55.0),
                col("Method", 35.0),
                col("Status", 30.0),
                col("Amount", 40.0),
                col("Date", 30.0),
            ],
            rows: payments,
            new_page: true,
        },
        TableSection {
            title: "Staff".into(),
            columns: vec![
                col("Staff ID", 24.0),
                col("Name", 40.0),
                col("Period", 46.0),
                col("Basic", 26.0),
                col("Allowances", 26.0),
                col("OT", 24.0),
                col("Gross", 28.0),
                col("Deductions", 28.0),
                col("Net", 28.0),
            ],
            rows: staff,
            new_page: true,
        },
    ];
    pdf::render("AquaLink Finance Report", generated_at, &sections)
}

pub fn inventory_history_pdf(
    items: &[InventoryItem],
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    let rows = items
        .iter()
        .map(|i| {
            vec![
                i.code.clone(),
                i.name.clone(),
                i.category.clone(),
                i.stock.to_string(),
                i.updated_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    let sections = [TableSection {
        title: "Inventory".into(),
        columns: vec![
            col("Code", 35.0),
            col("Name", 80.0),
            col("Category", 60.0),
            col("Stock", 25.0),
            col("Updated", 60.0),
        ],
        rows,
        new_page: false,
    }];
    pdf::render("AquaLink Inventory History", generated_at, &sections)
}

pub fn assigned_items_pdf(
    assignments: &[TankAssignment],
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    let rows = assignments
        .iter()
        .map(|a| {
            vec![
                a.item_name.clone(),
                a.code.clone(),
                a.tank.clone(),
                a.quantity.to_string(),
                a.assigned_at.format("%Y-%m-%d %H:%M").to_string(),
                a.assigned_by.clone(),
            ]
        })
        .collect();
    let sections = [TableSection {
        title: "Assigned Items".into(),
        columns: vec![
            col("Item", 70.0),
            col("Code", 35.0),
            col("Tank", 40.0),
            col("Quantity", 25.0),
            col("Assigned", 45.0),
            col("By", 55.0),
        ],
        rows,
        new_page: false,
    }];
    pdf::render("AquaLink Assigned Items", generated_at, &sections)
}

/// `<dir>/<stem>-YYYY-MM-DD.<ext>`, dated by `generated_at`.
pub fn report_path(dir: &Path, stem: &str, format: ReportFormat, generated_at: DateTime<Utc>) -> PathBuf {
    dir.join(dated_filename(stem, generated_at.date_naive(), format.extension()))
}

/// Writes a finished document. Either the whole file lands or none of it does.
pub fn save(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    write_atomic(path, bytes)?;
    Ok(())
}

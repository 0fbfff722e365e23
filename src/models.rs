// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::payroll::{PayrollInput, PaySlip};

/// Credit (income) or debit (expense).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    #[serde(rename = "CR")]
    Credit,
    #[serde(rename = "DR")]
    Debit,
}

impl TxType {
    pub fn code(&self) -> &'static str {
        match self {
            TxType::Credit => "CR",
            TxType::Debit => "DR",
        }
    }

    pub fn parse(s: &str) -> Option<TxType> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CR" | "CREDIT" | "INCOME" => Some(TxType::Credit),
            "DR" | "DEBIT" | "EXPENSE" => Some(TxType::Debit),
            _ => None,
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    #[serde(with = "flexible_date")]
    pub date: NaiveDate,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff: Option<String>,
}

impl Transaction {
    /// Positive for credits, negative for debits.
    pub fn signed_amount(&self) -> Decimal {
        match self.tx_type {
            TxType::Credit => self.amount,
            TxType::Debit => -self.amount,
        }
    }
}

/// Body for `POST /api/transactions` and `PATCH /api/transactions/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDraft {
    pub name: String,
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    #[serde(with = "flexible_date")]
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub method: String,
    #[serde(default = "default_payment_status")]
    pub status: String,
    #[serde(with = "flexible_date", alias = "date")]
    pub created_at: NaiveDate,
}

fn default_payment_status() -> String {
    "paid".to_string()
}

/// A salary run. Only the inputs are held; pay figures come from [`SalaryRecord::slip`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub staff_id: String,
    pub staff_name: String,
    #[serde(with = "flexible_date")]
    pub period_start: NaiveDate,
    #[serde(with = "flexible_date")]
    pub period_end: NaiveDate,
    #[serde(flatten)]
    pub input: PayrollInput,
}

impl SalaryRecord {
    pub fn slip(&self) -> PaySlip {
        self.input.calculate()
    }
}

/// Wire body for `POST /api/salaries`: the inputs plus the pay figures computed from them.
#[derive(Debug, Serialize)]
pub struct SalaryPayload<'a> {
    #[serde(flatten)]
    pub record: &'a SalaryRecord,
    #[serde(flatten)]
    pub slip: PaySlip,
}

impl<'a> SalaryPayload<'a> {
    pub fn new(record: &'a SalaryRecord) -> Self {
        SalaryPayload {
            record,
            slip: record.slip().rounded(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEarning {
    /// YYYY-MM
    pub month: String,
    pub amount: Decimal,
    /// Percent change against the previous month; `None` when that month was zero.
    #[serde(default)]
    pub growth: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivitySource {
    Transaction,
    Payment,
}

impl fmt::Display for ActivitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivitySource::Transaction => f.write_str("transaction"),
            ActivitySource::Payment => f.write_str("payment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Income,
    Expense,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Income => f.write_str("income"),
            ActivityKind::Expense => f.write_str("expense"),
        }
    }
}

/// One row of the merged recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub source: ActivitySource,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    /// Signed: debits are negative.
    pub amount: Decimal,
    #[serde(with = "flexible_date")]
    pub date: NaiveDate,
    pub status: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceOverview {
    pub available_balance: Decimal,
    pub this_month_net: Decimal,
    pub lifetime_earnings: Decimal,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    #[serde(default)]
    pub earnings: Vec<MonthlyEarning>,
    #[serde(default)]
    pub recent: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub category: String,
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankAssignment {
    pub item_id: String,
    pub item_name: String,
    #[serde(default)]
    pub code: String,
    pub tank: String,
    pub quantity: i64,
    pub assigned_at: DateTime<Utc>,
    #[serde(default)]
    pub assigned_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub message: String,
    pub rating: u8,
}

/// Backend dates arrive either as `YYYY-MM-DD` or as full RFC 3339 timestamps.
pub mod flexible_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(d: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&d.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        let raw = raw.trim();
        if let Ok(d) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Ok(d);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .map_err(|_| format!("invalid date '{}'", raw))
    }
}

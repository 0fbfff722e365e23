// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger aggregation: totals, the monthly trend and the merged activity feed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    ActivityEntry, ActivityKind, ActivitySource, FinanceOverview, MonthlyEarning, Payment,
    Transaction, TxType,
};
use crate::utils::{fmt_money, month_key, month_start};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
}

impl Totals {
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }

    fn add_transaction(&mut self, tx: &Transaction) {
        match tx.tx_type {
            TxType::Credit => self.income += tx.amount,
            TxType::Debit => self.expense += tx.amount,
        }
    }
}

/// Income is payments plus credits; expense is debits.
pub fn totals<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    payments: impl IntoIterator<Item = &'a Payment>,
) -> Totals {
    let mut t = Totals::default();
    for tx in transactions {
        t.add_transaction(tx);
    }
    for p in payments {
        t.income += p.amount;
    }
    t
}

fn in_month(date: NaiveDate, key: &str) -> bool {
    month_key(date) == key
}

/// Net per `YYYY-MM` across both sources.
pub fn monthly_net(transactions: &[Transaction], payments: &[Payment]) -> BTreeMap<String, Decimal> {
    let mut map: BTreeMap<String, Decimal> = BTreeMap::new();
    for tx in transactions {
        *map.entry(month_key(tx.date)).or_insert(Decimal::ZERO) += tx.signed_amount();
    }
    for p in payments {
        *map.entry(month_key(p.created_at)).or_insert(Decimal::ZERO) += p.amount;
    }
    map
}

/// `(curr - prev) / prev * 100`, undefined when the previous month was zero.
pub fn growth_percent(prev: Decimal, curr: Decimal) -> Option<Decimal> {
    if prev.is_zero() {
        return None;
    }
    Some(((curr - prev) / prev * Decimal::ONE_HUNDRED).round_dp(2))
}

/// The trailing `months` calendar months ending with the month of `today`, oldest
/// first. The first entry's growth is measured against the month before the window.
pub fn earnings_trend(
    transactions: &[Transaction],
    payments: &[Payment],
    today: NaiveDate,
    months: usize,
) -> Vec<MonthlyEarning> {
    let by_month = monthly_net(transactions, payments);
    let net_of = |offset: i32| -> Decimal {
        by_month
            .get(&month_key(month_start(today, offset)))
            .copied()
            .unwrap_or(Decimal::ZERO)
    };
    let months = months as i32;
    let mut prev = net_of(-months);
    let mut out = Vec::with_capacity(months as usize);
    for offset in (1 - months)..=0 {
        let amount = net_of(offset);
        out.push(MonthlyEarning {
            month: month_key(month_start(today, offset)),
            amount,
            growth: growth_percent(prev, amount),
        });
        prev = amount;
    }
    out
}

fn transaction_entry(tx: &Transaction) -> ActivityEntry {
    let description = if tx.description.trim().is_empty() {
        tx.name.clone()
    } else {
        format!("{}: {}", tx.name, tx.description)
    };
    ActivityEntry {
        source: ActivitySource::Transaction,
        kind: match tx.tx_type {
            TxType::Credit => ActivityKind::Income,
            TxType::Debit => ActivityKind::Expense,
        },
        description,
        amount: tx.signed_amount(),
        date: tx.date,
        status: "completed".to_string(),
        id: tx.id.clone(),
    }
}

fn payment_entry(p: &Payment) -> ActivityEntry {
    let description = match (&p.order_id, p.method.trim()) {
        (Some(order), "") => format!("Order {}", order),
        (Some(order), method) => format!("Order {} ({})", order, method),
        (None, "") => "Order payment".to_string(),
        (None, method) => format!("Order payment ({})", method),
    };
    ActivityEntry {
        source: ActivitySource::Payment,
        kind: ActivityKind::Income,
        description,
        amount: p.amount.abs(),
        date: p.created_at,
        status: p.status.clone(),
        id: p.id.clone(),
    }
}

/// Both sources merged, newest first. Ties keep transactions ahead of payments.
pub fn recent_activity(
    transactions: &[Transaction],
    payments: &[Payment],
    limit: Option<usize>,
) -> Vec<ActivityEntry> {
    let mut feed: Vec<ActivityEntry> = transactions
        .iter()
        .map(transaction_entry)
        .chain(payments.iter().map(payment_entry))
        .collect();
    feed.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(n) = limit {
        feed.truncate(n);
    }
    feed
}

impl ActivityEntry {
    /// Signed with the currency prefix; payments always read as income.
    pub fn display_amount(&self, ccy: &str) -> String {
        match self.source {
            ActivitySource::Transaction => fmt_money(&self.amount, ccy, true),
            ActivitySource::Payment => fmt_money(&self.amount.abs(), ccy, true),
        }
    }
}

pub fn aggregate(
    transactions: &[Transaction],
    payments: &[Payment],
    today: NaiveDate,
    months: usize,
) -> FinanceOverview {
    let lifetime = totals(transactions, payments);
    let current = month_key(today);
    let this_month = totals(
        transactions.iter().filter(|t| in_month(t.date, &current)),
        payments.iter().filter(|p| in_month(p.created_at, &current)),
    );
    FinanceOverview {
        // withdrawals are DR transactions, already inside `expense`
        available_balance: lifetime.net(),
        this_month_net: this_month.net(),
        lifetime_earnings: lifetime.income,
        income: lifetime.income,
        expense: lifetime.expense,
        net: lifetime.net(),
        earnings: earnings_trend(transactions, payments, today, months),
        recent: recent_activity(transactions, payments, None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    /// Showing the last good overview; the string is why the refresh failed.
    Stale(String),
}

/// Holds the last overview that loaded successfully.
#[derive(Debug, Default)]
pub struct OverviewView {
    current: Option<FinanceOverview>,
}

impl OverviewView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(overview: FinanceOverview) -> Self {
        OverviewView {
            current: Some(overview),
        }
    }

    pub fn current(&self) -> Option<&FinanceOverview> {
        self.current.as_ref()
    }

    /// A failed fetch keeps the previous overview. It only surfaces as an error
    /// when nothing has ever loaded.
    pub fn apply(
        &mut self,
        fetched: ApiResult<FinanceOverview>,
    ) -> Result<(&FinanceOverview, Freshness), ApiError> {
        match fetched {
            Ok(o) => {
                let cur: &FinanceOverview = self.current.insert(o);
                Ok((cur, Freshness::Fresh))
            }
            Err(e) => match self.current.as_ref() {
                Some(cur) => Ok((cur, Freshness::Stale(e.to_string()))),
                None => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, ty: TxType, amount: i64, date: (i32, u32, u32)) -> Transaction {
        Transaction {
            id: id.into(),
            name: format!("tx {}", id),
            description: String::new(),
            amount: Decimal::from(amount),
            tx_type: ty,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            recorded_at: None,
            order_id: None,
            staff: None,
        }
    }

    #[test]
    fn growth_is_undefined_after_an_empty_month() {
        assert_eq!(growth_percent(Decimal::ZERO, Decimal::from(10)), None);
        assert_eq!(
            growth_percent(Decimal::from(200), Decimal::from(250)),
            Some(Decimal::from(25))
        );
    }

    #[test]
    fn trend_uses_month_before_window_as_baseline() {
        let txs = vec![
            tx("a", TxType::Credit, 100, (2025, 1, 10)),
            tx("b", TxType::Credit, 150, (2025, 2, 3)),
            tx("c", TxType::Debit, 30, (2025, 3, 1)),
        ];
        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        let trend = earnings_trend(&txs, &[], today, 2);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].month, "2025-02");
        assert_eq!(trend[0].growth, Some(Decimal::from(50)));
        assert_eq!(trend[1].month, "2025-03");
        assert_eq!(trend[1].amount, Decimal::from(-30));
        assert_eq!(trend[1].growth, Some(Decimal::from(-120)));
    }

    #[test]
    fn stale_view_survives_failed_refresh() {
        let mut view = OverviewView::new();
        assert!(view.apply(Err(ApiError::Unauthorized)).is_err());
        let o = aggregate(&[], &[], NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 1);
        view.apply(Ok(o.clone())).unwrap();
        let (cur, fresh) = view.apply(Err(ApiError::StreamClosed)).unwrap();
        assert_eq!(cur, &o);
        assert!(matches!(fresh, Freshness::Stale(_)));
    }
}

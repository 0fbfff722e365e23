// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{Cursor, Read};

use aqualink::api::FinanceBackend;
use aqualink::config::Config;
use aqualink::error::{ApiError, ApiResult};
use aqualink::finance::aggregate;
use aqualink::models::*;
use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn tx(id: &str, ty: TxType, amount: &str, date: NaiveDate) -> Transaction {
    Transaction {
        id: id.into(),
        name: format!("Entry {}", id),
        description: String::new(),
        amount: dec(amount),
        tx_type: ty,
        date,
        recorded_at: None,
        order_id: None,
        staff: None,
    }
}

pub fn payment(id: &str, amount: &str, date: NaiveDate) -> Payment {
    Payment {
        id: id.into(),
        order_id: Some(format!("ORD-{}", id)),
        amount: dec(amount),
        method: "card".into(),
        status: "paid".into(),
        created_at: date,
    }
}

pub fn item(id: &str, stock: i64) -> InventoryItem {
    InventoryItem {
        id: id.into(),
        name: format!("Guppy {}", id),
        code: format!("F-{}", id),
        category: "Livebearers".into(),
        stock,
        updated_at: None,
    }
}

pub fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    aqualink::db::init_schema(&conn).unwrap();
    conn
}

/// Fixed "today" used by [`FakeBackend`] when it aggregates.
pub fn today() -> NaiveDate {
    d(2025, 3, 15)
}

pub fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 15, 9, 30, 0).unwrap()
}

/// In-memory ledger that answers like the backend does, computing the overview
/// from whatever it currently holds.
#[derive(Default)]
pub struct FakeBackend {
    pub transactions: RefCell<Vec<Transaction>>,
    pub payments: RefCell<Vec<Payment>>,
    pub salaries: RefCell<Vec<SalaryRecord>>,
    pub inventory: RefCell<Vec<InventoryItem>>,
    pub assignments: RefCell<Vec<TankAssignment>>,
    pub feedback: RefCell<Vec<Feedback>>,
    /// Raw SSE bodies handed out by successive `subscribe` calls.
    pub streams: RefCell<VecDeque<ApiResult<String>>>,
    pub offline: Cell<bool>,
    pub overview_calls: Cell<u32>,
    pub writes: Cell<u32>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(transactions: Vec<Transaction>, payments: Vec<Payment>) -> Self {
        let b = Self::new();
        *b.transactions.borrow_mut() = transactions;
        *b.payments.borrow_mut() = payments;
        b
    }

    fn online(&self) -> ApiResult<()> {
        if self.offline.get() {
            return Err(ApiError::Status {
                status: 503,
                body: "down".into(),
            });
        }
        Ok(())
    }

    fn next_id(&self) -> String {
        self.writes.set(self.writes.get() + 1);
        format!("fake-{}", self.writes.get())
    }
}

impl FinanceBackend for FakeBackend {
    fn overview(&self) -> ApiResult<FinanceOverview> {
        self.overview_calls.set(self.overview_calls.get() + 1);
        self.online()?;
        Ok(aggregate(
            &self.transactions.borrow(),
            &self.payments.borrow(),
            today(),
            Config::default().earnings_months,
        ))
    }

    fn transactions(&self) -> ApiResult<Vec<Transaction>> {
        self.online()?;
        Ok(self.transactions.borrow().clone())
    }

    fn create_transaction(&self, draft: &TransactionDraft) -> ApiResult<Transaction> {
        self.online()?;
        let t = Transaction {
            id: self.next_id(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            amount: draft.amount,
            tx_type: draft.tx_type,
            date: draft.date,
            recorded_at: None,
            order_id: None,
            staff: None,
        };
        self.transactions.borrow_mut().push(t.clone());
        Ok(t)
    }

    fn update_transaction(&self, id: &str, draft: &TransactionDraft) -> ApiResult<Transaction> {
        self.online()?;
        let mut all = self.transactions.borrow_mut();
        let t = all
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("/api/transactions/{}", id)))?;
        t.name = draft.name.clone();
        t.description = draft.description.clone();
        t.amount = draft.amount;
        t.tx_type = draft.tx_type;
        t.date = draft.date;
        Ok(t.clone())
    }

    fn delete_transaction(&self, id: &str) -> ApiResult<()> {
        self.online()?;
        self.transactions.borrow_mut().retain(|t| t.id != id);
        Ok(())
    }

    fn payments(&self) -> ApiResult<Vec<Payment>> {
        self.online()?;
        Ok(self.payments.borrow().clone())
    }

    fn salaries(&self) -> ApiResult<Vec<SalaryRecord>> {
        self.online()?;
        Ok(self.salaries.borrow().clone())
    }

    fn create_salary(&self, record: &SalaryRecord) -> ApiResult<SalaryRecord> {
        self.online()?;
        let mut saved = record.clone();
        saved.id = Some(self.next_id());
        self.salaries.borrow_mut().push(saved.clone());
        Ok(saved)
    }

    fn delete_salary(&self, id: &str) -> ApiResult<()> {
        self.online()?;
        self.salaries
            .borrow_mut()
            .retain(|s| s.id.as_deref() != Some(id));
        Ok(())
    }

    fn inventory(&self) -> ApiResult<Vec<InventoryItem>> {
        self.online()?;
        Ok(self.inventory.borrow().clone())
    }

    fn inventory_item(&self, id: &str) -> ApiResult<InventoryItem> {
        self.online()?;
        self.inventory
            .borrow()
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/api/fishinventory/{}", id)))
    }

    fn set_stock(&self, id: &str, stock: i64) -> ApiResult<InventoryItem> {
        self.online()?;
        self.writes.set(self.writes.get() + 1);
        let mut all = self.inventory.borrow_mut();
        let it = all
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("/api/fishinventory/{}", id)))?;
        it.stock = stock;
        Ok(it.clone())
    }

    fn assignments(&self) -> ApiResult<Vec<TankAssignment>> {
        self.online()?;
        Ok(self.assignments.borrow().clone())
    }

    fn submit_feedback(&self, feedback: &Feedback) -> ApiResult<()> {
        self.online()?;
        self.feedback.borrow_mut().push(feedback.clone());
        Ok(())
    }

    fn subscribe(&self) -> ApiResult<Box<dyn Read>> {
        match self.streams.borrow_mut().pop_front() {
            Some(Ok(body)) => Ok(Box::new(Cursor::new(body.into_bytes()))),
            Some(Err(e)) => Err(e),
            None => Err(ApiError::StreamClosed),
        }
    }
}

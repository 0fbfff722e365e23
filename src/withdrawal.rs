// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Owner withdrawals: a `DR` transaction checked against the available balance.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::api::FinanceBackend;
use crate::error::{ApiResult, ValidationError};
use crate::models::{FinanceOverview, Transaction, TransactionDraft, TxType};

pub const WITHDRAWAL_NAME: &str = "Owner Withdrawal";

pub fn validate_withdrawal(amount: Decimal, available: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    if amount > available {
        return Err(ValidationError::InsufficientBalance {
            requested: amount,
            available,
        });
    }
    Ok(())
}

pub fn withdrawal_draft(amount: Decimal, note: Option<&str>, date: NaiveDate) -> TransactionDraft {
    TransactionDraft {
        name: WITHDRAWAL_NAME.to_string(),
        description: note.unwrap_or("Owner withdrawal").to_string(),
        amount,
        tx_type: TxType::Debit,
        date,
    }
}

#[derive(Debug)]
pub struct WithdrawalReceipt {
    pub transaction: Transaction,
    pub before: FinanceOverview,
    /// `None` if the post-write refresh failed; the withdrawal itself went through.
    pub after: Option<FinanceOverview>,
}

/// Submits withdrawals one at a time. A second submit while one is outstanding is
/// rejected rather than queued.
#[derive(Debug, Default)]
pub struct Withdrawals {
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Withdrawals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> Result<InFlight<'_>, ValidationError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| ValidationError::RequestInFlight)
    }

    /// Validates against a freshly fetched balance, records the debit, then
    /// re-fetches the overview. Nothing is written when validation fails.
    pub fn submit(
        &self,
        backend: &dyn FinanceBackend,
        amount: Decimal,
        note: Option<&str>,
        today: NaiveDate,
    ) -> ApiResult<WithdrawalReceipt> {
        let _guard = self.acquire()?;
        let before = backend.overview()?;
        validate_withdrawal(amount, before.available_balance)?;
        let transaction = backend.create_transaction(&withdrawal_draft(amount, note, today))?;
        info!(amount = %amount, id = %transaction.id, "withdrawal recorded");
        let after = backend.overview().ok();
        Ok(WithdrawalReceipt {
            transaction,
            before,
            after,
        })
    }
}

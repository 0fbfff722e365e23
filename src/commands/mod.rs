// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;

use crate::api::FinanceBackend;
use crate::config::Config;
use crate::error::ValidationError;
use crate::session::{Role, Session};

pub mod config;
pub mod exporter;
pub mod feedback;
pub mod finance;
pub mod inventory;
pub mod payroll;
pub mod salaries;
pub mod session;
pub mod transactions;

/// What every command handler gets to work with.
pub struct Ctx<'a> {
    pub conn: &'a Connection,
    pub config: &'a Config,
    pub session: &'a Session,
    pub backend: &'a dyn FinanceBackend,
    pub now: DateTime<Utc>,
}

impl Ctx<'_> {
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Refuses ledger writes locally for roles the backend would reject anyway.
    pub fn require_ledger_writer(&self) -> Result<(), ValidationError> {
        if self.session.role.can_write_ledger() {
            Ok(())
        } else {
            Err(ValidationError::RoleRequired(Role::Staff))
        }
    }

    pub fn require_owner(&self) -> Result<(), ValidationError> {
        if self.session.role == Role::Owner {
            Ok(())
        } else {
            Err(ValidationError::RoleRequired(Role::Owner))
        }
    }
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The signed-in identity, passed explicitly to whatever needs it.

use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Staff,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::User => "user",
        }
    }

    /// Roles allowed to record ledger transactions.
    pub fn can_write_ledger(&self) -> bool {
        matches!(self, Role::Owner | Role::Staff)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "user" | "buyer" => Ok(Role::User),
            other => Err(anyhow!("Unknown role '{}' (owner|admin|staff|user)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: String,
    pub role: Role,
    pub token: Option<String>,
}

impl Session {
    pub fn new(user: impl Into<String>, role: Role, token: Option<String>) -> Self {
        Session {
            user: user.into(),
            role,
            token,
        }
    }

    /// Used when nobody has signed in: read-only, no token.
    pub fn anonymous() -> Self {
        Session::new("anonymous", Role::User, None)
    }
}

/// The one place a session is persisted or restored.
pub trait SessionStore {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

pub struct SqliteSessionStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteSessionStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteSessionStore { conn }
    }
}

impl SessionStore for SqliteSessionStore<'_> {
    fn load(&self) -> Result<Option<Session>> {
        let row: Option<(String, String, Option<String>)> = self
            .conn
            .query_row("SELECT user, role, token FROM session WHERE id=1", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .optional()?;
        match row {
            Some((user, role, token)) => Ok(Some(Session {
                user,
                role: role.parse()?,
                token,
            })),
            None => Ok(None),
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO session(id, user, role, token, updated_at) VALUES (1, ?1, ?2, ?3, datetime('now'))
             ON CONFLICT(id) DO UPDATE SET user=excluded.user, role=excluded.role,
                token=excluded.token, updated_at=excluded.updated_at",
            params![session.user, session.role.as_str(), session.token],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM session", [])?;
        Ok(())
    }
}

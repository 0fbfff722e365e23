// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use std::env;
use std::time::Duration;
use tracing::debug;

use crate::db::get_setting;
use crate::events::Backoff;

/// Settings keys that `aqualink config set` accepts, with their env override.
pub const KEYS: &[(&str, &str)] = &[
    ("api_url", "AQUALINK_API_URL"),
    ("currency", "AQUALINK_CURRENCY"),
    ("timeout_secs", "AQUALINK_TIMEOUT_SECS"),
    ("recent_limit", "AQUALINK_RECENT_LIMIT"),
    ("earnings_months", "AQUALINK_EARNINGS_MONTHS"),
];

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub currency: String,
    pub timeout: Duration,
    /// Rows kept in the recent-activity section of exports.
    pub recent_limit: usize,
    pub earnings_months: usize,
    pub reconnect: Backoff,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: "http://localhost:5000".to_string(),
            currency: "LKR".to_string(),
            timeout: Duration::from_secs(15),
            recent_limit: 10,
            earnings_months: 4,
            reconnect: Backoff::default(),
        }
    }
}

pub fn is_known_key(key: &str) -> bool {
    KEYS.iter().any(|(k, _)| *k == key)
}

impl Config {
    /// Defaults, then the settings table, then the environment (`.env` included).
    pub fn load(conn: &Connection) -> Result<Config> {
        dotenvy::dotenv().ok();
        let mut cfg = Config::default();
        for (key, var) in KEYS {
            let stored = get_setting(conn, key)?;
            let from_env = env::var(var).ok().filter(|v| !v.trim().is_empty());
            if let Some(v) = from_env.or(stored) {
                debug!(key = %key, value = %v, "config override");
                cfg.apply(key, &v)?;
            }
        }
        Ok(cfg)
    }

    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "api_url" => self.api_url = value.trim_end_matches('/').to_string(),
            "currency" => self.currency = value.to_uppercase(),
            "timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs '{}'", value))?;
                self.timeout = Duration::from_secs(secs);
            }
            "recent_limit" => {
                self.recent_limit = value
                    .parse()
                    .with_context(|| format!("Invalid recent_limit '{}'", value))?
            }
            "earnings_months" => {
                let n: usize = value
                    .parse()
                    .with_context(|| format!("Invalid earnings_months '{}'", value))?;
                if n == 0 {
                    return Err(anyhow!("earnings_months must be at least 1"));
                }
                self.earnings_months = n;
            }
            other => return Err(anyhow!("Unknown config key '{}'", other)),
        }
        Ok(())
    }

    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_url", self.api_url.clone()),
            ("currency", self.currency.clone()),
            ("timeout_secs", self.timeout.as_secs().to_string()),
            ("recent_limit", self.recent_limit.to_string()),
            ("earnings_months", self.earnings_months.to_string()),
        ]
    }
}

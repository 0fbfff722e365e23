// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use rusqlite::Connection;

use crate::config::{Config, is_known_key};
use crate::db::{set_setting, unset_setting};
use crate::utils::pretty_table;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap().trim();
            // validate before storing
            Config::default().apply(key, value)?;
            set_setting(conn, key, value)?;
            println!("Set {} = {}", key, value);
        }
        Some(("unset", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            if !is_known_key(key) {
                return Err(anyhow!("Unknown config key '{}'", key));
            }
            unset_setting(conn, key)?;
            println!("Unset {}", key);
        }
        Some(("show", _)) => {
            let cfg = Config::load(conn)?;
            let rows = cfg
                .entries()
                .into_iter()
                .map(|(k, v)| vec![k.to_string(), v])
                .collect();
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing_subscriber::EnvFilter;

use aqualink::api::ApiClient;
use aqualink::commands::{self, Ctx};
use aqualink::config::Config;
use aqualink::session::{Session, SessionStore, SqliteSessionStore};
use aqualink::{cli, db};

fn init_logging() {
    let filter = EnvFilter::try_from_env("AQUALINK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;
    let store = SqliteSessionStore::new(&conn);

    // Commands that never talk to the backend.
    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
            return Ok(());
        }
        Some(("payroll", sub)) => return commands::payroll::handle(sub),
        Some(("session", sub)) => return commands::session::handle(&store, sub),
        Some(("config", sub)) => return commands::config::handle(&conn, sub),
        _ => {}
    }

    let config = Config::load(&conn)?;
    let session = store.load()?.unwrap_or_else(Session::anonymous);
    let client = ApiClient::new(&config.api_url, session.clone(), config.timeout)
        .context("Build HTTP client")?;
    let ctx = Ctx {
        conn: &conn,
        config: &config,
        session: &session,
        backend: &client,
        now: Utc::now(),
    };

    match matches.subcommand() {
        Some(("salary", sub)) => commands::salaries::handle(&ctx, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&ctx, sub)?,
        Some(("finance", sub)) => commands::finance::handle(&ctx, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&ctx, sub)?,
        Some(("inventory", sub)) => commands::inventory::handle(&ctx, sub)?,
        Some(("feedback", sub)) => commands::feedback::handle(&ctx, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

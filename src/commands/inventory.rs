// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::warn;

use super::Ctx;
use crate::events::{Poller, StopHandle};
use crate::inventory::{assign_to_tank, low_stock};
use crate::models::InventoryItem;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(ctx: &Ctx<'_>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("assign", sub)) => {
            let item = sub.get_one::<String>("item").unwrap().trim();
            let qty = *sub.get_one::<i64>("qty").unwrap();
            let tank = sub.get_one::<String>("tank").unwrap().trim();
            let updated = assign_to_tank(ctx.backend, item, tank, qty)
                .with_context(|| format!("Assign {} of {} to {}", qty, item, tank))?;
            println!(
                "Assigned {} x {} to tank {}; {} left in stock",
                qty, updated.name, tank, updated.stock
            );
        }
        Some(("watch", sub)) => {
            let secs = *sub.get_one::<u64>("interval").unwrap_or(&30);
            let poller = Poller::new(Duration::from_secs(secs), StopHandle::new());
            poller.run(|| match ctx.backend.inventory() {
                Ok(items) => println!("{}", stock_table(&items)),
                Err(e) => warn!(error = %e, "stock poll failed"),
            });
        }
        _ => {}
    }
    Ok(())
}

fn stock_table(items: &[InventoryItem]) -> comfy_table::Table {
    let rows = items
        .iter()
        .map(|i| {
            vec![
                i.id.clone(),
                i.code.clone(),
                i.name.clone(),
                i.category.clone(),
                i.stock.to_string(),
            ]
        })
        .collect();
    pretty_table(&["ID", "Code", "Name", "Category", "Stock"], rows)
}

fn list(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let items = ctx.backend.inventory().context("Fetch inventory")?;
    let items: Vec<InventoryItem> = match sub.get_one::<i64>("low") {
        Some(t) => low_stock(&items, *t).into_iter().cloned().collect(),
        None => items,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        println!("{}", stock_table(&items));
    }
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};

use super::Ctx;
use crate::models::{Transaction, TransactionDraft, TxType};
use crate::utils::{maybe_print_json, month_key, parse_date, parse_decimal, pretty_table};
use crate::validate;

pub fn handle(ctx: &Ctx<'_>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("edit", sub)) => edit(ctx, sub)?,
        Some(("rm", sub)) => {
            ctx.require_ledger_writer()?;
            let id = sub.get_one::<String>("id").unwrap().trim();
            ctx.backend
                .delete_transaction(id)
                .with_context(|| format!("Delete transaction {}", id))?;
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn parse_type(s: &str) -> Result<TxType> {
    TxType::parse(s).ok_or_else(|| anyhow!("Invalid type '{}', expected CR or DR", s))
}

pub fn draft_from_args(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<TransactionDraft> {
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => ctx.today(),
    };
    let draft = TransactionDraft {
        name: sub.get_one::<String>("name").unwrap().trim().to_string(),
        description: sub
            .get_one::<String>("description")
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        tx_type: parse_type(sub.get_one::<String>("type").unwrap())?,
        date,
    };
    validate::transaction_draft(&draft)?;
    Ok(draft)
}

fn add(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<()> {
    ctx.require_ledger_writer()?;
    let draft = draft_from_args(ctx, sub)?;
    let tx = ctx
        .backend
        .create_transaction(&draft)
        .context("Record transaction")?;
    println!(
        "Recorded {} {} '{}' on {} (id {})",
        tx.tx_type, tx.amount, tx.name, tx.date, tx.id
    );
    Ok(())
}

/// Fields not given on the command line keep their current values.
fn edit(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<()> {
    ctx.require_ledger_writer()?;
    let id = sub.get_one::<String>("id").unwrap().trim();
    let current = ctx
        .backend
        .transactions()
        .context("Fetch transactions")?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow!("Transaction '{}' not found", id))?;
    let draft = TransactionDraft {
        name: sub
            .get_one::<String>("name")
            .map(|s| s.trim().to_string())
            .unwrap_or(current.name),
        description: sub
            .get_one::<String>("description")
            .map(|s| s.trim().to_string())
            .unwrap_or(current.description),
        amount: match sub.get_one::<String>("amount") {
            Some(a) => parse_decimal(a)?,
            None => current.amount,
        },
        tx_type: match sub.get_one::<String>("type") {
            Some(t) => parse_type(t)?,
            None => current.tx_type,
        },
        date: match sub.get_one::<String>("date") {
            Some(d) => parse_date(d)?,
            None => current.date,
        },
    };
    validate::transaction_draft(&draft)?;
    let tx = ctx
        .backend
        .update_transaction(id, &draft)
        .with_context(|| format!("Update transaction {}", id))?;
    println!("Updated transaction {} ({} {})", tx.id, tx.tx_type, tx.amount);
    Ok(())
}

/// Newest first, filtered by the optional `--type`, `--month` and `--limit`.
pub fn query_rows(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let only_type = sub
        .get_one::<String>("type")
        .map(|s| parse_type(s))
        .transpose()?;
    let month = sub.get_one::<String>("month").map(|s| s.trim().to_string());
    let mut data: Vec<Transaction> = ctx
        .backend
        .transactions()
        .context("Fetch transactions")?
        .into_iter()
        .filter(|t| only_type.is_none_or(|ty| t.tx_type == ty))
        .filter(|t| month.as_deref().is_none_or(|m| month_key(t.date) == m))
        .collect();
    data.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}

fn list(ctx: &Ctx<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(ctx, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.clone(),
                    t.date.to_string(),
                    t.tx_type.to_string(),
                    t.name.clone(),
                    format!("{:.2}", t.amount),
                    t.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Type", "Name", "Amount", "Description"], rows)
        );
    }
    Ok(())
}

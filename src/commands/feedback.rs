// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use super::Ctx;
use crate::validate;

pub fn handle(ctx: &Ctx<'_>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("submit", sub)) => {
            let message = sub.get_one::<String>("message").unwrap();
            let rating = *sub.get_one::<u8>("rating").unwrap();
            let feedback = validate::feedback(message, rating)?;
            ctx.backend
                .submit_feedback(&feedback)
                .context("Submit feedback")?;
            println!("Thanks! Feedback submitted ({}/5)", feedback.rating);
        }
        _ => {}
    }
    Ok(())
}

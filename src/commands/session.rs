// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::session::{Role, Session, SessionStore};
use crate::utils::pretty_table;

pub fn handle(store: &dyn SessionStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("login", sub)) => {
            let user = sub.get_one::<String>("user").unwrap().trim();
            let role: Role = sub.get_one::<String>("role").unwrap().parse()?;
            let token = sub
                .get_one::<String>("token")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            store.save(&Session::new(user, role, token))?;
            println!("Signed in as {} ({})", user, role);
        }
        Some(("show", _)) => match store.load()? {
            Some(s) => println!(
                "{}",
                pretty_table(
                    &["User", "Role", "Token"],
                    vec![vec![
                        s.user,
                        s.role.to_string(),
                        if s.token.is_some() { "set" } else { "none" }.to_string(),
                    ]],
                )
            ),
            None => println!("Not signed in"),
        },
        Some(("logout", _)) => {
            store.clear()?;
            println!("Signed out");
        }
        _ => {}
    }
    Ok(())
}

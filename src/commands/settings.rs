// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, Settings};
use crate::utils::{pretty_table, required};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-currency", sub)) => {
            config::set_default_currency(conn, required(sub, "currency")?)?;
            println!("Default currency set to {}", config::get_default_currency(conn)?);
        }
        Some(("set-user", sub)) => {
            let id = *sub
                .get_one::<i64>("id")
                .ok_or_else(|| anyhow!("Missing user id"))?;
            config::set_user_id(conn, id)?;
            println!("Default user set to {}", id);
        }
        _ => {
            let rows = vec![
                vec!["user_id".into(), settings.user_id.to_string()],
                vec!["stored user_id".into(), config::get_user_id(conn)?.to_string()],
                vec!["default_currency".into(), settings.default_currency.clone()],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
    }
    Ok(())
}

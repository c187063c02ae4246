// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;

use ledgerline::{cli, commands, config::Settings, db, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    logging::init(matches.get_flag("verbose"));

    let db_file = match matches.get_one::<String>("db") {
        Some(p) => PathBuf::from(p),
        None => db::db_path()?,
    };
    let mut conn = db::open_at(&db_file)?;
    let settings = Settings::load(&conn, matches.get_one::<i64>("user").copied())?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db_file.display());
        }
        Some(("account", sub)) => commands::accounts::handle(&conn, &settings, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, &settings, sub)?,
        Some(("summary", sub)) => commands::summary::handle(&conn, &settings, sub)?,
        Some(("interest", sub)) => commands::interest::handle(&mut conn, &settings, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&mut conn, &settings, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, &settings, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

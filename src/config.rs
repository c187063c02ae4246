// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistent settings and the per-invocation view of them.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

pub const USER_ENV: &str = "LEDGERLINE_USER";

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_USER: i64 = 1;

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_default_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "default_currency")?.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

pub fn set_default_currency(conn: &Connection, ccy: &str) -> Result<()> {
    let ccy = normalize_currency(ccy)?;
    set_setting(conn, "default_currency", &ccy)
}

pub fn get_user_id(conn: &Connection) -> Result<i64> {
    match get_setting(conn, "user_id")? {
        Some(v) => v
            .parse::<i64>()
            .with_context(|| format!("Invalid stored user_id '{}'", v)),
        None => Ok(DEFAULT_USER),
    }
}

pub fn set_user_id(conn: &Connection, user_id: i64) -> Result<()> {
    set_setting(conn, "user_id", &user_id.to_string())
}

pub fn normalize_currency(ccy: &str) -> Result<String> {
    let c = ccy.trim().to_uppercase();
    if c.len() != 3 || !c.chars().all(|ch| ch.is_ascii_alphabetic()) {
        anyhow::bail!("Invalid currency code '{}', expected three letters", ccy.trim());
    }
    Ok(c)
}

/// Settings in effect for one command invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub user_id: i64,
    pub default_currency: String,
}

impl Settings {
    /// Stored settings, overridden by `--user` and then `LEDGERLINE_USER`.
    pub fn load(conn: &Connection, user_flag: Option<i64>) -> Result<Self> {
        let user_id = match user_flag {
            Some(u) => u,
            None => match std::env::var(USER_ENV).ok().filter(|v| !v.trim().is_empty()) {
                Some(v) => v
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("Invalid {} '{}'", USER_ENV, v))?,
                None => get_user_id(conn)?,
            },
        };
        Ok(Settings {
            user_id,
            default_currency: get_default_currency(conn)?,
        })
    }
}

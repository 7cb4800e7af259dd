use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;

use crate::staleness::{Ledger, StalenessRecord};

pub fn player_ledger(conn: &Connection) -> Result<Ledger> {
    let sql = "SELECT id, last_scraped FROM players";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            let id: String = row.get(0)?;
            let last_scraped: DateTime<Utc> = row.get(1)?;
            Ok((
                id,
                StalenessRecord {
                    last_scraped,
                    date_to: None,
                },
            ))
        })?
        .collect::<rusqlite::Result<Ledger>>()
        .context("Failed to load player scrape times")?;

    Ok(rows)
}

pub fn tournament_ledger(conn: &Connection) -> Result<Ledger> {
    let sql = "SELECT id, last_scraped, date_to FROM tournaments";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            let id: String = row.get(0)?;
            let last_scraped: DateTime<Utc> = row.get(1)?;
            let date_to: NaiveDate = row.get(2)?;
            Ok((
                id,
                StalenessRecord {
                    last_scraped,
                    date_to: Some(date_to),
                },
            ))
        })?
        .collect::<rusqlite::Result<Ledger>>()
        .context("Failed to load tournament scrape times")?;

    Ok(rows)
}

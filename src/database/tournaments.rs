use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::journal::{execute, query_value, Journal};
use super::models::{StoredMatch, StoredTournament};
use crate::domain::{Match, TournamentListing, TournamentType};
use crate::errors::store_context;

pub fn insert_tournament_type(conn: &Connection, journal: &Journal, kind: TournamentType) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO tournament_types (name) VALUES (?1)";
    execute(conn, journal, sql, params![kind.as_str()])
        .with_context(|| store_context("insert tournament type", kind.as_str()))?;
    Ok(())
}

pub fn insert_referee(conn: &Connection, journal: &Journal, name: &str) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO referees (name) VALUES (?1)";
    execute(conn, journal, sql, params![name]).with_context(|| store_context("insert referee", name))?;
    Ok(())
}

pub fn upsert_tournament(
    conn: &Connection,
    journal: &Journal,
    listing: &TournamentListing,
    now: DateTime<Utc>,
) -> Result<()> {
    let sql = "INSERT INTO tournaments (id, page_url, name, year, place, date_from, date_to, category, type, \
               poster_url, last_scraped) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
               ON CONFLICT (id) DO UPDATE SET \
               page_url = excluded.page_url, name = excluded.name, year = excluded.year, \
               place = excluded.place, date_from = excluded.date_from, date_to = excluded.date_to, \
               category = excluded.category, type = excluded.type, poster_url = excluded.poster_url, \
               last_scraped = excluded.last_scraped";

    execute(
        conn,
        journal,
        sql,
        params![
            listing.id,
            listing.page_url,
            listing.name,
            listing.year,
            listing.place,
            listing.date_from,
            listing.date_to,
            listing.category.as_str(),
            listing.kind.as_str(),
            listing.poster_url,
            now,
        ],
    )
    .with_context(|| store_context("upsert tournament", &listing.id))?;

    Ok(())
}

pub fn insert_tournament_images(conn: &Connection, journal: &Journal, listing: &TournamentListing) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO tournament_images (tournament, image_url) VALUES (?1, ?2)";

    for url in &listing.images {
        execute(conn, journal, sql, params![listing.id, url])
            .with_context(|| store_context("insert tournament image", &listing.id))?;
    }
    Ok(())
}

pub fn link_referee(conn: &Connection, journal: &Journal, tournament_id: &str, referee: &str) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO tournament_referees (tournament, referee) VALUES (?1, ?2)";
    execute(conn, journal, sql, params![tournament_id, referee])
        .with_context(|| store_context("link referee", tournament_id))?;
    Ok(())
}

pub fn add_tournament_team(conn: &Connection, journal: &Journal, tournament_id: &str, team_id: i64) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO tournament_teams (tournament, team) VALUES (?1, ?2)";
    execute(conn, journal, sql, params![tournament_id, team_id])
        .with_context(|| store_context("add tournament team", tournament_id))?;
    Ok(())
}

/// Store a match under its (tournament, phase, round, category, sequence)
/// key, returning the row id
pub fn upsert_match(
    conn: &Connection,
    journal: &Journal,
    tournament_id: &str,
    game: &Match,
    first_team: i64,
    second_team: i64,
) -> Result<i64> {
    let sql = "INSERT INTO matches (tournament, phase, round, category, sequence, first_team, second_team) \
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
               ON CONFLICT (tournament, phase, round, category, sequence) DO UPDATE SET \
               first_team = excluded.first_team, second_team = excluded.second_team \
               RETURNING id";

    query_value(
        conn,
        journal,
        sql,
        params![
            tournament_id,
            game.phase.as_str(),
            game.round.label(),
            game.category.as_str(),
            game.sequence,
            first_team,
            second_team,
        ],
    )
    .with_context(|| store_context("upsert match", tournament_id))
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<StoredTournament>> {
    let sql = "SELECT id, name, year, date_from, date_to, category, type, last_scraped FROM tournaments WHERE id = ?1";

    conn.query_row(sql, params![id], parse_tournament_row)
        .optional()
        .context("Failed to query tournament by id")
}

pub fn list_matches(conn: &Connection, tournament_id: &str) -> Result<Vec<StoredMatch>> {
    let sql = "SELECT id, tournament, phase, round, category, sequence, first_team, second_team \
               FROM matches WHERE tournament = ?1 ORDER BY phase, round, category, sequence";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn count(conn: &Connection, table: Table) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.name());
    conn.query_row(&sql, [], |row| row.get(0))
        .with_context(|| format!("Failed to count {}", table.name()))
}

/// Tables whose size is reported after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Tournaments,
    Matches,
    SetResults,
    Teams,
}

impl Table {
    fn name(&self) -> &'static str {
        match self {
            Table::Tournaments => "tournaments",
            Table::Matches => "matches",
            Table::SetResults => "set_results",
            Table::Teams => "teams",
        }
    }
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<StoredTournament> {
    Ok(StoredTournament {
        id: row.get(0)?,
        name: row.get(1)?,
        year: row.get(2)?,
        date_from: row.get(3)?,
        date_to: row.get(4)?,
        category: row.get(5)?,
        kind: row.get(6)?,
        last_scraped: row.get(7)?,
    })
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<StoredMatch> {
    Ok(StoredMatch {
        id: row.get(0)?,
        tournament: row.get(1)?,
        phase: row.get(2)?,
        round: row.get(3)?,
        category: row.get(4)?,
        sequence: row.get(5)?,
        first_team: row.get(6)?,
        second_team: row.get(7)?,
    })
}

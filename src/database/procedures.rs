use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};

use super::journal::{execute, query_value, Journal};
use crate::domain::SetResult;
use crate::errors::store_context;

/// Resolve the team formed by two players, creating it on first sight.
/// Order of the players does not matter.
pub fn create_team(conn: &Connection, journal: &Journal, player_a: &str, player_b: &str) -> Result<i64> {
    if player_a == player_b {
        bail!("A team needs two different players, got {} twice", player_a);
    }
    let (first, second) = if player_a < player_b {
        (player_a, player_b)
    } else {
        (player_b, player_a)
    };
    let pair = format!("{}/{}", first, second);

    let sql = "INSERT OR IGNORE INTO teams (first_player, second_player) VALUES (?1, ?2)";
    execute(conn, journal, sql, params![first, second]).with_context(|| store_context("create team", &pair))?;

    let sql = "SELECT id FROM teams WHERE first_player = ?1 AND second_player = ?2";
    let team_id: i64 =
        query_value(conn, journal, sql, params![first, second]).with_context(|| store_context("find team", &pair))?;

    let sql = "INSERT OR IGNORE INTO player_teams (player, team) VALUES (?1, ?2)";
    for player in [first, second] {
        execute(conn, journal, sql, params![player, team_id])
            .with_context(|| store_context("link player to team", &pair))?;
    }

    Ok(team_id)
}

/// Record one set of a match; `set_number` counts from 1
pub fn add_set_result(
    conn: &Connection,
    journal: &Journal,
    match_id: i64,
    set_number: usize,
    set: &SetResult,
) -> Result<()> {
    let sql = "INSERT INTO set_results (match_id, set_number, first_team_score, second_team_score, tie_break) \
               VALUES (?1, ?2, ?3, ?4, ?5) \
               ON CONFLICT (match_id, set_number) DO UPDATE SET \
               first_team_score = excluded.first_team_score, \
               second_team_score = excluded.second_team_score, tie_break = excluded.tie_break";

    execute(
        conn,
        journal,
        sql,
        params![match_id, set_number as i64, set.first, set.second, set.tie_break],
    )
    .with_context(|| store_context("add set result", &match_id.to_string()))?;

    Ok(())
}

/// Drop stored sets numbered above `set_count`, left over from an earlier
/// scrape of the same match key
pub fn trim_set_results(conn: &Connection, journal: &Journal, match_id: i64, set_count: usize) -> Result<usize> {
    let sql = "DELETE FROM set_results WHERE match_id = ?1 AND set_number > ?2";
    execute(conn, journal, sql, params![match_id, set_count as i64])
        .with_context(|| store_context("trim set results", &match_id.to_string()))
}

/// Recompute each team's first and last tournament from the matches it played
/// and the draws it registered for
pub fn update_team_first_last_tournament(conn: &Connection, journal: &Journal) -> Result<usize> {
    let sql = "WITH appearances AS ( \
                   SELECT first_team AS team, tournament FROM matches \
                   UNION SELECT second_team, tournament FROM matches \
                   UNION SELECT team, tournament FROM tournament_teams \
               ), dated AS ( \
                   SELECT a.team, t.id, t.date_from, t.date_to \
                   FROM appearances a JOIN tournaments t ON t.id = a.tournament \
               ) \
               UPDATE teams SET \
               first_tournament = (SELECT id FROM dated WHERE dated.team = teams.id \
                                   ORDER BY date_from ASC, id ASC LIMIT 1), \
               last_tournament = (SELECT id FROM dated WHERE dated.team = teams.id \
                                  ORDER BY date_to DESC, id DESC LIMIT 1) \
               WHERE id IN (SELECT team FROM appearances)";

    execute(conn, journal, sql, params![]).context("Failed to update team tenure")
}

/// Point every player at the team whose last tournament ended most recently
pub fn update_current_team(conn: &Connection, journal: &Journal) -> Result<usize> {
    let sql = "UPDATE players SET current_team = ( \
                   SELECT pt.team FROM player_teams pt \
                   JOIN teams tm ON tm.id = pt.team \
                   JOIN tournaments t ON t.id = tm.last_tournament \
                   WHERE pt.player = players.id \
                   ORDER BY t.date_to DESC, pt.team DESC LIMIT 1) \
               WHERE EXISTS (SELECT 1 FROM player_teams pt WHERE pt.player = players.id)";

    execute(conn, journal, sql, params![]).context("Failed to update current teams")
}

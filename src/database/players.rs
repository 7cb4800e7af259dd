use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::journal::{execute, Journal};
use super::models::StoredPlayer;
use crate::config::countries::{country_name, flag_url};
use crate::domain::{Player, PlayerCategory, PlayerStats, RaceStats};
use crate::errors::store_context;

/// Countries are looked up by code; unknown codes are skipped and the player
/// is stored without a country.
pub fn insert_country(conn: &Connection, journal: &Journal, code: &str) -> Result<bool> {
    let Some(name) = country_name(code) else {
        log::warn!("Data quality: unknown country code {:?}", code);
        return Ok(false);
    };

    let sql = "INSERT OR IGNORE INTO countries (country_code, name, image_url) VALUES (?1, ?2, ?3)";
    execute(conn, journal, sql, params![code, name, flag_url(code)])
        .with_context(|| store_context("insert country", code))?;
    Ok(true)
}

pub fn upsert_player(conn: &Connection, journal: &Journal, player: &Player, now: DateTime<Utc>) -> Result<()> {
    let country = player
        .country
        .as_deref()
        .filter(|code| country_name(code).is_some());

    let sql = "INSERT INTO players (id, first_name, middle_name, last_name, points, rank, profile_image_url, \
               country, birthplace, birthdate, height, hometown, consecutive_wins, total_matches_played, \
               total_matches_won, preferred_court_position, category, current_partner, last_scraped) \
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19) \
               ON CONFLICT (id) DO UPDATE SET \
               first_name = excluded.first_name, middle_name = excluded.middle_name, \
               last_name = excluded.last_name, points = excluded.points, rank = excluded.rank, \
               profile_image_url = excluded.profile_image_url, country = excluded.country, \
               birthplace = excluded.birthplace, birthdate = excluded.birthdate, height = excluded.height, \
               hometown = excluded.hometown, consecutive_wins = excluded.consecutive_wins, \
               total_matches_played = excluded.total_matches_played, \
               total_matches_won = excluded.total_matches_won, \
               preferred_court_position = excluded.preferred_court_position, \
               category = excluded.category, current_partner = excluded.current_partner, \
               last_scraped = excluded.last_scraped";

    execute(
        conn,
        journal,
        sql,
        params![
            player.id,
            player.first_name,
            player.middle_name,
            player.last_name,
            player.score,
            player.ranking,
            player.profile_image_url,
            country,
            player.birthplace,
            player.birthdate,
            player.height,
            player.hometown,
            player.consecutive_wins,
            player.total_matches_played,
            player.total_matches_won,
            player.court_position.map(|p| p.as_str()),
            player.category.map(|c| c.as_str()),
            player.current_partner,
            now,
        ],
    )
    .with_context(|| store_context("upsert player", &player.id))?;

    Ok(())
}

pub fn insert_player_images(conn: &Connection, journal: &Journal, player: &Player) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO player_images (player, image_url) VALUES (?1, ?2)";

    for url in &player.image_urls {
        execute(conn, journal, sql, params![player.id, url])
            .with_context(|| store_context("insert player image", &player.id))?;
    }
    Ok(())
}

/// Stats of past years do not change, so a stored year is kept as is
pub fn insert_yearly_stats(conn: &Connection, journal: &Journal, player_id: &str, stats: &PlayerStats) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO player_yearly_stats (player, year, matches_played, matches_won, \
               tournament_wins, tournament_finals, tournament_semis, tournament_quarters, \
               tournament_round_of_eight, tournament_round_of_sixteen) \
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

    let positions = &stats.positions;
    execute(
        conn,
        journal,
        sql,
        params![
            player_id,
            stats.year,
            stats.matches_played,
            stats.matches_won,
            positions.winner,
            positions.finals,
            positions.semis,
            positions.quarters,
            positions.round_of_eight,
            positions.round_of_sixteen,
        ],
    )
    .with_context(|| store_context("insert yearly stats", player_id))?;

    Ok(())
}

/// The race standing belongs to the year of the run; the first standing
/// stored for a year is kept
pub fn insert_race_stats(
    conn: &Connection,
    journal: &Journal,
    player_id: &str,
    race: &RaceStats,
    now: DateTime<Utc>,
) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO player_race_stats (player, year, points, rank) VALUES (?1, ?2, ?3, ?4)";

    execute(conn, journal, sql, params![player_id, now.year(), race.points, race.ranking])
        .with_context(|| store_context("insert race stats", player_id))?;
    Ok(())
}

/// Category of the matches a player took part in, for players missing from
/// the ranking listing
pub fn infer_category_from_matches(conn: &Connection, player_id: &str) -> Result<Option<PlayerCategory>> {
    let sql = "SELECT m.category FROM matches m \
               JOIN player_teams pt ON pt.team IN (m.first_team, m.second_team) \
               WHERE pt.player = ?1 \
               GROUP BY m.category ORDER BY COUNT(*) DESC LIMIT 1";

    let category: Option<String> = conn
        .query_row(sql, params![player_id], |row| row.get(0))
        .optional()
        .with_context(|| store_context("infer category", player_id))?;

    Ok(category.as_deref().and_then(PlayerCategory::parse))
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<StoredPlayer>> {
    let sql = "SELECT id, first_name, last_name, points, rank, country, category, current_team, last_scraped \
               FROM players WHERE id = ?1";

    conn.query_row(sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
        .context("Failed to count players")
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<StoredPlayer> {
    Ok(StoredPlayer {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        points: row.get(3)?,
        rank: row.get(4)?,
        country: row.get(5)?,
        category: row.get(6)?,
        current_team: row.get(7)?,
        last_scraped: row.get(8)?,
    })
}

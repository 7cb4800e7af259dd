use chrono::{DateTime, NaiveDate, Utc};

/// Player row as stored, read back for staleness checks and reporting
#[derive(Debug, Clone)]
pub struct StoredPlayer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub points: Option<u32>,
    pub rank: Option<u32>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub current_team: Option<i64>,
    pub last_scraped: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredTournament {
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub category: String,
    pub kind: String,
    pub last_scraped: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredTeam {
    pub id: i64,
    pub first_player: String,
    pub second_player: String,
    pub first_tournament: Option<String>,
    pub last_tournament: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredMatch {
    pub id: i64,
    pub tournament: String,
    pub phase: String,
    pub round: String,
    pub category: String,
    pub sequence: u32,
    pub first_team: i64,
    pub second_team: i64,
}

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use rusqlite::{Connection, Transaction};

use super::lookups::LookupRows;
use crate::database::{in_transaction, players, procedures, tournaments, Journal};
use crate::domain::{Match, Player, RunSummary, Tally, Tournament};

/// Writes assembled aggregates to the store.
///
/// Each aggregate is committed in its own transaction, and each match in one
/// more, so a failure costs only the entity it belongs to.
pub struct Reconciler<'a> {
    conn: &'a mut Connection,
    now: DateTime<Utc>,
}

impl<'a> Reconciler<'a> {
    pub fn new(conn: &'a mut Connection, now: DateTime<Utc>) -> Self {
        Self { conn, now }
    }

    /// Tournaments first so that teams and matches exist when players are
    /// stored, then the team maintenance pass
    pub fn commit_run(
        &mut self,
        tournaments: &[Tournament],
        players: &[Player],
        tournament_journal: &Journal,
        player_journal: &Journal,
    ) -> Result<RunSummary> {
        let (tournament_tally, match_tally) = self.commit_tournaments(tournaments, tournament_journal)?;
        let player_tally = self.commit_players(players, player_journal)?;
        self.refresh_teams(tournament_journal)?;

        Ok(RunSummary {
            players: player_tally,
            tournaments: tournament_tally,
            matches: match_tally,
        })
    }

    pub fn commit_tournaments(&mut self, tournaments: &[Tournament], journal: &Journal) -> Result<(Tally, Tally)> {
        let lookups = LookupRows::from_tournaments(tournaments);
        in_transaction(self.conn, journal, |tx| insert_tournament_lookups(tx, journal, &lookups))?;

        let mut tournament_tally = Tally::default();
        let mut match_tally = Tally::default();
        let now = self.now;

        for tournament in tournaments {
            let committed = in_transaction(self.conn, journal, |tx| {
                commit_tournament_graph(tx, journal, tournament, now)
            });
            if let Err(e) = committed {
                error!("Failed to commit tournament {}: {:#}", tournament.id(), e);
                tournament_tally.failed += 1;
                match_tally.skipped += tournament.matches.len();
                continue;
            }
            tournament_tally.committed += 1;

            for game in &tournament.matches {
                match in_transaction(self.conn, journal, |tx| commit_match(tx, journal, tournament.id(), game)) {
                    Ok(()) => match_tally.committed += 1,
                    Err(e) => {
                        warn!(
                            "Rolled back match {} {} #{} of {}: {:#}",
                            game.phase.as_str(),
                            game.round,
                            game.sequence,
                            tournament.id(),
                            e
                        );
                        match_tally.failed += 1;
                    }
                }
            }
        }

        info!("Committed {} tournaments and {} matches", tournament_tally.committed, match_tally.committed);
        Ok((tournament_tally, match_tally))
    }

    pub fn commit_players(&mut self, players: &[Player], journal: &Journal) -> Result<Tally> {
        let lookups = LookupRows::from_players(players);
        in_transaction(self.conn, journal, |tx| {
            for code in &lookups.countries {
                players::insert_country(tx, journal, code)?;
            }
            Ok(())
        })?;

        let mut tally = Tally::default();
        let now = self.now;

        for player in players {
            match in_transaction(self.conn, journal, |tx| commit_player(tx, journal, player, now)) {
                Ok(()) => tally.committed += 1,
                Err(e) => {
                    error!("Failed to commit player {}: {:#}", player.id, e);
                    tally.failed += 1;
                }
            }
        }

        info!("Committed {} players", tally.committed);
        Ok(tally)
    }

    /// Recompute team tenure and each player's current team
    pub fn refresh_teams(&mut self, journal: &Journal) -> Result<()> {
        in_transaction(self.conn, journal, |tx| {
            let teams = procedures::update_team_first_last_tournament(tx, journal)?;
            let players = procedures::update_current_team(tx, journal)?;
            info!("Refreshed tenure of {} teams and current team of {} players", teams, players);
            Ok(())
        })
    }
}

fn insert_tournament_lookups(tx: &Transaction, journal: &Journal, lookups: &LookupRows) -> Result<()> {
    for kind in &lookups.tournament_types {
        tournaments::insert_tournament_type(tx, journal, *kind)?;
    }
    for referee in &lookups.referees {
        tournaments::insert_referee(tx, journal, referee)?;
    }
    Ok(())
}

fn commit_tournament_graph(tx: &Transaction, journal: &Journal, tournament: &Tournament, now: DateTime<Utc>) -> Result<()> {
    let listing = &tournament.listing;
    tournaments::upsert_tournament(tx, journal, listing, now)?;
    tournaments::insert_tournament_images(tx, journal, listing)?;

    for referee in tournament.referees.iter().flatten() {
        tournaments::link_referee(tx, journal, &listing.id, referee)?;
    }

    for team in tournament.registered_teams.iter().flatten() {
        let [a, b] = &team.players;
        let team_id = procedures::create_team(tx, journal, a.key(), b.key())?;
        tournaments::add_tournament_team(tx, journal, &listing.id, team_id)?;
    }

    Ok(())
}

fn commit_match(tx: &Transaction, journal: &Journal, tournament_id: &str, game: &Match) -> Result<()> {
    let [a, b] = &game.first_team;
    let first_team = procedures::create_team(tx, journal, a.key(), b.key())?;
    let [c, d] = &game.second_team;
    let second_team = procedures::create_team(tx, journal, c.key(), d.key())?;

    let match_id = tournaments::upsert_match(tx, journal, tournament_id, game, first_team, second_team)?;
    for (idx, set) in game.results.iter().enumerate() {
        procedures::add_set_result(tx, journal, match_id, idx + 1, set)?;
    }
    procedures::trim_set_results(tx, journal, match_id, game.results.len())?;
    Ok(())
}

fn commit_player(tx: &Transaction, journal: &Journal, player: &Player, now: DateTime<Utc>) -> Result<()> {
    let inferred;
    let player = match player.category {
        Some(_) => player,
        None => {
            inferred = Player {
                category: players::infer_category_from_matches(tx, &player.id)?,
                ..player.clone()
            };
            &inferred
        }
    };

    players::upsert_player(tx, journal, player, now)?;
    players::insert_player_images(tx, journal, player)?;
    for stats in player.yearly_stats.values() {
        players::insert_yearly_stats(tx, journal, &player.id, stats)?;
    }
    if let Some(race) = &player.race_stats {
        players::insert_race_stats(tx, journal, &player.id, race, now)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tournaments::{count, list_matches, Table};
    use crate::database::{create_memory_pool, ensure_schema, get_connection};
    use crate::domain::{
        Phase, PlayerCategory, PlayerDetail, PlayerListing, PlayerRef, PlayerStats, RaceStats, Round, SetResult,
        TournamentCategory, TournamentGeneral, TournamentListing, TournamentType,
    };
    use chrono::NaiveDate;

    fn listing() -> TournamentListing {
        TournamentListing {
            id: "t1".into(),
            page_url: "https://example.com/en/tournaments/t1".into(),
            name: "T1 Open 2022".into(),
            year: Some(2022),
            place: "Madrid".into(),
            date_from: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2022, 1, 9).unwrap(),
            category: TournamentCategory::Male,
            kind: TournamentType::Open,
            poster_url: None,
            images: vec!["https://img/t1.png".into()],
        }
    }

    fn game(sequence: u32, second_team: [&str; 2], results: Vec<SetResult>) -> Match {
        Match {
            phase: Phase::MainDraw,
            round: Round::Semi,
            sequence,
            category: PlayerCategory::Male,
            first_team: [PlayerRef::Id("a".into()), PlayerRef::Id("b".into())],
            second_team: second_team.map(|p| PlayerRef::Id(p.to_string())),
            results,
        }
    }

    fn player(id: &str) -> Player {
        let mut detail = PlayerDetail {
            score: Some(100),
            image_urls: vec![format!("https://img/{}.png", id)],
            ..PlayerDetail::default()
        };
        detail.yearly_stats.insert(
            2021,
            PlayerStats {
                year: 2021,
                matches_played: Some(10),
                matches_won: Some(7),
                positions: Default::default(),
            },
        );
        let listing = PlayerListing {
            id: id.into(),
            first_name: "A".into(),
            middle_name: String::new(),
            last_name: "B".into(),
            category: PlayerCategory::Male,
        };
        Player::assemble(id.into(), Some(listing), detail, None)
    }

    #[test]
    fn test_bad_match_rolls_back_alone() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        ensure_schema(&conn).unwrap();
        let journal = Journal::new();

        let sets = vec![SetResult::new(6, 4), SetResult::new(6, 2)];
        let tournament = Tournament::assemble(
            listing(),
            TournamentGeneral {
                referees: Some(vec!["Ana".into()]),
            },
            None,
            vec![
                game(0, ["c", "d"], sets.clone()),
                // same team on both sides
                game(1, ["a", "b"], sets),
            ],
        );

        let mut reconciler = Reconciler::new(&mut conn, Utc::now());
        let (tournaments, matches) = reconciler
            .commit_tournaments(std::slice::from_ref(&tournament), &journal)
            .unwrap();

        assert_eq!(tournaments.committed, 1);
        assert_eq!((matches.committed, matches.failed), (1, 1));
        assert_eq!(list_matches(&conn, "t1").unwrap().len(), 1);
        assert_eq!(count(&conn, Table::SetResults).unwrap(), 2);
    }

    fn child_rows(conn: &Connection) -> (i64, i64) {
        let images = conn
            .query_row("SELECT COUNT(*) FROM player_images", [], |r| r.get(0))
            .unwrap();
        let stats = conn
            .query_row("SELECT COUNT(*) FROM player_yearly_stats", [], |r| r.get(0))
            .unwrap();
        (images, stats)
    }

    #[test]
    fn test_recommitting_a_player_adds_no_rows() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        ensure_schema(&conn).unwrap();
        let journal = Journal::new();
        let players = vec![player("p1")];

        Reconciler::new(&mut conn, Utc::now())
            .commit_players(&players, &journal)
            .unwrap();
        let first = child_rows(&conn);
        Reconciler::new(&mut conn, Utc::now())
            .commit_players(&players, &journal)
            .unwrap();

        assert_eq!(first, (1, 1));
        assert_eq!(child_rows(&conn), first);
    }

    #[test]
    fn test_unknown_category_is_inferred_from_matches() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        ensure_schema(&conn).unwrap();
        let journal = Journal::new();

        let tournament = Tournament::assemble(
            listing(),
            TournamentGeneral::default(),
            None,
            vec![game(0, ["c", "d"], vec![SetResult::new(6, 4), SetResult::new(6, 2)])],
        );
        let mut unlisted = Player::assemble("a".into(), None, PlayerDetail::default(), None);
        unlisted.first_name = "A".into();

        let summary = Reconciler::new(&mut conn, Utc::now())
            .commit_run(&[tournament], &[unlisted], &journal, &journal)
            .unwrap();

        assert_eq!(summary.players.committed, 1);
        let stored = players::find_by_id(&conn, "a").unwrap().unwrap();
        assert_eq!(stored.category.as_deref(), Some("male"));
        assert!(stored.current_team.is_some());
        assert!(journal.render().contains("INSERT INTO players"));
    }

    #[test]
    fn test_rescraped_match_with_fewer_sets_drops_the_extra_set() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        ensure_schema(&conn).unwrap();
        let journal = Journal::new();

        let three_sets = vec![SetResult::new(6, 4), SetResult::new(3, 6), SetResult::new(6, 1)];
        let first = Tournament::assemble(listing(), TournamentGeneral::default(), None, vec![game(0, ["c", "d"], three_sets)]);
        Reconciler::new(&mut conn, Utc::now())
            .commit_tournaments(&[first], &journal)
            .unwrap();
        assert_eq!(count(&conn, Table::SetResults).unwrap(), 3);

        let two_sets = vec![SetResult::new(6, 4), SetResult::new(6, 3)];
        let second = Tournament::assemble(listing(), TournamentGeneral::default(), None, vec![game(0, ["c", "d"], two_sets)]);
        let (_, matches) = Reconciler::new(&mut conn, Utc::now())
            .commit_tournaments(&[second], &journal)
            .unwrap();

        assert_eq!(matches.committed, 1);
        assert_eq!(count(&conn, Table::Matches).unwrap(), 1);
        assert_eq!(count(&conn, Table::SetResults).unwrap(), 2);
        let second_set: (i64, i64) = conn
            .query_row(
                "SELECT first_team_score, second_team_score FROM set_results WHERE set_number = 2",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(second_set, (6, 3));
    }

    #[test]
    fn test_race_standing_of_a_year_is_kept() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        ensure_schema(&conn).unwrap();
        let journal = Journal::new();

        let with_race = |points| {
            let mut p = player("p1");
            p.race_stats = Some(RaceStats {
                ranking: Some(3),
                points: Some(points),
            });
            p
        };

        Reconciler::new(&mut conn, Utc::now())
            .commit_players(&[with_race(100)], &journal)
            .unwrap();
        Reconciler::new(&mut conn, Utc::now())
            .commit_players(&[with_race(999)], &journal)
            .unwrap();

        let (rows, points): (i64, i64) = conn
            .query_row("SELECT COUNT(*), MAX(points) FROM player_race_stats WHERE player = 'p1'", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!((rows, points), (1, 100));
    }
}

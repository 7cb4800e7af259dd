use chrono::{DateTime, Utc};
use std::sync::Arc;

use wpt_scraper::config::{AppConfig, RunMode, ScraperSettings};
use wpt_scraper::database::{self, players, tournaments, DbPool};
use wpt_scraper::http::testing::ScriptedTransport;
use wpt_scraper::services::scrape::{ScrapeOptions, ScrapeService};

const BASE: &str = "https://wpt.test";

const LISTING: &str = r#"
    <div class="c-tournaments__container">
      <span class="c-tournaments__tag">WPT OPEN</span>
      <p class="c-tournaments__date">From 01/01/2022 to 09/01/2022</p>
      <h3 class="c-tournaments__title">T1 Open 2022</h3>
      <p class="c-tournaments__cat">Male</p>
      <p class="c-tournaments__city">Madrid. Spain</p>
      <div class="c-tournaments__triggers"><a href="/en/tournaments/t1">Info</a></div>
    </div>"#;

const PHASES: &str = r#"
    <select id="filter-results-phase">
      <option>Tournament phase</option>
      <option>Main draw</option>
    </select>"#;

const RESULTS: &str = r#"
    <div class="c-results-wrapper"><h3 class="c-results-title">Final - 09/01</h3></div>
    <div class="c-teams__item">
      <div class="c-teams__iandt"><span>1</span></div>
      <a class="c-trigger" href="/jugadores/a">A</a>
      <a class="c-trigger" href="/jugadores/b">B</a>
      <a class="c-trigger" href="/jugadores/c">C</a>
      <a class="c-trigger" href="/jugadores/d">D</a>
      <div class="c-teams__iandt"><span>6-4 | 3-6 | 7-6(10)</span></div>
    </div>"#;

const PROFILE: &str = r#"
    <div class="c-player">
      <p class="c-player__name">Alvaro Ayala</p>
      <div class="c-ranking-header">
        <div class="c-ranking-header__data-box"><p class="c-ranking-header__data">12</p></div>
        <div class="c-ranking-header__data-box"><p class="c-ranking-header__data">4500</p></div>
      </div>
    </div>"#;

fn envelope(fragment: &str) -> String {
    serde_json::json!({ "res": true, "data": fragment }).to_string()
}

fn tab_url() -> String {
    format!("{}/info-torneos/t1", BASE)
}

fn scripted_site() -> Arc<ScriptedTransport> {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(&format!("{}/search-torneos/-/2022", BASE), &envelope(LISTING));
    transport.respond_to(&tab_url(), &[("selected_tab", "results")], &envelope(PHASES));
    transport.respond_to(
        &tab_url(),
        &[("selected_tab", "results"), ("section_data[1][data]", "main draw")],
        &envelope(RESULTS),
    );
    transport.respond(&format!("{}/en/players/a", BASE), PROFILE);
    transport
}

fn config() -> AppConfig {
    AppConfig {
        mode: RunMode::Production,
        scraper: ScraperSettings {
            base_url: BASE.to_string(),
            retries: 0,
            retry_delay_ms: 0,
            ..ScraperSettings::default()
        },
        ..AppConfig::default()
    }
}

fn at(timestamp: &str) -> DateTime<Utc> {
    timestamp.parse().unwrap()
}

fn only_t1() -> ScrapeOptions {
    ScrapeOptions {
        tournament_ids: vec!["t1".to_string()],
        ..ScrapeOptions::default()
    }
}

fn service(pool: &DbPool, transport: &Arc<ScriptedTransport>) -> ScrapeService {
    ScrapeService::with_transport(config(), pool.clone(), transport.clone())
}

#[tokio::test]
async fn final_block_commits_one_main_draw_final() {
    let pool = database::create_memory_pool().unwrap();
    let transport = scripted_site();

    let summary = service(&pool, &transport)
        .run_at(&only_t1(), at("2022-06-01T10:00:00Z"))
        .await
        .unwrap();

    assert_eq!(summary.tournaments.committed, 1);
    assert_eq!(summary.matches.committed, 1);

    let conn = database::get_connection(&pool).unwrap();
    let matches = tournaments::list_matches(&conn, "t1").unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].phase, "main_draw");
    assert_eq!(matches[0].round, "final");
    assert_eq!(tournaments::count(&conn, tournaments::Table::SetResults).unwrap(), 3);

    let stored = tournaments::find_by_id(&conn, "t1").unwrap().unwrap();
    assert_eq!(stored.year, Some(2022));
}

#[tokio::test]
async fn match_rosters_feed_the_player_pass() {
    let pool = database::create_memory_pool().unwrap();
    let transport = scripted_site();

    let summary = service(&pool, &transport)
        .run_at(&only_t1(), at("2022-06-01T10:00:00Z"))
        .await
        .unwrap();

    // only "a" has a profile page
    assert_eq!(summary.players.committed, 1);
    assert_eq!(summary.players.failed, 3);

    let conn = database::get_connection(&pool).unwrap();
    let a = players::find_by_id(&conn, "a").unwrap().unwrap();
    assert_eq!(a.first_name, "Alvaro");
    assert_eq!(a.points, Some(4500));
    assert_eq!(a.category.as_deref(), Some("male"));
    assert!(a.current_team.is_some());
}

#[tokio::test]
async fn finished_tournament_is_not_fetched_again() {
    let pool = database::create_memory_pool().unwrap();
    let transport = scripted_site();

    service(&pool, &transport)
        .run_at(&only_t1(), at("2022-06-01T10:00:00Z"))
        .await
        .unwrap();
    let tab_calls = transport.calls(&tab_url());
    let profile_calls = transport.calls(&format!("{}/en/players/a", BASE));
    assert!(tab_calls > 0);

    let summary = service(&pool, &transport)
        .run_at(&only_t1(), at("2022-06-02T10:00:00Z"))
        .await
        .unwrap();

    assert_eq!(transport.calls(&tab_url()), tab_calls);
    assert_eq!(transport.calls(&format!("{}/en/players/a", BASE)), profile_calls);
    assert_eq!(summary.tournaments.skipped, 1);
    assert_eq!(summary.tournaments.committed, 0);
}

use log::warn;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::{css, first_text, flag_country, next_element, player_id_from_href, split_name, style_url, text_of, text_parts};
use crate::domain::pattern;
use crate::domain::quality::{non_empty, parse_count, parse_date_field};
use crate::domain::{
    CourtPosition, PlayerCategory, PlayerDetail, PlayerId, PlayerListing, PlayerStats, RaceStats, TournamentPositions,
};
use crate::errors::ExtractionFailure;
use crate::extract::{Batch, Extractor, ProfileContext};
use crate::http::Document;

static YEAR: LazyLock<Option<Regex>> = LazyLock::new(|| pattern::compile("year", r"\d{4}"));

/// Ranking listing fragment: one `.c-trigger` card per player
pub struct RankingPage;

impl RankingPage {
    const PAGE: &'static str = "ranking";

    fn card(card: ElementRef, category: PlayerCategory) -> Result<PlayerListing, ExtractionFailure> {
        let href = card.value().attr("href").unwrap_or_default();
        let id = player_id_from_href(href)
            .ok_or_else(|| ExtractionFailure::new(Self::PAGE, format!("card without profile link: {:?}", href)))?;

        let name = css(Self::PAGE, ".c-player-card__name")?;
        let parts = card.select(&name).next().map(text_parts).unwrap_or_default();
        let (first_name, middle_name, last_name) = split_name(&parts)
            .ok_or_else(|| ExtractionFailure::new(Self::PAGE, format!("card {} has no name", id)))?;

        Ok(PlayerListing {
            id,
            first_name,
            middle_name,
            last_name,
            category,
        })
    }
}

impl Extractor for RankingPage {
    type Context = PlayerCategory;
    type Output = Batch<PlayerListing>;

    fn extract(&self, document: &Document, category: &PlayerCategory) -> Result<Self::Output, ExtractionFailure> {
        let html = document.html();
        let cards = css(Self::PAGE, ".c-trigger")?;
        Ok(html.select(&cards).map(|card| Self::card(card, *category)).collect())
    }
}

/// Race standing page: ranking and points of the current season
pub struct RacePage;

impl RacePage {
    const PAGE: &'static str = "race";

    fn card(card: ElementRef) -> Result<(PlayerId, RaceStats), ExtractionFailure> {
        let link = css(Self::PAGE, ".c-race__player a")?;
        let content = css(Self::PAGE, ".c-race__content")?;
        let position = css(Self::PAGE, ".c-race__position-content p")?;
        let paragraph = css(Self::PAGE, "p")?;

        let id = card
            .select(&link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(player_id_from_href)
            .ok_or_else(|| ExtractionFailure::new(Self::PAGE, "race card without profile link"))?;

        let points = card
            .select(&content)
            .nth(1)
            .and_then(|c| first_text(c, &paragraph))
            .and_then(|raw| parse_count("race points", &raw, &id));
        let ranking = first_text(card, &position).and_then(|raw| parse_count("race ranking", &raw, &id));

        Ok((id, RaceStats { ranking, points }))
    }
}

impl Extractor for RacePage {
    type Context = ();
    type Output = Batch<(PlayerId, RaceStats)>;

    fn extract(&self, document: &Document, _: &()) -> Result<Self::Output, ExtractionFailure> {
        let html = document.html();
        let cards = css(Self::PAGE, ".c-race")?;
        Ok(html.select(&cards).map(Self::card).collect())
    }
}

/// Player profile page
pub struct ProfilePage;

impl ProfilePage {
    const PAGE: &'static str = "profile";

    /// Values of the `.c-ranking-header__data-box` cells under `scope`
    fn data_boxes(scope: ElementRef) -> Result<Vec<String>, ExtractionFailure> {
        let boxes = css(Self::PAGE, ".c-ranking-header__data-box")?;
        let data = css(Self::PAGE, ".c-ranking-header__data")?;
        Ok(scope
            .select(&boxes)
            .map(|b| first_text(b, &data).unwrap_or_default())
            .collect())
    }

    fn header(player: ElementRef, id: &str, detail: &mut PlayerDetail) -> Result<(), ExtractionFailure> {
        let header = css(Self::PAGE, ".c-ranking-header")?;
        let name = css(Self::PAGE, ".c-player__name")?;
        let img = css(Self::PAGE, "img")?;

        if let Some((first, middle, last)) = player.select(&name).next().map(text_parts).as_deref().and_then(split_name) {
            detail.first_name = non_empty(&first);
            detail.middle_name = non_empty(&middle);
            detail.last_name = non_empty(&last);
        }

        let Some(header) = player.select(&header).next() else {
            warn!("Data quality: profile of {} has no ranking header", id);
            return Ok(());
        };

        let values = Self::data_boxes(header)?;
        detail.ranking = values.first().and_then(|raw| parse_count("ranking", raw, id));
        detail.score = values.get(1).and_then(|raw| parse_count("score", raw, id));
        detail.country = header
            .select(&img)
            .next()
            .and_then(|flag| flag.value().attr("src"))
            .and_then(flag_country);
        Ok(())
    }

    fn footer(player: ElementRef, id: &str, detail: &mut PlayerDetail) -> Result<(), ExtractionFailure> {
        let footer = css(Self::PAGE, ".c-player__footer")?;
        let cropped = css(Self::PAGE, ".c-player__img-container .u-img-cropped")?;
        let items = css(Self::PAGE, ".c-player__data-item")?;
        let paragraph = css(Self::PAGE, "p")?;
        let link = css(Self::PAGE, "p a")?;

        let Some(footer) = player.select(&footer).next() else {
            return Ok(());
        };

        detail.profile_image_url = footer.select(&cropped).next().and_then(style_url);

        let items: Vec<ElementRef> = footer.select(&items).collect();
        let value = |index: usize| items.get(index).and_then(|item| first_text(*item, &paragraph));

        detail.current_partner = items
            .first()
            .and_then(|item| item.select(&link).next())
            .and_then(|a| a.value().attr("href"))
            .and_then(player_id_from_href);
        detail.court_position = value(1).and_then(|raw| CourtPosition::from_label(&raw));
        detail.birthplace = value(2).as_deref().and_then(non_empty);
        detail.birthdate = value(3).and_then(|raw| parse_date_field("birthdate", &raw, id));
        detail.height = value(4).and_then(|raw| parse_count("height", &raw, id));
        detail.hometown = value(5).as_deref().and_then(non_empty);
        Ok(())
    }

    fn totals(html: &Html, id: &str, detail: &mut PlayerDetail) -> Result<(), ExtractionFailure> {
        let table = css(Self::PAGE, ".c-ranking-header--table")?;
        let Some(table) = html.select(&table).next() else {
            return Ok(());
        };

        let values = Self::data_boxes(table)?;
        detail.total_matches_played = values.first().and_then(|raw| parse_count("matches played", raw, id));
        detail.total_matches_won = values.get(1).and_then(|raw| parse_count("matches won", raw, id));
        detail.consecutive_wins = values.get(4).and_then(|raw| parse_count("consecutive wins", raw, id));
        Ok(())
    }

    fn yearly_stats(html: &Html, id: &str) -> Result<BTreeMap<i32, PlayerStats>, ExtractionFailure> {
        let headings = css(Self::PAGE, ".c-ranking__heading")?;
        let tables = css(Self::PAGE, ".c-flex-table--ranking")?;

        let mut stats = BTreeMap::new();
        for heading in html.select(&headings) {
            if text_of(heading).to_lowercase() != "yearly stats" {
                continue;
            }

            let wrapper = heading.parent().and_then(ElementRef::wrap).and_then(next_element);
            for table in wrapper.iter().flat_map(|w| w.select(&tables)) {
                if let Some(year_stats) = Self::year_table(table, id)? {
                    stats.insert(year_stats.year, year_stats);
                }
            }
        }
        Ok(stats)
    }

    fn year_table(table: ElementRef, id: &str) -> Result<Option<PlayerStats>, ExtractionFailure> {
        let headings = css(Self::PAGE, ".c-flex-table__heading")?;
        let h3 = css(Self::PAGE, "h3")?;

        let mut year = None;
        let mut matches_played = None;
        let mut matches_won = None;
        let mut positions = TournamentPositions::default();

        for heading in table.select(&headings) {
            let title = first_text(heading, &h3).unwrap_or_default().to_lowercase();
            let items = match next_element(heading) {
                Some(body) => Self::items(body, id)?,
                None => Vec::new(),
            };

            if title.contains("stats") {
                year = YEAR
                    .as_ref()
                    .and_then(|re| re.find(&title))
                    .and_then(|m| m.as_str().parse::<i32>().ok());
                for (label, value) in items {
                    if label.contains("played") {
                        matches_played = value;
                    } else if label.contains("won") {
                        matches_won = value;
                    }
                }
            } else {
                for (label, value) in items {
                    match label.as_str() {
                        "winner" => positions.winner = value,
                        "final" => positions.finals = value,
                        "semifinals" => positions.semis = value,
                        "quarter finals" => positions.quarters = value,
                        "1/8 round" => positions.round_of_eight = value,
                        "1/16 round" => positions.round_of_sixteen = value,
                        _ => {}
                    }
                }
            }
        }

        match year {
            Some(year) => Ok(Some(PlayerStats {
                year,
                matches_played,
                matches_won,
                positions,
            })),
            None => {
                warn!("Data quality: yearly stats table of {} has no year", id);
                Ok(None)
            }
        }
    }

    /// (lowercased title, value) pairs of a stats table
    fn items(body: ElementRef, id: &str) -> Result<Vec<(String, Option<u32>)>, ExtractionFailure> {
        let item = css(Self::PAGE, ".c-flex-table__item")?;
        let title = css(Self::PAGE, ".c-flex-table__item-title")?;
        let data = css(Self::PAGE, ".c-flex-table__item-data")?;

        Ok(body
            .select(&item)
            .map(|cell| {
                let label = first_text(cell, &title).unwrap_or_default().to_lowercase();
                let value = first_text(cell, &data).and_then(|raw| parse_count(&label, &raw, id));
                (label, value)
            })
            .collect())
    }
}

impl Extractor for ProfilePage {
    type Context = ProfileContext;
    type Output = PlayerDetail;

    fn extract(&self, document: &Document, context: &ProfileContext) -> Result<PlayerDetail, ExtractionFailure> {
        let html = document.html();
        let player = css(Self::PAGE, ".c-player")?;
        let banner = css(Self::PAGE, ".c-player__img")?;
        let id = context.id.as_str();

        let root = html
            .select(&player)
            .next()
            .ok_or_else(|| ExtractionFailure::new(Self::PAGE, format!("{} has no player block", id)))?;

        let mut detail = PlayerDetail {
            image_urls: root
                .select(&banner)
                .filter_map(|img| img.value().attr("src"))
                .map(str::to_string)
                .collect(),
            ..Default::default()
        };

        Self::header(root, id, &mut detail)?;
        Self::footer(root, id, &mut detail)?;
        Self::totals(&html, id, &mut detail)?;
        detail.yearly_stats = Self::yearly_stats(&html, id)?;

        if context.listing.is_none() && detail.first_name.is_none() {
            warn!("Data quality: profile of {} carries no name", id);
        }

        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        assert!(YEAR.is_some());
    }

    const RANKING: &str = r#"
        <div class="c-ranking">
          <a class="c-trigger" href="https://www.worldpadeltour.com/jugadores/juan-lebron-chincoa">
            <div class="c-player-card__name">Juan<br>Lebrón<br>Chincoa</div>
          </a>
          <a class="c-trigger" href="https://www.worldpadeltour.com/en/">
            <div class="c-player-card__name">Broken</div>
          </a>
          <a class="c-trigger" href="https://www.worldpadeltour.com/jugadores/ale-galan">
            <div class="c-player-card__name">Alejandro<br>Galán</div>
          </a>
        </div>"#;

    const RACE: &str = r#"
        <div class="c-ranking">
          <div class="c-race">
            <div class="c-race__player">
              <div class="c-race__position-content"><p>1</p></div>
              <a href="/en/players/ale-galan">Galán</a>
              <div class="c-race__content"><p>Spain</p></div>
              <div class="c-race__content"><p>12,340 pts</p></div>
            </div>
          </div>
          <div class="c-race">
            <div class="c-race__player">
              <div class="c-race__position-content"><p>2</p></div>
              <a href="/en/players/juan-lebron-chincoa">Lebrón</a>
              <div class="c-race__content"><p>Spain</p></div>
              <div class="c-race__content"><p>??</p></div>
            </div>
          </div>
        </div>"#;

    const PROFILE: &str = r#"
        <div id="site-container">
          <div class="c-player">
            <img class="c-player__img" src="https://cdn.example.com/banner.jpg">
            <div class="c-player__name">Miguel<br>Lamperti</div>
            <div class="c-ranking-header">
              <img src="https://www.worldpadeltour.com/media/images/flags/ar.png">
              <div class="c-ranking-header__data-box"><p class="c-ranking-header__data">48</p></div>
              <div class="c-ranking-header__data-box"><p class="c-ranking-header__data">1,905</p></div>
            </div>
            <div class="c-player__footer">
              <div class="c-player__img-container">
                <div class="u-img-cropped" style="background-image: url('https://cdn.example.com/face.png')"></div>
              </div>
              <div class="c-player__data-item"><p><a href="/jugadores/aday-santana">Aday Santana</a></p></div>
              <div class="c-player__data-item"><p>Revés</p></div>
              <div class="c-player__data-item"><p>Villa María</p></div>
              <div class="c-player__data-item"><p>03/11/1978</p></div>
              <div class="c-player__data-item"><p>1,81</p></div>
              <div class="c-player__data-item"><p>Córdoba</p></div>
            </div>
          </div>
          <div class="c-ranking-header c-ranking-header--table">
            <div class="c-ranking-header__data-box"><p class="c-ranking-header__data">700</p></div>
            <div class="c-ranking-header__data-box"><p class="c-ranking-header__data">400</p></div>
            <div class="c-ranking-header__data-box"><p class="c-ranking-header__data">-</p></div>
            <div class="c-ranking-header__data-box"><p class="c-ranking-header__data">-</p></div>
            <div class="c-ranking-header__data-box"><p class="c-ranking-header__data">7</p></div>
          </div>
          <div class="c-ranking">
            <div><h2 class="c-ranking__heading">Yearly stats</h2></div>
            <div class="c-ranking__body">
              <div class="c-flex-table c-flex-table--ranking">
                <div class="c-flex-table__heading"><h3>2021 Stats</h3></div>
                <div class="c-flex-table__body">
                  <div class="c-flex-table__item">
                    <span class="c-flex-table__item-title">Matches played</span>
                    <span class="c-flex-table__item-data">30</span>
                  </div>
                  <div class="c-flex-table__item">
                    <span class="c-flex-table__item-title">Matches won</span>
                    <span class="c-flex-table__item-data">18</span>
                  </div>
                </div>
                <div class="c-flex-table__heading"><h3>Tournaments</h3></div>
                <div class="c-flex-table__body">
                  <div class="c-flex-table__item">
                    <span class="c-flex-table__item-title">Winner</span>
                    <span class="c-flex-table__item-data">0</span>
                  </div>
                  <div class="c-flex-table__item">
                    <span class="c-flex-table__item-title">Quarter finals</span>
                    <span class="c-flex-table__item-data">3</span>
                  </div>
                </div>
              </div>
            </div>
          </div>
        </div>"#;

    #[test]
    fn test_ranking_cards() {
        let batch = RankingPage
            .extract(&Document::new("ranking", RANKING), &PlayerCategory::Male)
            .unwrap();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.records[0].id, "juan-lebron-chincoa");
        assert_eq!(batch.records[0].middle_name, "Lebrón");
        assert_eq!(batch.records[1].middle_name, "");
        assert_eq!(batch.records[1].last_name, "Galán");
        assert_eq!(batch.records[1].category, PlayerCategory::Male);
    }

    #[test]
    fn test_race_points_are_optional() {
        let batch = RacePage.extract(&Document::new("race", RACE), &()).unwrap();

        assert_eq!(
            batch.records[0],
            (
                "ale-galan".to_string(),
                RaceStats {
                    ranking: Some(1),
                    points: Some(12340)
                }
            )
        );
        assert_eq!(batch.records[1].1.points, None);
        assert_eq!(batch.records[1].1.ranking, Some(2));
    }

    #[test]
    fn test_profile_fields() {
        let context = ProfileContext {
            id: "miguel-lamperti".into(),
            listing: None,
        };
        let detail = ProfilePage
            .extract(&Document::new("profile", PROFILE), &context)
            .unwrap();

        assert_eq!(detail.first_name.as_deref(), Some("Miguel"));
        assert_eq!(detail.last_name.as_deref(), Some("Lamperti"));
        assert_eq!(detail.ranking, Some(48));
        assert_eq!(detail.score, Some(1905));
        assert_eq!(detail.country.as_deref(), Some("AR"));
        assert_eq!(detail.image_urls, vec!["https://cdn.example.com/banner.jpg"]);
        assert_eq!(detail.profile_image_url.as_deref(), Some("https://cdn.example.com/face.png"));
        assert_eq!(detail.current_partner.as_deref(), Some("aday-santana"));
        assert_eq!(detail.court_position, Some(CourtPosition::Left));
        assert_eq!(detail.birthplace.as_deref(), Some("Villa María"));
        assert_eq!(detail.birthdate, chrono::NaiveDate::from_ymd_opt(1978, 11, 3));
        assert_eq!(detail.height, Some(181));
        assert_eq!(detail.total_matches_played, Some(700));
        assert_eq!(detail.total_matches_won, Some(400));
        assert_eq!(detail.consecutive_wins, Some(7));

        let stats = &detail.yearly_stats[&2021];
        assert_eq!(stats.matches_played, Some(30));
        assert_eq!(stats.matches_won, Some(18));
        assert_eq!(stats.positions.quarters, Some(3));
        assert_eq!(stats.positions.winner, Some(0));
        assert_eq!(stats.positions.finals, None);
    }

    #[test]
    fn test_profile_without_player_block_fails() {
        let context = ProfileContext {
            id: "ghost".into(),
            listing: None,
        };
        assert!(ProfilePage.extract(&Document::new("profile", "<p>gone</p>"), &context).is_err());
    }
}

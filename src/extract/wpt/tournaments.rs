use log::warn;
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

use super::{css, first_text, has_class, player_ref, style_url, text_of, tournament_id_from_href};
use crate::domain::pattern;
use crate::domain::quality::parse_day_month_year;
use crate::domain::year::resolve_year;
use crate::domain::{
    Phase, PlayerCategory, PlayerRef, RegisteredTeam, TournamentCategory, TournamentGeneral, TournamentListing,
    TournamentType,
};
use crate::errors::ExtractionFailure;
use crate::extract::{Batch, Extractor, RawMatchRow, ResultBlock, ResultsContext};
use crate::http::Document;

static DATE: LazyLock<Option<Regex>> = LazyLock::new(|| pattern::compile("date", r"\d{2}/\d{2}/\d{4}"));

/// Yearly tournament listing: one `.c-tournaments__container` per tournament
pub struct TournamentListPage;

impl TournamentListPage {
    const PAGE: &'static str = "tournament listing";

    fn card(card: ElementRef, listing_year: i32) -> Result<TournamentListing, ExtractionFailure> {
        let failure = |reason: String| ExtractionFailure::new(Self::PAGE, format!("{} ({})", reason, listing_year));

        let triggers = css(Self::PAGE, ".c-tournaments__triggers a")?;
        let date = css(Self::PAGE, ".c-tournaments__date")?;
        let title = css(Self::PAGE, ".c-tournaments__title")?;
        let cat = css(Self::PAGE, ".c-tournaments__cat")?;
        let city = css(Self::PAGE, ".c-tournaments__city")?;
        let tag = css(Self::PAGE, ".c-tournaments__tag")?;
        let poster = css(Self::PAGE, ".c-tournaments__poster .c-tournaments__img")?;
        let header = css(Self::PAGE, ".c-tournaments__top-card .c-tournaments__header")?;

        let page_url = card
            .select(&triggers)
            .find(|a| text_of(*a).to_lowercase().contains("info"))
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
            .ok_or_else(|| failure("card without info link".to_string()))?;
        let id = tournament_id_from_href(&page_url)
            .ok_or_else(|| failure(format!("unrecognised info link {}", page_url)))?;

        let name = first_text(card, &title).unwrap_or_default();
        if name.is_empty() {
            return Err(failure(format!("{} has no name", id)));
        }

        let date_text = first_text(card, &date).unwrap_or_default();
        let dates: Vec<_> = DATE
            .as_ref()
            .map(|re| {
                re.find_iter(&date_text)
                    .filter_map(|m| parse_day_month_year(m.as_str()))
                    .collect()
            })
            .unwrap_or_default();
        let (date_from, date_to) = match dates.as_slice() {
            [single] => (*single, *single),
            [from, to, ..] => (*from, *to),
            [] => return Err(failure(format!("{} has no dates: {:?}", id, date_text))),
        };
        if date_from > date_to {
            return Err(failure(format!("{} ends before it starts", id)));
        }

        let year = resolve_year(&name, date_from, date_to)
            .map_err(|e| warn!("{}; storing it without a year", e))
            .ok();

        let place = first_text(card, &city)
            .map(|raw| raw.split('.').next().unwrap_or_default().trim().to_string())
            .unwrap_or_default();

        Ok(TournamentListing {
            id,
            page_url,
            name,
            year,
            place,
            date_from,
            date_to,
            category: category_of(&first_text(card, &cat).unwrap_or_default()),
            kind: TournamentType::from_tag(&first_text(card, &tag).unwrap_or_default()),
            poster_url: card.select(&poster).next().and_then(style_url),
            images: card.select(&header).filter_map(style_url).collect(),
        })
    }
}

fn category_of(label: &str) -> TournamentCategory {
    let label = label.to_lowercase();
    let female = label.contains("female") || label.contains("women");
    let male = label.replace("female", "").replace("women", "").contains("male")
        || label.replace("women", "").contains("men");

    match (male, female) {
        (true, false) => TournamentCategory::Male,
        (false, true) => TournamentCategory::Female,
        _ => TournamentCategory::Both,
    }
}

impl Extractor for TournamentListPage {
    type Context = i32;
    type Output = Batch<TournamentListing>;

    fn extract(&self, document: &Document, year: &i32) -> Result<Self::Output, ExtractionFailure> {
        let html = document.html();
        let cards = css(Self::PAGE, ".c-tournaments__container")?;
        Ok(html.select(&cards).map(|card| Self::card(card, *year)).collect())
    }
}

/// General information tab; only the referees are kept
pub struct InfoTab;

impl InfoTab {
    const PAGE: &'static str = "tournament info";
}

impl Extractor for InfoTab {
    type Context = ();
    type Output = TournamentGeneral;

    fn extract(&self, document: &Document, _: &()) -> Result<TournamentGeneral, ExtractionFailure> {
        let html = document.html();
        let rows = css(Self::PAGE, ".c-flex-table__row")?;
        let icon = css(Self::PAGE, ".c-flex-table__heading img")?;
        let content = css(Self::PAGE, ".c-flex-table__content span")?;

        let referee_row = html.select(&rows).find(|row| {
            row.select(&icon)
                .filter_map(|img| img.value().attr("src"))
                .any(|src| src.to_lowercase().contains("referee"))
        });

        let referees = referee_row.map(|row| {
            row.select(&content)
                .map(text_of)
                .collect::<Vec<_>>()
                .join("|")
                .split('|')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        });

        Ok(TournamentGeneral { referees })
    }
}

/// Registered teams tab, one column per category
pub struct RegistrationsTab;

impl RegistrationsTab {
    const PAGE: &'static str = "registrations";

    fn team(item: ElementRef, category: PlayerCategory) -> Result<RegisteredTeam, ExtractionFailure> {
        let players = team_players(Self::PAGE, item, 2)?;
        match <[PlayerRef; 2]>::try_from(players) {
            Ok(players) => Ok(RegisteredTeam { players, category }),
            Err(players) => Err(ExtractionFailure::new(
                Self::PAGE,
                format!("team with {} players", players.len()),
            )),
        }
    }
}

impl Extractor for RegistrationsTab {
    type Context = ();
    type Output = Batch<RegisteredTeam>;

    fn extract(&self, document: &Document, _: &()) -> Result<Self::Output, ExtractionFailure> {
        let html = document.html();
        let columns = css(Self::PAGE, ".c-teams__column")?;
        let title = css(Self::PAGE, ".c-teams__iandt span")?;
        let items = css(Self::PAGE, ".c-teams__item")?;

        let mut batch = Batch::new();
        for column in html.select(&columns) {
            let label = column.select(&title).last().map(text_of).unwrap_or_default();
            let category = if label.to_lowercase().contains("women") {
                PlayerCategory::Female
            } else {
                PlayerCategory::Male
            };

            for item in column.select(&items) {
                batch.push(Self::team(item, category));
            }
        }
        Ok(batch)
    }
}

fn team_players(page: &'static str, scope: ElementRef, limit: usize) -> Result<Vec<PlayerRef>, ExtractionFailure> {
    let triggers = css(page, ".c-trigger")?;
    scope
        .select(&triggers)
        .take(limit)
        .map(|trigger| {
            player_ref(trigger).ok_or_else(|| ExtractionFailure::new(page, "player slot without link or name"))
        })
        .collect()
}

/// Phase filter of the results tab
pub struct PhasesTab;

impl PhasesTab {
    const PAGE: &'static str = "result phases";
}

impl Extractor for PhasesTab {
    type Context = ();
    type Output = Batch<Phase>;

    fn extract(&self, document: &Document, _: &()) -> Result<Self::Output, ExtractionFailure> {
        let html = document.html();
        let options = css(Self::PAGE, "#filter-results-phase option")?;

        Ok(html
            .select(&options)
            .map(text_of)
            .filter(|label| !matches!(label.to_lowercase().as_str(), "all" | "tournament phase"))
            .map(|label| {
                Phase::parse(&label).ok_or_else(|| ExtractionFailure::new(Self::PAGE, format!("unknown phase {:?}", label)))
            })
            .collect())
    }
}

/// Results of one phase: a `.c-results-wrapper` heading per round, followed
/// by its match rows
pub struct ResultsTab;

impl ResultsTab {
    const PAGE: &'static str = "results";

    fn row(row: ElementRef) -> Result<RawMatchRow, ExtractionFailure> {
        let score = css(Self::PAGE, ".c-teams__iandt")?;
        let span = css(Self::PAGE, "span")?;

        let score_line = row
            .select(&score)
            .nth(1)
            .map(|container| container.select(&span).map(text_of).collect::<Vec<_>>().join(" | "))
            .filter(|line| !line.is_empty())
            .ok_or_else(|| ExtractionFailure::new(Self::PAGE, "match row without score"))?;

        Ok(RawMatchRow {
            score_line,
            players: team_players(Self::PAGE, row, 4)?,
        })
    }
}

impl Extractor for ResultsTab {
    type Context = ResultsContext;
    type Output = Vec<ResultBlock>;

    fn extract(&self, document: &Document, _: &ResultsContext) -> Result<Vec<ResultBlock>, ExtractionFailure> {
        let html = document.html();
        let wrappers = css(Self::PAGE, ".c-results-wrapper")?;
        let title = css(Self::PAGE, ".c-results-title")?;

        Ok(html
            .select(&wrappers)
            .map(|wrapper| ResultBlock {
                heading: first_text(wrapper, &title).unwrap_or_default(),
                rows: wrapper
                    .next_siblings()
                    .filter_map(ElementRef::wrap)
                    .take_while(|sibling| !has_class(*sibling, "c-results-wrapper"))
                    .map(Self::row)
                    .collect(),
            })
            .collect())
    }
}

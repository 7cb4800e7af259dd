//! Extractors for the World Padel Tour markup.

mod players;
mod tournaments;

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use crate::domain::pattern;
use crate::domain::{PlayerId, PlayerRef, TournamentId};
use crate::errors::ExtractionFailure;

pub use players::{ProfilePage, RacePage, RankingPage};
pub use tournaments::{InfoTab, PhasesTab, RegistrationsTab, ResultsTab, TournamentListPage};

static PLAYER_LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| pattern::compile("player link", r"/(?:jugadores|players)/([^/?#]+)"));
static TOURNAMENT_LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| pattern::compile("tournament link", r"/(?:tournaments|info-torneos)/([^/?#]+)"));
static CSS_URL: LazyLock<Option<Regex>> =
    LazyLock::new(|| pattern::compile("css url", r#"url\(\s*['"]?([^'")]+)['"]?\s*\)"#));

fn css(page: &'static str, selector: &str) -> Result<Selector, ExtractionFailure> {
    Selector::parse(selector).map_err(|e| ExtractionFailure::new(page, format!("bad selector {}: {:?}", selector, e)))
}

/// Text content with whitespace collapsed
fn text_of(element: ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Non-empty text nodes, each trimmed. `<br>`-separated names come out as parts.
fn text_parts(element: ElementRef) -> Vec<String> {
    element
        .text()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn first_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(text_of)
}

fn capture(regex: &Option<Regex>, haystack: &str) -> Option<String> {
    regex
        .as_ref()
        .and_then(|re| re.captures(haystack))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn player_id_from_href(href: &str) -> Option<PlayerId> {
    capture(&PLAYER_LINK, href.trim())
}

pub fn tournament_id_from_href(href: &str) -> Option<TournamentId> {
    capture(&TOURNAMENT_LINK, href.trim())
}

/// Profile link when there is one, the printed name otherwise
fn player_ref(trigger: ElementRef) -> Option<PlayerRef> {
    let linked = trigger.value().attr("href").and_then(player_id_from_href);
    match linked {
        Some(id) => Some(PlayerRef::Id(id)),
        None => {
            let name = text_of(trigger);
            (!name.is_empty()).then_some(PlayerRef::Name(name))
        }
    }
}

/// URL out of an inline `background-image: url(...)`
fn style_url(element: ElementRef) -> Option<String> {
    let style = element.value().attr("style")?;
    capture(&CSS_URL, style).map(|url| url.trim().to_string())
}

fn next_element(element: ElementRef) -> Option<ElementRef> {
    element.next_siblings().find_map(ElementRef::wrap)
}

fn has_class(element: ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Two-letter country code from a flag image (`.../flags/es.png`)
fn flag_country(src: &str) -> Option<String> {
    let file = src.rsplit('/').next()?;
    let code: String = file.chars().take(2).collect();
    (code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())).then(|| code.to_uppercase())
}

/// First, middle and last name from the printed parts
fn split_name(parts: &[String]) -> Option<(String, String, String)> {
    match parts {
        [] => None,
        [single] => {
            let mut words = single.split_whitespace();
            let first = words.next()?.to_string();
            Some((first, String::new(), words.collect::<Vec<_>>().join(" ")))
        }
        [first, last] => Some((first.clone(), String::new(), last.clone())),
        [first, middle, last, ..] => Some((first.clone(), middle.clone(), last.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        assert!(PLAYER_LINK.is_some());
        assert!(TOURNAMENT_LINK.is_some());
        assert!(CSS_URL.is_some());
    }

    #[test]
    fn test_ids_from_links() {
        assert_eq!(
            player_id_from_href("https://www.worldpadeltour.com/jugadores/miguel-lamperti"),
            Some("miguel-lamperti".to_string())
        );
        assert_eq!(
            player_id_from_href("/en/players/ari-sanchez?x=1"),
            Some("ari-sanchez".to_string())
        );
        assert_eq!(
            tournament_id_from_href("https://www.worldpadeltour.com/en/tournaments/swedish-padel-open-2022"),
            Some("swedish-padel-open-2022".to_string())
        );
        assert_eq!(player_id_from_href(""), None);
    }

    #[test]
    fn test_flag_country() {
        assert_eq!(
            flag_country("https://www.worldpadeltour.com/media/images/flags/es.png"),
            Some("ES".to_string())
        );
        assert_eq!(flag_country("https://example.com/"), None);
    }

    #[test]
    fn test_split_name() {
        let parts = |p: &[&str]| p.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            split_name(&parts(&["Juan", "Lebrón", "Chincoa"])),
            Some(("Juan".into(), "Lebrón".into(), "Chincoa".into()))
        );
        assert_eq!(
            split_name(&parts(&["Miguel Lamperti"])),
            Some(("Miguel".into(), String::new(), "Lamperti".into()))
        );
        assert_eq!(split_name(&[]), None);
    }
}

use crate::domain::{Phase, PlayerCategory};
use crate::http::FetchRequest;

pub const DEFAULT_BASE_URL: &str = "https://www.worldpadeltour.com";
/// Oldest season the tournament search serves
pub const FIRST_YEAR: i32 = 2016;

const RACE_PATH: &str = "en/race2021";
const LANGUAGE: &str = "en";

/// Requests for every page type of the World Padel Tour site
#[derive(Debug, Clone)]
pub struct WptEndpoints {
    base_url: String,
}

impl Default for WptEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl WptEndpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One section of the ranking listing; the envelope carries the male
    /// fragment first, then the female one
    pub fn ranking(&self, section: usize) -> FetchRequest {
        FetchRequest::post(self.url("info-ranking"))
            .field("lang", LANGUAGE)
            .field("section_data[]", "filtro")
            .field("section_data[]", "todos")
            .field("section_data[]", section.to_string())
    }

    pub fn race(&self) -> FetchRequest {
        FetchRequest::get(self.url(RACE_PATH))
    }

    pub fn profile(&self, player_id: &str) -> FetchRequest {
        FetchRequest::get(self.url(&format!("en/players/{}", player_id)))
    }

    pub fn tournament_list(&self, year: i32) -> FetchRequest {
        FetchRequest::post(self.url(&format!("search-torneos/-/{}", year))).field("lang", LANGUAGE)
    }

    pub fn tournament_info(&self, tournament_id: &str) -> FetchRequest {
        self.tournament_tab(tournament_id, "info")
    }

    pub fn registrations(&self, tournament_id: &str) -> FetchRequest {
        self.tournament_tab(tournament_id, "registrations")
    }

    pub fn phases(&self, tournament_id: &str) -> FetchRequest {
        self.tournament_tab(tournament_id, "results")
    }

    /// Results of one phase, optionally narrowed to one category
    pub fn results(&self, tournament_id: &str, phase: Phase, category: Option<PlayerCategory>) -> FetchRequest {
        let request = self
            .tournament_tab(tournament_id, "results")
            .field("section_data[1][filter]", "phase")
            .field("section_data[1][data]", phase.filter_label());

        match category {
            Some(category) => request
                .field("section_data[3][filter]", "category")
                .field("section_data[3][data]", category.filter_label()),
            None => request,
        }
    }

    fn tournament_tab(&self, tournament_id: &str, tab: &str) -> FetchRequest {
        FetchRequest::post(self.url(&format!("info-torneos/{}", tournament_id)))
            .field("lang", LANGUAGE)
            .field("selected_tab", tab)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

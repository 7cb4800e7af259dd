use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type PlayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerCategory {
    Male,
    Female,
}

impl PlayerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerCategory::Male => "male",
            PlayerCategory::Female => "female",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" => Some(PlayerCategory::Male),
            "female" => Some(PlayerCategory::Female),
            _ => None,
        }
    }

    /// Label the results filter expects
    pub fn filter_label(&self) -> &'static str {
        match self {
            PlayerCategory::Male => "Masculino",
            PlayerCategory::Female => "Femenino",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourtPosition {
    Left,
    Right,
}

impl CourtPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourtPosition::Left => "left",
            CourtPosition::Right => "right",
        }
    }

    /// "drive" plays on the right, "revés" on the left
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "drive" | "right" => Some(CourtPosition::Right),
            "revés" | "reves" | "backhand" | "left" => Some(CourtPosition::Left),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentPositions {
    pub winner: Option<u32>,
    pub finals: Option<u32>,
    pub semis: Option<u32>,
    pub quarters: Option<u32>,
    pub round_of_eight: Option<u32>,
    pub round_of_sixteen: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub year: i32,
    pub matches_played: Option<u32>,
    pub matches_won: Option<u32>,
    pub positions: TournamentPositions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceStats {
    pub ranking: Option<u32>,
    pub points: Option<u32>,
}

/// Partial record from the ranking listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerListing {
    pub id: PlayerId,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub category: PlayerCategory,
}

/// Fields read from a profile page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerDetail {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub ranking: Option<u32>,
    pub score: Option<u32>,
    pub country: Option<String>,
    pub profile_image_url: Option<String>,
    pub image_urls: Vec<String>,
    pub current_partner: Option<PlayerId>,
    pub court_position: Option<CourtPosition>,
    pub birthplace: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub height: Option<u32>,
    pub hometown: Option<String>,
    pub total_matches_played: Option<u32>,
    pub total_matches_won: Option<u32>,
    pub consecutive_wins: Option<u32>,
    pub yearly_stats: BTreeMap<i32, PlayerStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub category: Option<PlayerCategory>,
    pub ranking: Option<u32>,
    pub score: Option<u32>,
    pub country: Option<String>,
    pub profile_image_url: Option<String>,
    pub image_urls: Vec<String>,
    pub current_partner: Option<PlayerId>,
    pub court_position: Option<CourtPosition>,
    pub birthplace: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub height: Option<u32>,
    pub hometown: Option<String>,
    pub total_matches_played: Option<u32>,
    pub total_matches_won: Option<u32>,
    pub consecutive_wins: Option<u32>,
    pub yearly_stats: BTreeMap<i32, PlayerStats>,
    pub race_stats: Option<RaceStats>,
}

impl Player {
    /// Merge listing-derived fields (names, category) with the profile page and
    /// the race standing. Listing names win over the profile's.
    pub fn assemble(
        id: PlayerId,
        listing: Option<PlayerListing>,
        detail: PlayerDetail,
        race_stats: Option<RaceStats>,
    ) -> Self {
        let (first_name, middle_name, last_name, category) = match listing {
            Some(listing) => (
                listing.first_name,
                listing.middle_name,
                listing.last_name,
                Some(listing.category),
            ),
            None => (
                detail.first_name.unwrap_or_default(),
                detail.middle_name.unwrap_or_default(),
                detail.last_name.unwrap_or_default(),
                None,
            ),
        };

        Self {
            id,
            first_name,
            middle_name,
            last_name,
            category,
            ranking: detail.ranking,
            score: detail.score,
            country: detail.country,
            profile_image_url: detail.profile_image_url,
            image_urls: detail.image_urls,
            current_partner: detail.current_partner,
            court_position: detail.court_position,
            birthplace: detail.birthplace,
            birthdate: detail.birthdate,
            height: detail.height,
            hometown: detail.hometown,
            total_matches_played: detail.total_matches_played,
            total_matches_won: detail.total_matches_won,
            consecutive_wins: detail.consecutive_wins,
            yearly_stats: detail.yearly_stats,
            race_stats,
        }
    }

    pub fn display_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::players::{PlayerCategory, PlayerId};

pub type TournamentId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentCategory {
    Male,
    Female,
    Both,
}

impl TournamentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentCategory::Male => "male",
            TournamentCategory::Female => "female",
            TournamentCategory::Both => "both",
        }
    }

    /// Category filters to request per results page; `None` means unfiltered
    pub fn result_splits(&self) -> Vec<Option<PlayerCategory>> {
        match self {
            TournamentCategory::Both => vec![Some(PlayerCategory::Male), Some(PlayerCategory::Female)],
            _ => vec![None],
        }
    }

    /// Category of matches fetched without a filter
    pub fn single(&self) -> PlayerCategory {
        match self {
            TournamentCategory::Female => PlayerCategory::Female,
            _ => PlayerCategory::Male,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentType {
    Open,
    Master,
    MasterFinal,
    Challenger,
    Exhibition,
    Unknown,
}

impl TournamentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentType::Open => "open",
            TournamentType::Master => "master",
            TournamentType::MasterFinal => "masterfinal",
            TournamentType::Challenger => "challenger",
            TournamentType::Exhibition => "exhibition",
            TournamentType::Unknown => "unknown",
        }
    }

    /// Classify a listing tag such as "MASTER-FINAL" or "WPT OPEN"
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_uppercase();
        if tag.contains("MASTER-FINAL") || tag.contains("MASTER FINAL") {
            TournamentType::MasterFinal
        } else if tag.contains("MASTER") {
            TournamentType::Master
        } else if tag.contains("OPEN") {
            TournamentType::Open
        } else if tag.contains("CHALLENGER") {
            TournamentType::Challenger
        } else if tag.contains("EXHIBITION") {
            TournamentType::Exhibition
        } else {
            TournamentType::Unknown
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    MainDraw,
    PreQualy,
    Qualy,
    LocalQualy,
    FinalQualy,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::MainDraw => "main_draw",
            Phase::PreQualy => "pre_qualy",
            Phase::Qualy => "qualy",
            Phase::LocalQualy => "local_qualy",
            Phase::FinalQualy => "final_qualy",
        }
    }

    /// Parse a phase option label ("Main draw", "pre qualy", "final_qualy")
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "main_draw" => Some(Phase::MainDraw),
            "pre_qualy" => Some(Phase::PreQualy),
            "qualy" => Some(Phase::Qualy),
            "local_qualy" => Some(Phase::LocalQualy),
            "final_qualy" => Some(Phase::FinalQualy),
            _ => None,
        }
    }

    /// Value the results filter expects ("main draw")
    pub fn filter_label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn is_main_draw(&self) -> bool {
        matches!(self, Phase::MainDraw)
    }
}

/// Bracket round. Pre-draw phases number their rounds, the main draw names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Round {
    Pre(u8),
    Final,
    Semi,
    Quarter,
    RoundOfEight,
    RoundOfSixteen,
}

pub const MAX_PRE_ROUND: u8 = 6;

impl Round {
    pub fn label(&self) -> String {
        match self {
            Round::Pre(n) => n.to_string(),
            Round::Final => "final".to_string(),
            Round::Semi => "semi".to_string(),
            Round::Quarter => "quarter".to_string(),
            Round::RoundOfEight => "roundOfEight".to_string(),
            Round::RoundOfSixteen => "roundOfSixteen".to_string(),
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<Round> for String {
    fn from(round: Round) -> Self {
        round.label()
    }
}

impl TryFrom<String> for Round {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "final" => Ok(Round::Final),
            "semi" => Ok(Round::Semi),
            "quarter" => Ok(Round::Quarter),
            "roundOfEight" => Ok(Round::RoundOfEight),
            "roundOfSixteen" => Ok(Round::RoundOfSixteen),
            other => match other.parse::<u8>() {
                Ok(n) if (1..=MAX_PRE_ROUND).contains(&n) => Ok(Round::Pre(n)),
                _ => Err(format!("unknown round '{}'", other)),
            },
        }
    }
}

/// A roster slot: a known player profile, or the raw name when the site has no link
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRef {
    Id(PlayerId),
    Name(String),
}

impl PlayerRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            PlayerRef::Id(id) => Some(id),
            PlayerRef::Name(_) => None,
        }
    }

    /// Identity used by the store for team membership
    pub fn key(&self) -> &str {
        match self {
            PlayerRef::Id(id) => id,
            PlayerRef::Name(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetResult {
    pub first: u32,
    pub second: u32,
    pub tie_break: Option<u32>,
}

impl SetResult {
    pub fn new(first: u32, second: u32) -> Self {
        Self {
            first,
            second,
            tie_break: None,
        }
    }

    pub fn with_tie_break(mut self, tie_break: u32) -> Self {
        self.tie_break = Some(tie_break);
        self
    }

    pub fn as_vec(&self) -> Vec<u32> {
        let mut scores = vec![self.first, self.second];
        scores.extend(self.tie_break);
        scores
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchKey {
    pub phase: Phase,
    pub round: Round,
    pub category: PlayerCategory,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub phase: Phase,
    pub round: Round,
    /// Position within its round block, from 0
    pub sequence: u32,
    pub category: PlayerCategory,
    pub first_team: [PlayerRef; 2],
    pub second_team: [PlayerRef; 2],
    pub results: Vec<SetResult>,
}

impl Match {
    pub fn key(&self) -> MatchKey {
        MatchKey {
            phase: self.phase,
            round: self.round,
            category: self.category,
            sequence: self.sequence,
        }
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerRef> {
        self.first_team.iter().chain(self.second_team.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredTeam {
    pub players: [PlayerRef; 2],
    pub category: PlayerCategory,
}

/// Partial record from the yearly tournament listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentListing {
    pub id: TournamentId,
    pub page_url: String,
    pub name: String,
    /// `None` when the year cannot be told from the name or dates
    pub year: Option<i32>,
    pub place: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub category: TournamentCategory,
    pub kind: TournamentType,
    pub poster_url: Option<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentGeneral {
    pub referees: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    #[serde(flatten)]
    pub listing: TournamentListing,
    pub referees: Option<Vec<String>>,
    pub registered_teams: Option<Vec<RegisteredTeam>>,
    pub matches: Vec<Match>,
}

impl Tournament {
    /// Combine the listing record with the detail fetches. Matches sharing a
    /// key collapse to the last one seen.
    pub fn assemble(
        listing: TournamentListing,
        general: TournamentGeneral,
        registered_teams: Option<Vec<RegisteredTeam>>,
        matches: Vec<Match>,
    ) -> Self {
        let keyed: BTreeMap<MatchKey, Match> = matches.into_iter().map(|m| (m.key(), m)).collect();

        Self {
            listing,
            referees: general.referees,
            registered_teams,
            matches: keyed.into_values().collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.listing.id
    }

    /// Every player profile referenced by the rosters and matches
    pub fn player_ids(&self) -> BTreeSet<PlayerId> {
        let registered = self
            .registered_teams
            .iter()
            .flatten()
            .flat_map(|team| team.players.iter());
        let playing = self.matches.iter().flat_map(|m| m.players());

        registered
            .chain(playing)
            .filter_map(|player| player.id())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> TournamentListing {
        TournamentListing {
            id: "t1".into(),
            page_url: "https://example.com/en/tournaments/t1".into(),
            name: "T1 Open 2022".into(),
            year: Some(2022),
            place: "Madrid".into(),
            date_from: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2022, 1, 9).unwrap(),
            category: TournamentCategory::Both,
            kind: TournamentType::Open,
            poster_url: None,
            images: vec![],
        }
    }

    fn final_match(sequence: u32, category: PlayerCategory) -> Match {
        Match {
            phase: Phase::MainDraw,
            round: Round::Final,
            sequence,
            category,
            first_team: [PlayerRef::Id("a".into()), PlayerRef::Id("b".into())],
            second_team: [PlayerRef::Id("c".into()), PlayerRef::Name("Dee".into())],
            results: vec![SetResult::new(6, 4), SetResult::new(6, 3)],
        }
    }

    #[test]
    fn test_round_labels_round_trip() {
        for round in [Round::Pre(1), Round::Pre(6), Round::Final, Round::RoundOfEight] {
            let label: String = round.into();
            assert_eq!(Round::try_from(label).unwrap(), round);
        }
        assert!(Round::try_from("7".to_string()).is_err());
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(Phase::parse("Main draw"), Some(Phase::MainDraw));
        assert_eq!(Phase::parse("Final Qualy"), Some(Phase::FinalQualy));
        assert_eq!(Phase::parse("All"), None);
        assert_eq!(Phase::MainDraw.filter_label(), "main draw");
    }

    #[test]
    fn test_tournament_type_from_tag() {
        assert_eq!(TournamentType::from_tag("MASTER-FINAL"), TournamentType::MasterFinal);
        assert_eq!(TournamentType::from_tag("wpt master"), TournamentType::Master);
        assert_eq!(TournamentType::from_tag("OPEN"), TournamentType::Open);
        assert_eq!(TournamentType::from_tag("???"), TournamentType::Unknown);
    }

    #[test]
    fn test_male_and_female_finals_do_not_collide() {
        let tournament = Tournament::assemble(
            listing(),
            TournamentGeneral::default(),
            None,
            vec![
                final_match(0, PlayerCategory::Male),
                final_match(0, PlayerCategory::Female),
                final_match(0, PlayerCategory::Male),
            ],
        );

        assert_eq!(tournament.matches.len(), 2);
    }

    #[test]
    fn test_player_ids_skip_raw_names() {
        let tournament = Tournament::assemble(
            listing(),
            TournamentGeneral::default(),
            Some(vec![RegisteredTeam {
                players: [PlayerRef::Id("e".into()), PlayerRef::Id("a".into())],
                category: PlayerCategory::Male,
            }]),
            vec![final_match(0, PlayerCategory::Male)],
        );

        let ids: Vec<_> = tournament.player_ids().into_iter().collect();
        assert_eq!(ids, vec!["a", "b", "c", "e"]);
    }

    #[test]
    fn test_set_result_as_vec() {
        assert_eq!(SetResult::new(7, 6).with_tie_break(10).as_vec(), vec![7, 6, 10]);
        assert_eq!(SetResult::new(6, 4).as_vec(), vec![6, 4]);
    }
}

//! Turning fetched documents into typed records.
//!
//! Every page type has one [`Extractor`]. Extractors are pure: they read the
//! document and the context they are handed, nothing else. Pages listing many
//! records return a [`Batch`] so that one malformed card never costs its
//! siblings.

mod batch;
pub mod wpt;

use std::sync::Arc;

use crate::domain::{
    Phase, PlayerCategory, PlayerDetail, PlayerId, PlayerListing, PlayerRef, RaceStats, RegisteredTeam,
    TournamentGeneral, TournamentListing,
};
use crate::errors::ExtractionFailure;
use crate::http::Document;

pub use batch::Batch;

pub trait Extractor: Send + Sync {
    type Context;
    type Output;

    fn extract(&self, document: &Document, context: &Self::Context) -> Result<Self::Output, ExtractionFailure>;
}

/// What the profile extractor already knows about the player
#[derive(Debug, Clone)]
pub struct ProfileContext {
    pub id: PlayerId,
    pub listing: Option<PlayerListing>,
}

#[derive(Debug, Clone, Copy)]
pub struct ResultsContext {
    pub phase: Phase,
    pub category: PlayerCategory,
}

/// One match row as printed on the results page, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatchRow {
    pub score_line: String,
    pub players: Vec<PlayerRef>,
}

/// A round heading and the match rows printed under it
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBlock {
    pub heading: String,
    pub rows: Vec<Result<RawMatchRow, ExtractionFailure>>,
}

pub type RankingExtractor = dyn Extractor<Context = PlayerCategory, Output = Batch<PlayerListing>>;
pub type RaceExtractor = dyn Extractor<Context = (), Output = Batch<(PlayerId, RaceStats)>>;
pub type ProfileExtractor = dyn Extractor<Context = ProfileContext, Output = PlayerDetail>;
pub type TournamentListExtractor = dyn Extractor<Context = i32, Output = Batch<TournamentListing>>;
pub type InfoExtractor = dyn Extractor<Context = (), Output = TournamentGeneral>;
pub type RegistrationsExtractor = dyn Extractor<Context = (), Output = Batch<RegisteredTeam>>;
pub type PhasesExtractor = dyn Extractor<Context = (), Output = Batch<Phase>>;
pub type ResultsExtractor = dyn Extractor<Context = ResultsContext, Output = Vec<ResultBlock>>;

/// One extractor per page type, swappable as a unit or one by one
#[derive(Clone)]
pub struct ExtractorSet {
    pub ranking: Arc<RankingExtractor>,
    pub race: Arc<RaceExtractor>,
    pub profile: Arc<ProfileExtractor>,
    pub tournament_list: Arc<TournamentListExtractor>,
    pub info: Arc<InfoExtractor>,
    pub registrations: Arc<RegistrationsExtractor>,
    pub phases: Arc<PhasesExtractor>,
    pub results: Arc<ResultsExtractor>,
}

impl ExtractorSet {
    /// Extractors for the World Padel Tour site
    pub fn wpt() -> Self {
        Self {
            ranking: Arc::new(wpt::RankingPage),
            race: Arc::new(wpt::RacePage),
            profile: Arc::new(wpt::ProfilePage),
            tournament_list: Arc::new(wpt::TournamentListPage),
            info: Arc::new(wpt::InfoTab),
            registrations: Arc::new(wpt::RegistrationsTab),
            phases: Arc::new(wpt::PhasesTab),
            results: Arc::new(wpt::ResultsTab),
        }
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::wpt()
    }
}

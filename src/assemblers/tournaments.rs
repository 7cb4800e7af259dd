use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Utc};
use log::{debug, error, info, warn};
use std::collections::{BTreeSet, HashSet};

use super::matches::matches_from_blocks;
use super::Assembled;
use crate::api::{WptEndpoints, FIRST_YEAR};
use crate::domain::{
    FetchProgress, Match, Phase, PlayerCategory, RegisteredTeam, Tournament, TournamentCategory, TournamentGeneral,
    TournamentId, TournamentListing,
};
use crate::extract::{Batch, ExtractorSet, ResultsContext};
use crate::http::{Document, FetchRequest, Fetcher};
use crate::staleness::{EntityKind, Ledger, StalenessPolicy};

/// Which tournaments a run looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TournamentScope {
    Ids(Vec<TournamentId>),
    /// Every season from the first one the site serves
    Full,
    CurrentYear,
}

pub struct TournamentAssembler {
    fetcher: Fetcher,
    endpoints: WptEndpoints,
    extractors: ExtractorSet,
    policy: StalenessPolicy,
}

impl TournamentAssembler {
    pub fn new(fetcher: Fetcher, endpoints: WptEndpoints, extractors: ExtractorSet, policy: StalenessPolicy) -> Self {
        Self {
            fetcher,
            endpoints,
            extractors,
            policy,
        }
    }

    pub async fn assemble(&self, scope: &TournamentScope, ledger: &Ledger, now: DateTime<Utc>) -> Assembled<Tournament> {
        let mut assembled = Assembled::default();

        let listings = self.fetch_listings(scope, now.year()).await;
        info!("  → Listed {} tournaments", listings.len());

        let ids = listings.iter().map(|l| l.id.clone());
        let due: HashSet<String> = self
            .policy
            .filter_due(EntityKind::Tournament, ids, ledger, now)
            .into_iter()
            .collect();
        assembled.skipped = listings.len() - due.len();
        info!("  → {} tournaments due, {} final", due.len(), assembled.skipped);

        let mut progress = FetchProgress::new("tournaments", due.len());
        for listing in listings.into_iter().filter(|l| due.contains(&l.id)) {
            let id = listing.id.clone();
            match self.fetch_tournament(listing).await {
                Ok(tournament) => {
                    assembled.items.add(tournament);
                    progress.increment_assembled();
                }
                Err(e) => {
                    error!("Dropping tournament {}: {:#}", id, e);
                    assembled.failed += 1;
                    progress.increment_failed();
                }
            }
        }

        assembled
    }

    // --- Listing ---

    async fn fetch_listings(&self, scope: &TournamentScope, current_year: i32) -> Vec<TournamentListing> {
        let years: Vec<i32> = match scope {
            TournamentScope::Full => (FIRST_YEAR..=current_year).collect(),
            TournamentScope::CurrentYear => vec![current_year],
            // requested tournaments are most likely recent
            TournamentScope::Ids(_) => (FIRST_YEAR..=current_year).rev().collect(),
        };
        let wanted: Option<BTreeSet<&str>> = match scope {
            TournamentScope::Ids(ids) => Some(ids.iter().map(String::as_str).collect()),
            _ => None,
        };

        let mut seen = HashSet::new();
        let mut listings = Vec::new();

        for year in years {
            for listing in self.fetch_year(year).await {
                let in_scope = wanted.as_ref().is_none_or(|w| w.contains(listing.id.as_str()));
                if in_scope && seen.insert(listing.id.clone()) {
                    listings.push(listing);
                }
            }

            if wanted.as_ref().is_some_and(|w| w.len() == seen.len()) {
                break;
            }
        }

        if let Some(wanted) = wanted {
            for id in wanted.iter().filter(|id| !seen.contains(**id)) {
                warn!("Tournament {} is not in any listing, skipping", id);
            }
        }

        listings
    }

    async fn fetch_year(&self, year: i32) -> Vec<TournamentListing> {
        let request = self.endpoints.tournament_list(year);
        let fragments = match self.fetcher.fetch_envelope(&request).await {
            Ok(fragments) => fragments,
            Err(e) if e.is_soft_empty() => {
                debug!("No tournaments listed for {}", year);
                return Vec::new();
            }
            Err(e) => {
                warn!("Tournament listing of {} unavailable: {}", year, e);
                return Vec::new();
            }
        };

        let mut batch = Batch::new();
        for fragment in fragments.iter().filter(|f| !f.is_blank()) {
            match self.extractors.tournament_list.extract(fragment, &year) {
                Ok(records) => batch.extend(records),
                Err(failure) => warn!("Tournament listing of {}: {}", year, failure),
            }
        }
        batch.into_records("tournament listing")
    }

    // --- Detail ---

    async fn fetch_tournament(&self, listing: TournamentListing) -> Result<Tournament> {
        let id = listing.id.clone();
        debug!("Assembling tournament {}", id);

        let general = self.fetch_general(&id).await;
        let registered_teams = self.fetch_registrations(&id).await;
        let phases = self.fetch_phases(&id).await?;

        let mut matches = Vec::new();
        for phase in phases {
            match self.fetch_phase(&listing, phase).await {
                Ok(batch) => matches.extend(batch.into_records("results")),
                Err(e) => warn!("Skipping phase {} of {}: {:#}", phase.as_str(), id, e),
            }
        }

        Ok(Tournament::assemble(listing, general, registered_teams, matches))
    }

    /// Referees are optional
    async fn fetch_general(&self, id: &str) -> TournamentGeneral {
        let result = match self.first_fragment(self.endpoints.tournament_info(id)).await {
            Ok(Some(fragment)) => self.extractors.info.extract(&fragment, &()).map_err(|e| anyhow!(e)),
            Ok(None) => Ok(TournamentGeneral::default()),
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            warn!("General info of {} unavailable: {:#}", id, e);
            TournamentGeneral::default()
        })
    }

    /// Registered teams are optional
    async fn fetch_registrations(&self, id: &str) -> Option<Vec<RegisteredTeam>> {
        let result = match self.first_fragment(self.endpoints.registrations(id)).await {
            Ok(Some(fragment)) => self
                .extractors
                .registrations
                .extract(&fragment, &())
                .map_err(|e| anyhow!(e)),
            Ok(None) => Ok(Batch::new()),
            Err(e) => Err(e),
        };

        match result {
            Ok(batch) => Some(batch.into_records("registrations")),
            Err(e) => {
                warn!("Registered teams of {} unavailable: {:#}", id, e);
                None
            }
        }
    }

    /// The phase list is the primary document: without it the tournament is dropped
    async fn fetch_phases(&self, id: &str) -> Result<Vec<Phase>> {
        match self.first_fragment(self.endpoints.phases(id)).await? {
            Some(fragment) => Ok(self
                .extractors
                .phases
                .extract(&fragment, &())?
                .into_records("result phases")),
            None => Ok(Vec::new()),
        }
    }

    /// A "both" tournament is fetched per category, concurrently
    async fn fetch_phase(&self, listing: &TournamentListing, phase: Phase) -> Result<Batch<Match>> {
        let id = listing.id.as_str();

        if listing.category != TournamentCategory::Both {
            return self.fetch_results(id, phase, None, listing.category.single()).await;
        }

        let (male, female) = tokio::join!(
            self.fetch_results(id, phase, Some(PlayerCategory::Male), PlayerCategory::Male),
            self.fetch_results(id, phase, Some(PlayerCategory::Female), PlayerCategory::Female),
        );

        match (male, female) {
            (Ok(mut male), Ok(female)) => {
                male.extend(female);
                Ok(male)
            }
            (Ok(batch), Err(e)) | (Err(e), Ok(batch)) => {
                warn!("One category of {} {} is missing: {:#}", id, phase.as_str(), e);
                Ok(batch)
            }
            (Err(e), Err(_)) => Err(e),
        }
    }

    async fn fetch_results(
        &self,
        id: &str,
        phase: Phase,
        filter: Option<PlayerCategory>,
        category: PlayerCategory,
    ) -> Result<Batch<Match>> {
        let request = self.endpoints.results(id, phase, filter);
        let fragments = match self.fetcher.fetch_envelope(&request).await {
            Ok(fragments) => fragments,
            Err(e) if e.is_soft_empty() => return Ok(Batch::new()),
            Err(e) => return Err(e.into()),
        };

        let context = ResultsContext { phase, category };
        let mut blocks = Vec::new();
        for fragment in fragments.iter().filter(|f| !f.is_blank()) {
            blocks.extend(self.extractors.results.extract(fragment, &context)?);
        }

        Ok(matches_from_blocks(phase, category, blocks))
    }

    /// First non-blank fragment of a tab; a soft-empty envelope has none
    async fn first_fragment(&self, request: FetchRequest) -> Result<Option<Document>> {
        match self.fetcher.fetch_envelope(&request).await {
            Ok(fragments) => Ok(fragments.into_iter().find(|f| !f.is_blank())),
            Err(e) if e.is_soft_empty() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

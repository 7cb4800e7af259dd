use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::Assembled;
use crate::api::WptEndpoints;
use crate::domain::{FetchProgress, Player, PlayerCategory, PlayerId, PlayerListing, RaceStats};
use crate::extract::{ExtractorSet, ProfileContext};
use crate::http::Fetcher;
use crate::pagination::{PageIterator, PaginationConfig};
use crate::staleness::{EntityKind, Ledger, StalenessPolicy};

/// Ranking sections carry the male fragment first, then the female one
const SECTION_CATEGORIES: [PlayerCategory; 2] = [PlayerCategory::Male, PlayerCategory::Female];

/// Which players a run looks at
#[derive(Debug, Clone, Default)]
pub struct PlayerScope {
    /// Explicitly requested or discovered in tournament rosters
    pub ids: BTreeSet<PlayerId>,
    /// Also take every player of the ranking listing
    pub full_listing: bool,
}

impl PlayerScope {
    pub fn ids<I: IntoIterator<Item = PlayerId>>(ids: I) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            full_listing: false,
        }
    }

    pub fn full_listing() -> Self {
        Self {
            ids: BTreeSet::new(),
            full_listing: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && !self.full_listing
    }
}

pub struct PlayerAssembler {
    fetcher: Fetcher,
    endpoints: WptEndpoints,
    extractors: ExtractorSet,
    policy: StalenessPolicy,
    pagination: PaginationConfig,
    min_score: Option<u32>,
}

impl PlayerAssembler {
    pub fn new(fetcher: Fetcher, endpoints: WptEndpoints, extractors: ExtractorSet, policy: StalenessPolicy) -> Self {
        Self {
            fetcher,
            endpoints,
            extractors,
            policy,
            pagination: PaginationConfig::new(),
            min_score: None,
        }
    }

    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Listing players below this score are left out; requested ids never are
    pub fn with_min_score(mut self, min_score: Option<u32>) -> Self {
        self.min_score = min_score;
        self
    }

    pub async fn assemble(&self, scope: &PlayerScope, ledger: &Ledger, now: DateTime<Utc>) -> Assembled<Player> {
        let mut assembled = Assembled::default();
        if scope.is_empty() {
            info!("  → No players in scope");
            return assembled;
        }

        let requested: BTreeSet<PlayerId> = self
            .policy
            .filter_due(EntityKind::Player, scope.ids.iter().cloned(), ledger, now)
            .into_iter()
            .collect();
        assembled.skipped = scope.ids.len() - requested.len();

        if requested.is_empty() && !scope.full_listing {
            info!("  → All {} requested players are fresh", assembled.skipped);
            return assembled;
        }

        let listings = self.fetch_listing(scope.full_listing, &requested).await;
        info!("  → Ranking listing: {} players", listings.len());

        let listed = listed_ids(scope, &listings);
        let listed_due = self.policy.filter_due(EntityKind::Player, listed.iter().cloned(), ledger, now);
        assembled.skipped += listed.len() - listed_due.len();

        let due: Vec<PlayerId> = requested.into_iter().chain(listed_due).collect();
        info!("  → {} players due, {} fresh", due.len(), assembled.skipped);

        if due.is_empty() {
            return assembled;
        }

        let race = self.fetch_race().await;
        let mut progress = FetchProgress::new("players", due.len());

        for id in due {
            let listing = listings.get(&id).cloned();
            match self.fetch_player(&id, listing, race.get(&id).copied()).await {
                Some(player) if self.is_below_min_score(scope, &player) => {
                    debug!("Player {} is below the minimum score, skipping", id);
                    assembled.skipped += 1;
                    progress.increment_assembled();
                }
                Some(player) => {
                    assembled.items.add(player);
                    progress.increment_assembled();
                }
                None => {
                    assembled.failed += 1;
                    progress.increment_failed();
                }
            }
        }

        assembled
    }

    // --- Listing ---

    /// Pages the ranking until it ends, or until every wanted id has been seen
    /// when the whole listing is not in scope
    async fn fetch_listing(&self, full_listing: bool, wanted: &BTreeSet<PlayerId>) -> BTreeMap<PlayerId, PlayerListing> {
        let mut pages = PageIterator::new(self.pagination.clone());
        let mut listings = BTreeMap::new();

        while !pages.is_done() {
            let section = pages.current_page();
            let request = self.endpoints.ranking(section);

            let fragments = match self.fetcher.fetch_envelope(&request).await {
                Ok(fragments) => fragments,
                Err(e) if e.is_soft_empty() => {
                    debug!("Ranking listing ends at section {}", section);
                    break;
                }
                Err(e) => {
                    warn!("Ranking section {} unavailable, stopping the listing: {}", section, e);
                    break;
                }
            };

            let mut found = 0;
            for (fragment, category) in fragments.iter().zip(SECTION_CATEGORIES) {
                if fragment.is_blank() {
                    continue;
                }
                match self.extractors.ranking.extract(fragment, &category) {
                    Ok(batch) => {
                        for listing in batch.into_records("ranking listing") {
                            found += 1;
                            listings.entry(listing.id.clone()).or_insert(listing);
                        }
                    }
                    Err(failure) => warn!("Ranking section {} ({}): {}", section, category.as_str(), failure),
                }
            }

            pages.advance(found == 0);

            if !full_listing && wanted.iter().all(|id| listings.contains_key(id)) {
                break;
            }
        }

        listings
    }

    // --- Race ---

    /// The race standing is optional: without it players simply carry none
    async fn fetch_race(&self) -> HashMap<PlayerId, RaceStats> {
        let document = match self.fetcher.fetch(&self.endpoints.race()).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Race standing unavailable, continuing without it: {}", e);
                return HashMap::new();
            }
        };

        match self.extractors.race.extract(&document, &()) {
            Ok(batch) => batch.into_records("race standing").into_iter().collect(),
            Err(failure) => {
                warn!("Race standing unreadable, continuing without it: {}", failure);
                HashMap::new()
            }
        }
    }

    // --- Profile ---

    async fn fetch_player(&self, id: &str, listing: Option<PlayerListing>, race: Option<RaceStats>) -> Option<Player> {
        let document = match self.fetcher.fetch(&self.endpoints.profile(id)).await {
            Ok(document) => document,
            Err(e) => {
                error!("Dropping player {}: {}", id, e);
                return None;
            }
        };

        let context = ProfileContext {
            id: id.to_string(),
            listing,
        };
        match self.extractors.profile.extract(&document, &context) {
            Ok(detail) => Some(Player::assemble(context.id, context.listing, detail, race)),
            Err(failure) => {
                error!("Dropping player {}: {}", id, failure);
                None
            }
        }
    }

    fn is_below_min_score(&self, scope: &PlayerScope, player: &Player) -> bool {
        match self.min_score {
            Some(min) if !scope.ids.contains(&player.id) => player.score.unwrap_or(0) < min,
            _ => false,
        }
    }
}

/// Listing players that were not requested, when the whole listing is in scope
fn listed_ids(scope: &PlayerScope, listings: &BTreeMap<PlayerId, PlayerListing>) -> Vec<PlayerId> {
    if !scope.full_listing {
        return Vec::new();
    }
    listings.keys().filter(|id| !scope.ids.contains(*id)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FetchCache;
    use crate::http::testing::ScriptedTransport;
    use crate::http::RetryPolicy;
    use crate::staleness::StalenessRecord;
    use chrono::Duration;
    use std::sync::Arc;

    const BASE: &str = "https://wpt.test";

    const RANKING: &str = r#"<div class="c-trigger" href="/en/players/ana-lopez">
        <p class="c-player-card__name">Ana<br>Lopez</p></div>"#;

    const PROFILE: &str = r#"<div class="c-player">
        <p class="c-player__name">Ana Lopez</p>
        <div class="c-ranking-header">
            <div class="c-ranking-header__data-box"><p class="c-ranking-header__data">4</p></div>
            <div class="c-ranking-header__data-box"><p class="c-ranking-header__data">9000</p></div>
        </div></div>"#;

    fn envelope(fragments: &[&str]) -> String {
        serde_json::json!({ "res": true, "data": fragments }).to_string()
    }

    fn assembler(transport: Arc<ScriptedTransport>) -> PlayerAssembler {
        let fetcher = Fetcher::new(transport, FetchCache::new(), RetryPolicy::new(0, 0));
        PlayerAssembler::new(fetcher, WptEndpoints::new(BASE), ExtractorSet::wpt(), StalenessPolicy::default())
    }

    fn script_ranking(transport: &ScriptedTransport) {
        let url = format!("{}/info-ranking", BASE);
        transport.respond_to(&url, &[("section_data[]", "0")], &envelope(&["", RANKING]));
        transport.respond_to(&url, &[("section_data[]", "1")], &envelope(&["", ""]));
        transport.respond_to(&url, &[("section_data[]", "2")], &envelope(&["", ""]));
    }

    #[tokio::test]
    async fn test_listing_names_merge_with_profile() {
        let transport = Arc::new(ScriptedTransport::new());
        script_ranking(&transport);
        transport.respond(&format!("{}/en/players/ana-lopez", BASE), PROFILE);

        let assembled = assembler(transport.clone())
            .assemble(&PlayerScope::ids(["ana-lopez".to_string()]), &Ledger::new(), Utc::now())
            .await;

        let ana = assembled.items.get("ana-lopez").unwrap();
        assert_eq!(ana.first_name, "Ana");
        assert_eq!(ana.category, Some(PlayerCategory::Female));
        assert_eq!(ana.ranking, Some(4));
        assert_eq!(ana.race_stats, None);
        // all requested ids found on the first section
        assert_eq!(transport.calls(&format!("{}/info-ranking", BASE)), 1);
    }

    #[tokio::test]
    async fn test_fresh_player_is_not_fetched() {
        let transport = Arc::new(ScriptedTransport::new());
        script_ranking(&transport);
        let now = Utc::now();
        let mut ledger = Ledger::new();
        ledger.insert(
            "ana-lopez".to_string(),
            StalenessRecord {
                last_scraped: now - Duration::days(2),
                date_to: None,
            },
        );

        let assembled = assembler(transport.clone())
            .assemble(&PlayerScope::ids(["ana-lopez".to_string()]), &ledger, now)
            .await;

        assert!(assembled.items.is_empty());
        assert_eq!(assembled.skipped, 1);
        assert_eq!(transport.calls(&format!("{}/en/players/ana-lopez", BASE)), 0);
    }

    #[tokio::test]
    async fn test_all_fresh_requested_players_skip_the_listing() {
        let transport = Arc::new(ScriptedTransport::new());
        script_ranking(&transport);
        let now = Utc::now();
        let mut ledger = Ledger::new();
        for id in ["ana-lopez", "not-listed"] {
            ledger.insert(
                id.to_string(),
                StalenessRecord {
                    last_scraped: now - Duration::days(1),
                    date_to: None,
                },
            );
        }

        let scope = PlayerScope::ids(["ana-lopez".to_string(), "not-listed".to_string()]);
        let assembled = assembler(transport.clone()).assemble(&scope, &ledger, now).await;

        assert_eq!(assembled.skipped, 2);
        assert_eq!(transport.calls(&format!("{}/info-ranking", BASE)), 0);
        assert_eq!(transport.calls(&format!("{}/en/players/ana-lopez", BASE)), 0);
    }

    #[tokio::test]
    async fn test_listing_stops_once_due_players_are_found() {
        let transport = Arc::new(ScriptedTransport::new());
        script_ranking(&transport);
        transport.respond(&format!("{}/en/players/ana-lopez", BASE), PROFILE);
        let now = Utc::now();
        let mut ledger = Ledger::new();
        ledger.insert(
            "not-listed".to_string(),
            StalenessRecord {
                last_scraped: now - Duration::days(1),
                date_to: None,
            },
        );

        let scope = PlayerScope::ids(["ana-lopez".to_string(), "not-listed".to_string()]);
        let assembled = assembler(transport.clone()).assemble(&scope, &ledger, now).await;

        assert_eq!(assembled.items.len(), 1);
        assert_eq!(assembled.skipped, 1);
        assert_eq!(transport.calls(&format!("{}/info-ranking", BASE)), 1);
    }

    #[tokio::test]
    async fn test_full_listing_pages_until_two_empty_sections() {
        let transport = Arc::new(ScriptedTransport::new());
        script_ranking(&transport);
        transport.respond(&format!("{}/en/players/ana-lopez", BASE), PROFILE);

        let assembled = assembler(transport.clone())
            .with_min_score(Some(10_000))
            .assemble(&PlayerScope::full_listing(), &Ledger::new(), Utc::now())
            .await;

        assert_eq!(transport.calls(&format!("{}/info-ranking", BASE)), 3);
        assert!(assembled.items.is_empty());
        assert_eq!(assembled.skipped, 1);
    }

    #[tokio::test]
    async fn test_missing_profile_drops_only_that_player() {
        let transport = Arc::new(ScriptedTransport::new());
        script_ranking(&transport);
        transport.respond(&format!("{}/en/players/ana-lopez", BASE), PROFILE);

        let scope = PlayerScope::ids(["ana-lopez".to_string(), "ghost".to_string()]);
        let assembled = assembler(transport).assemble(&scope, &Ledger::new(), Utc::now()).await;

        assert_eq!(assembled.items.len(), 1);
        assert_eq!(assembled.failed, 1);
    }
}

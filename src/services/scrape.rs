use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::api::WptEndpoints;
use crate::assemblers::{Assembled, PlayerAssembler, PlayerScope, TournamentAssembler, TournamentScope};
use crate::cache::{FetchCache, SnapshotStore};
use crate::config::{dev_scope, AppConfig};
use crate::database::{self, ledger, DbPool, Journal};
use crate::domain::{Player, RunSummary, Tournament};
use crate::extract::ExtractorSet;
use crate::http::{Fetcher, HttpTransport, RetryPolicy, Transport};
use crate::pagination::PaginationConfig;
use crate::reconcile::Reconciler;
use crate::staleness::{Ledger, StalenessPolicy};

pub const PLAYERS_SNAPSHOT: &str = "players";
pub const TOURNAMENTS_SNAPSHOT: &str = "tournaments";
pub const PLAYERS_JOURNAL: &str = "playersQuery.sql";
pub const TOURNAMENTS_JOURNAL: &str = "tournamentsQuery.sql";

/// What one scrape run covers
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Every season and the whole ranking listing
    pub full: bool,
    pub tournament_ids: Vec<String>,
    pub player_ids: Vec<String>,
    pub skip_players: bool,
    pub skip_tournaments: bool,
}

pub struct ScrapeService {
    config: AppConfig,
    pool: DbPool,
    transport: Arc<dyn Transport>,
    extractors: ExtractorSet,
}

impl ScrapeService {
    pub fn new(config: AppConfig, pool: DbPool) -> Result<Self> {
        let transport = HttpTransport::new(&config.scraper.user_agent, config.scraper.timeout_secs)?;
        Ok(Self::with_transport(config, pool, Arc::new(transport)))
    }

    pub fn with_transport(config: AppConfig, pool: DbPool, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            pool,
            transport,
            extractors: ExtractorSet::wpt(),
        }
    }

    pub async fn run(&self, options: &ScrapeOptions) -> Result<RunSummary> {
        self.run_at(options, Utc::now()).await
    }

    pub async fn run_at(&self, options: &ScrapeOptions, now: DateTime<Utc>) -> Result<RunSummary> {
        info!("=== Starting Scrape ({:?}) ===\n", self.config.mode);

        // The cache lives for this run only
        let fetcher = Fetcher::new(self.transport.clone(), FetchCache::new(), self.retry_policy());
        let (tournament_ledger, player_ledger) = self.load_ledgers()?;

        // Step 1: Tournaments
        let tournaments = if options.skip_tournaments {
            Assembled::default()
        } else {
            info!("Step 1: Assembling tournaments...");
            let scope = self.tournament_scope(options);
            self.tournament_assembler(fetcher.clone())
                .assemble(&scope, &tournament_ledger, now)
                .await
        };
        info!("  → Assembled {} tournaments\n", tournaments.items.len());

        // Step 2: Players, including everyone met in the tournaments
        let players = if options.skip_players {
            Assembled::default()
        } else {
            info!("Step 2: Assembling players...");
            let scope = self.player_scope(options, &tournaments);
            self.player_assembler(fetcher.clone())
                .assemble(&scope, &player_ledger, now)
                .await
        };
        info!("  → Assembled {} players\n", players.items.len());
        info!("  → {} distinct requests served", fetcher.cache().len());

        let tournament_tally = tournaments.tally();
        let player_tally = players.tally();
        let tournaments = tournaments.items.into_vec();
        let players = players.items.into_vec();
        self.save_snapshots(&tournaments, &players)?;

        // Step 3: Commit
        info!("Step 3: Committing to the database...");
        let tournament_journal = Journal::new();
        let player_journal = Journal::new();
        let mut conn = database::get_connection(&self.pool)?;
        let mut summary = Reconciler::new(&mut conn, now).commit_run(
            &tournaments,
            &players,
            &tournament_journal,
            &player_journal,
        )?;
        summary.tournaments.absorb(tournament_tally);
        summary.players.absorb(player_tally);

        self.save_journals(&tournament_journal, &player_journal)?;

        summary.log();
        info!("=== Scrape Complete ===");
        Ok(summary)
    }

    // --- Scope ---

    fn tournament_scope(&self, options: &ScrapeOptions) -> TournamentScope {
        if !options.tournament_ids.is_empty() {
            TournamentScope::Ids(options.tournament_ids.clone())
        } else if self.config.mode.is_development() {
            TournamentScope::Ids(dev_scope().tournament_ids.iter().map(|id| id.to_string()).collect())
        } else if options.full {
            TournamentScope::Full
        } else {
            TournamentScope::CurrentYear
        }
    }

    fn player_scope(&self, options: &ScrapeOptions, tournaments: &Assembled<Tournament>) -> PlayerScope {
        let mut ids: BTreeSet<String> = options.player_ids.iter().cloned().collect();
        for tournament in tournaments.items.iter() {
            ids.extend(tournament.player_ids());
        }

        let development = self.config.mode.is_development();
        if development && options.player_ids.is_empty() {
            ids.extend(dev_scope().player_ids.iter().map(|id| id.to_string()));
        }

        PlayerScope {
            ids,
            full_listing: options.full && !development,
        }
    }

    // --- Construction Helpers ---

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.config.scraper.retries, self.config.scraper.retry_delay_ms)
    }

    fn staleness_policy(&self) -> StalenessPolicy {
        StalenessPolicy::new(self.config.player_cooldown_days)
    }

    fn endpoints(&self) -> WptEndpoints {
        WptEndpoints::new(&self.config.scraper.base_url)
    }

    fn tournament_assembler(&self, fetcher: Fetcher) -> TournamentAssembler {
        TournamentAssembler::new(fetcher, self.endpoints(), self.extractors.clone(), self.staleness_policy())
    }

    fn player_assembler(&self, fetcher: Fetcher) -> PlayerAssembler {
        let max_pages = self
            .config
            .mode
            .is_development()
            .then(|| dev_scope().max_listing_pages);

        PlayerAssembler::new(fetcher, self.endpoints(), self.extractors.clone(), self.staleness_policy())
            .with_pagination(PaginationConfig::new().with_optional_max_pages(max_pages))
            .with_min_score(self.config.player_min_score)
    }

    // --- Storage ---

    fn load_ledgers(&self) -> Result<(Ledger, Ledger)> {
        let conn = database::get_connection(&self.pool)?;
        database::ensure_schema(&conn)?;
        Ok((ledger::tournament_ledger(&conn)?, ledger::player_ledger(&conn)?))
    }

    fn save_snapshots(&self, tournaments: &[Tournament], players: &[Player]) -> Result<()> {
        if !self.config.mode.is_development() {
            return Ok(());
        }
        let store = SnapshotStore::new(&self.config.snapshot_dir)?;
        store.save(TOURNAMENTS_SNAPSHOT, &tournaments)?;
        store.save(PLAYERS_SNAPSHOT, &players)?;
        Ok(())
    }

    fn save_journals(&self, tournaments: &Journal, players: &Journal) -> Result<()> {
        if !self.config.mode.is_development() {
            return Ok(());
        }
        let store = SnapshotStore::new(&self.config.snapshot_dir)?;
        for (name, journal) in [(TOURNAMENTS_JOURNAL, tournaments), (PLAYERS_JOURNAL, players)] {
            let path = store.write_text(name, &journal.render())?;
            info!("  → Wrote {} statements to {}", journal.len(), path.display());
        }
        Ok(())
    }
}

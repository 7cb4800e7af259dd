use anyhow::{Context, Result};
use chrono::Utc;
use log::info;

use super::scrape::{PLAYERS_SNAPSHOT, TOURNAMENTS_SNAPSHOT};
use crate::cache::SnapshotStore;
use crate::config::AppConfig;
use crate::database::{self, DbPool, Journal};
use crate::domain::{Player, RunSummary, Tournament};
use crate::reconcile::Reconciler;

/// Commits the aggregates saved by a development scrape, without the network
pub struct ReplayService {
    pool: DbPool,
    snapshots: SnapshotStore,
}

impl ReplayService {
    pub fn new(config: &AppConfig, pool: DbPool) -> Result<Self> {
        Ok(Self {
            pool,
            snapshots: SnapshotStore::new(&config.snapshot_dir)?,
        })
    }

    pub fn run(&self) -> Result<RunSummary> {
        info!("=== Starting Snapshot Replay ===\n");

        // Step 1: Load snapshots
        let tournaments: Vec<Tournament> = self
            .snapshots
            .load(TOURNAMENTS_SNAPSHOT)?
            .context("No tournaments snapshot, run a development scrape first")?;
        let players: Vec<Player> = self
            .snapshots
            .load(PLAYERS_SNAPSHOT)?
            .context("No players snapshot, run a development scrape first")?;
        info!("  → Loaded {} tournaments and {} players\n", tournaments.len(), players.len());

        // Step 2: Commit
        let mut conn = database::get_connection(&self.pool)?;
        database::ensure_schema(&conn)?;
        let journal = Journal::new();
        let summary = Reconciler::new(&mut conn, Utc::now()).commit_run(&tournaments, &players, &journal, &journal)?;

        summary.log();
        info!("=== Replay Complete ===");
        Ok(summary)
    }
}

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::debug;
use std::collections::HashMap;

pub const DEFAULT_PLAYER_COOLDOWN_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Tournament,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Tournament => "tournament",
        }
    }
}

/// When an entity was last written, and for tournaments when it ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessRecord {
    pub last_scraped: DateTime<Utc>,
    pub date_to: Option<NaiveDate>,
}

/// Last-scrape records of one entity kind, keyed by id
pub type Ledger = HashMap<String, StalenessRecord>;

#[derive(Debug, Clone, Copy)]
pub struct StalenessPolicy {
    player_cooldown: Duration,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYER_COOLDOWN_DAYS)
    }
}

impl StalenessPolicy {
    pub fn new(player_cooldown_days: i64) -> Self {
        Self {
            player_cooldown: Duration::days(player_cooldown_days),
        }
    }

    pub fn should_scrape(
        &self,
        kind: EntityKind,
        id: &str,
        record: Option<&StalenessRecord>,
        now: DateTime<Utc>,
    ) -> bool {
        let decision = match record {
            None => true,
            Some(record) => match kind {
                EntityKind::Player => !self.within_cooldown(record, now),
                EntityKind::Tournament => !is_final(record, now),
            },
        };

        debug!(
            "Staleness: {} {} {}",
            kind.as_str(),
            id,
            if decision { "is due" } else { "is fresh, skipping" }
        );
        decision
    }

    /// Keep the ids that are due, in their original order
    pub fn filter_due<I>(&self, kind: EntityKind, ids: I, ledger: &Ledger, now: DateTime<Utc>) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        ids.into_iter()
            .filter(|id| self.should_scrape(kind, id, ledger.get(id), now))
            .collect()
    }

    fn within_cooldown(&self, record: &StalenessRecord, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(record.last_scraped) < self.player_cooldown
    }
}

/// A tournament is frozen once it has ended and was scraped on a later day
fn is_final(record: &StalenessRecord, now: DateTime<Utc>) -> bool {
    match record.date_to {
        Some(date_to) => now.date_naive() > date_to && record.last_scraped.date_naive() > date_to,
        None => false,
    }
}

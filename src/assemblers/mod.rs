//! Multi-page fetch sequences that build complete aggregates.

mod matches;
mod players;
mod tournaments;

use crate::domain::{Collection, Identified, Tally};

pub use matches::matches_from_blocks;
pub use players::{PlayerAssembler, PlayerScope};
pub use tournaments::{TournamentAssembler, TournamentScope};

/// Aggregates assembled in one pass, with the ids that were not
pub struct Assembled<T: Identified> {
    pub items: Collection<T>,
    pub skipped: usize,
    pub failed: usize,
}

impl<T: Identified> Assembled<T> {
    pub fn tally(&self) -> Tally {
        Tally {
            committed: 0,
            skipped: self.skipped,
            failed: self.failed,
        }
    }
}

impl<T: Identified> Default for Assembled<T> {
    fn default() -> Self {
        Self {
            items: Collection::new(),
            skipped: 0,
            failed: 0,
        }
    }
}

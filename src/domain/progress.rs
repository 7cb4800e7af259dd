use colored::Colorize;
use log::info;
use std::fmt;

/// Track progress of entity assembly
pub struct FetchProgress {
    label: &'static str,
    total: usize,
    assembled: usize,
    failed: usize,
}

impl FetchProgress {
    pub fn new(label: &'static str, total: usize) -> Self {
        Self {
            label,
            total,
            assembled: 0,
            failed: 0,
        }
    }

    pub fn increment_assembled(&mut self) {
        self.assembled += 1;
        self.log_progress();
    }

    pub fn increment_failed(&mut self) {
        self.failed += 1;
        self.log_progress();
    }

    pub fn current_count(&self) -> usize {
        self.assembled + self.failed
    }

    fn log_progress(&self) {
        let current = self.current_count();
        if should_log(current, self.total) {
            info!(
                "  → {} progress: {}/{} ({} assembled, {} failed)",
                self.label, current, self.total, self.assembled, self.failed
            );
        }
    }
}

fn should_log(current: usize, total: usize) -> bool {
    is_milestone(current) || is_complete(current, total)
}

fn is_milestone(count: usize) -> bool {
    count % 10 == 0
}

fn is_complete(current: usize, total: usize) -> bool {
    current == total
}

/// Outcome counts of one entity kind over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub committed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    pub fn absorb(&mut self, other: Tally) {
        self.committed += other.committed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} committed, {} skipped, {} failed",
            self.committed.to_string().green(),
            self.skipped.to_string().yellow(),
            self.failed.to_string().red()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub players: Tally,
    pub tournaments: Tally,
    pub matches: Tally,
}

impl RunSummary {
    pub fn log(&self) {
        info!("{}", "=== Run Summary ===".bold());
        info!("  players:     {}", self.players);
        info!("  tournaments: {}", self.tournaments);
        info!("  matches:     {}", self.matches);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_counts() {
        let mut progress = FetchProgress::new("players", 3);
        progress.increment_assembled();
        progress.increment_failed();
        progress.increment_assembled();
        assert_eq!(progress.current_count(), 3);
    }

    #[test]
    fn test_milestones() {
        assert!(should_log(10, 25));
        assert!(should_log(25, 25));
        assert!(!should_log(7, 25));
    }

    #[test]
    fn test_tally_absorb() {
        let mut tally = Tally {
            committed: 1,
            skipped: 2,
            failed: 0,
        };
        tally.absorb(Tally {
            committed: 3,
            skipped: 0,
            failed: 1,
        });
        assert_eq!(
            tally,
            Tally {
                committed: 4,
                skipped: 2,
                failed: 1
            }
        );
    }
}

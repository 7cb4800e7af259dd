use std::collections::{BTreeSet, HashMap};

use crate::domain::results::{parse_results, split_sets};
use crate::domain::rounds::label_round;
use crate::domain::{Match, Phase, PlayerCategory, PlayerRef, Round};
use crate::errors::ExtractionFailure;
use crate::extract::{Batch, RawMatchRow, ResultBlock};

const PAGE: &str = "results";

/// Turn the result blocks of one phase and category into matches.
///
/// Blocks are labelled in page order; a round spread over several blocks keeps
/// counting its sequence. A bad row costs only its own match.
pub fn matches_from_blocks(phase: Phase, category: PlayerCategory, blocks: Vec<ResultBlock>) -> Batch<Match> {
    let mut batch = Batch::new();
    let mut sequences: HashMap<Round, u32> = HashMap::new();

    for (idx, block) in blocks.into_iter().enumerate() {
        let round = label_round(phase, &block.heading, idx + 1);

        for row in block.rows {
            let sequence = sequences.entry(round).or_insert(0);
            let current = *sequence;
            *sequence += 1;

            batch.push(row.and_then(|row| build_match(phase, round, current, category, row)));
        }
    }

    batch
}

fn build_match(
    phase: Phase,
    round: Round,
    sequence: u32,
    category: PlayerCategory,
    row: RawMatchRow,
) -> Result<Match, ExtractionFailure> {
    let found = row.players.len();
    let [a, b, c, d]: [PlayerRef; 4] = row
        .players
        .try_into()
        .map_err(|_| ExtractionFailure::new(PAGE, format!("expected 4 players, found {}", found)))?;

    validate_teams(&[&a, &b], &[&c, &d])?;

    let results = parse_results(&split_sets(&row.score_line))
        .map_err(|e| ExtractionFailure::new(PAGE, format!("score {:?}: {}", row.score_line, e)))?;

    Ok(Match {
        phase,
        round,
        sequence,
        category,
        first_team: [a, b],
        second_team: [c, d],
        results,
    })
}

fn validate_teams(first: &[&PlayerRef; 2], second: &[&PlayerRef; 2]) -> Result<(), ExtractionFailure> {
    let first_keys: BTreeSet<&str> = first.iter().map(|p| p.key()).collect();
    let second_keys: BTreeSet<&str> = second.iter().map(|p| p.key()).collect();

    if first_keys.len() < 2 || second_keys.len() < 2 {
        return Err(ExtractionFailure::new(PAGE, "a team lists the same player twice"));
    }
    if !first_keys.is_disjoint(&second_keys) {
        return Err(ExtractionFailure::new(PAGE, "both teams share a player"));
    }
    Ok(())
}

use thiserror::Error;

use super::tournaments::SetResult;

pub const MIN_SETS: usize = 2;
pub const MAX_SETS: usize = 3;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResultsError {
    #[error("set '{0}' does not carry two scores")]
    InvalidSet(String),

    #[error("{0} sets played, expected 2 or 3")]
    SetCount(usize),
}

/// Split a score line ("6-4 | 3-6 | 7-6(10)") into set strings
pub fn split_sets(score_line: &str) -> Vec<String> {
    let separator = if score_line.contains('|') { '|' } else { '/' };
    score_line
        .split(separator)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse one set: "6-4", or "7-6(10)" with a tiebreak
pub fn parse_set(raw: &str) -> Result<SetResult, ResultsError> {
    let invalid = || ResultsError::InvalidSet(raw.to_string());
    let trimmed = raw.trim();

    let (scores, tie_break) = match trimmed.strip_suffix(')').and_then(|s| s.rsplit_once('(')) {
        Some((scores, tie_break)) => {
            let tie_break = tie_break.trim().parse::<u32>().map_err(|_| invalid())?;
            (scores, Some(tie_break))
        }
        None => (trimmed, None),
    };

    let parts: Vec<&str> = scores.split('-').map(str::trim).collect();
    let [first, second] = parts.as_slice() else {
        return Err(invalid());
    };

    let first = first.parse::<u32>().map_err(|_| invalid())?;
    let second = second.parse::<u32>().map_err(|_| invalid())?;

    let set = SetResult::new(first, second);
    Ok(match tie_break {
        Some(tb) => set.with_tie_break(tb),
        None => set,
    })
}

/// Parse every set of a match; any bad set invalidates the whole match
pub fn parse_results<S: AsRef<str>>(sets: &[S]) -> Result<Vec<SetResult>, ResultsError> {
    let results = sets
        .iter()
        .map(|s| parse_set(s.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    if !(MIN_SETS..=MAX_SETS).contains(&results.len()) {
        return Err(ResultsError::SetCount(results.len()));
    }

    Ok(results)
}

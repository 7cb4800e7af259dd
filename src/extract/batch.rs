use log::warn;

use crate::errors::ExtractionFailure;

/// Records extracted from one page, plus the ones that could not be
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    pub records: Vec<T>,
    pub failures: Vec<ExtractionFailure>,
}

impl<T> Batch<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Result<T, ExtractionFailure>) {
        match record {
            Ok(record) => self.records.push(record),
            Err(failure) => self.failures.push(failure),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.failures.is_empty()
    }

    pub fn extend(&mut self, other: Batch<T>) {
        self.records.extend(other.records);
        self.failures.extend(other.failures);
    }

    /// Log dropped records and hand back the good ones
    pub fn into_records(self, source: &str) -> Vec<T> {
        for failure in &self.failures {
            warn!("Dropped record from {}: {}", source, failure);
        }
        self.records
    }
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<Result<T, ExtractionFailure>> for Batch<T> {
    fn from_iter<I: IntoIterator<Item = Result<T, ExtractionFailure>>>(iter: I) -> Self {
        let mut batch = Self::new();
        for record in iter {
            batch.push(record);
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_do_not_abort_siblings() {
        let batch: Batch<u32> = vec![
            Ok(1),
            Err(ExtractionFailure::new("ranking", "no link")),
            Ok(3),
        ]
        .into_iter()
        .collect();

        assert_eq!(batch.records, vec![1, 3]);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.into_records("test"), vec![1, 3]);
    }
}

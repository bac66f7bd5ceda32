//! Result collection
//!
//! Outcomes arrive in completion order, which is unconstrained. The collector
//! indexes them by [`RowIndex`] so the finished [`ResultSet`] always iterates
//! in input order.

use crate::source::RowIndex;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::mpsc;
use tracing::warn;

pub mod outcome;

pub use outcome::{FailureCategory, Outcome};

/// Outcome for every processed record, keyed by row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    outcomes: BTreeMap<RowIndex, Outcome>,
}

impl ResultSet {
    pub fn get(&self, row: RowIndex) -> Option<&Outcome> {
        self.outcomes.get(&row)
    }

    /// Entries in ascending row order
    pub fn iter(&self) -> impl Iterator<Item = (RowIndex, &Outcome)> {
        self.outcomes.iter().map(|(row, outcome)| (*row, outcome))
    }

    pub fn rows(&self) -> impl Iterator<Item = RowIndex> + '_ {
        self.outcomes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

/// Merges dispatch outcomes and pre-dispatch failures into a [`ResultSet`]
pub struct ResultCollector {
    expected: BTreeSet<RowIndex>,
    outcomes: BTreeMap<RowIndex, Outcome>,
}

impl ResultCollector {
    /// Collector expecting exactly one outcome for each of `rows`
    pub fn new(rows: impl IntoIterator<Item = RowIndex>) -> Self {
        Self {
            expected: rows.into_iter().collect(),
            outcomes: BTreeMap::new(),
        }
    }

    /// Record an outcome; the first outcome for a row wins
    pub fn record(&mut self, row: RowIndex, outcome: Outcome) {
        if !self.expected.contains(&row) {
            warn!("Ignoring outcome for unexpected {}", row);
            return;
        }
        if self.outcomes.contains_key(&row) {
            warn!("Ignoring duplicate outcome for {}", row);
            return;
        }
        self.outcomes.insert(row, outcome);
    }

    /// Drain a result channel until every sender has been dropped
    pub async fn drain(&mut self, mut rx: mpsc::UnboundedReceiver<(RowIndex, Outcome)>) {
        while let Some((row, outcome)) = rx.recv().await {
            self.record(row, outcome);
        }
    }

    pub fn pending(&self) -> usize {
        self.expected.len() - self.outcomes.len()
    }

    /// Finalize; any expected row still without an outcome gets an internal failure
    pub fn finish(mut self) -> ResultSet {
        for row in &self.expected {
            if !self.outcomes.contains_key(row) {
                warn!("No outcome recorded for {}", row);
                self.outcomes.insert(
                    *row,
                    Outcome::failure(FailureCategory::Internal, "No outcome recorded"),
                );
            }
        }
        ResultSet {
            outcomes: self.outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_follows_row_order_not_arrival_order() {
        let mut collector = ResultCollector::new((0..4).map(RowIndex));
        for i in [3, 1, 0, 2] {
            collector.record(RowIndex(i), Outcome::success(format!("done {i}")));
        }

        let results = collector.finish();
        let descriptions: Vec<String> = results.iter().map(|(_, o)| o.to_string()).collect();
        assert_eq!(descriptions, vec!["done 0", "done 1", "done 2", "done 3"]);
    }

    #[test]
    fn test_first_outcome_wins() {
        let mut collector = ResultCollector::new([RowIndex(0)]);
        collector.record(RowIndex(0), Outcome::success("first"));
        collector.record(
            RowIndex(0),
            Outcome::failure(FailureCategory::Network, "second"),
        );

        let results = collector.finish();
        assert_eq!(results.get(RowIndex(0)), Some(&Outcome::success("first")));
    }

    #[test]
    fn test_unexpected_rows_are_ignored() {
        let mut collector = ResultCollector::new([RowIndex(0)]);
        collector.record(RowIndex(7), Outcome::success("stray"));
        collector.record(RowIndex(0), Outcome::success("ok"));

        let results = collector.finish();
        assert_eq!(results.len(), 1);
        assert!(results.get(RowIndex(7)).is_none());
    }

    #[test]
    fn test_missing_rows_become_internal_failures() {
        let mut collector = ResultCollector::new([RowIndex(0), RowIndex(1)]);
        collector.record(RowIndex(1), Outcome::success("ok"));
        assert_eq!(collector.pending(), 1);

        let results = collector.finish();
        assert_eq!(
            results.get(RowIndex(0)).and_then(Outcome::category),
            Some(FailureCategory::Internal)
        );
        assert_eq!(results.succeeded(), 1);
        assert_eq!(results.failed(), 1);
    }

    #[tokio::test]
    async fn test_drain_collects_until_senders_drop() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut collector = ResultCollector::new((0..3).map(RowIndex));

        let producer = tokio::spawn(async move {
            for i in (0..3).rev() {
                tx.send((RowIndex(i), Outcome::success(i.to_string()))).unwrap();
            }
        });

        collector.drain(rx).await;
        producer.await.unwrap();

        let rows: Vec<RowIndex> = collector.finish().rows().collect();
        assert_eq!(rows, vec![RowIndex(0), RowIndex(1), RowIndex(2)]);
    }
}

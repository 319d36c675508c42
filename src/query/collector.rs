//! Collector implementations for gathering search results.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::index::DocId;

/// A scored document.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Hit {
    /// Matching document.
    pub doc_id: DocId,
    /// Relevance score.
    pub score: f32,
}

impl Hit {
    /// Create a new hit.
    pub fn new(doc_id: DocId, score: f32) -> Self {
        Hit { doc_id, score }
    }

    /// Ranking order: higher score first, lower doc id on ties.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// Heap entry; the worst-ranked hit sits on top.
#[derive(Debug, Clone, Copy)]
struct ScoredDoc(Hit);

impl PartialEq for ScoredDoc {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredDoc {}

impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredDoc {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

/// Keeps the best `max_docs` hits seen so far.
#[derive(Debug)]
pub struct TopDocsCollector {
    max_docs: usize,
    hits: BinaryHeap<ScoredDoc>,
    total_hits: usize,
}

impl TopDocsCollector {
    /// Create a new top docs collector.
    pub fn new(max_docs: usize) -> Self {
        TopDocsCollector {
            max_docs,
            hits: BinaryHeap::with_capacity(max_docs.min(1024)),
            total_hits: 0,
        }
    }

    /// Offer a hit.
    pub fn collect(&mut self, hit: Hit) {
        self.total_hits += 1;
        if self.max_docs == 0 {
            return;
        }

        if self.hits.len() < self.max_docs {
            self.hits.push(ScoredDoc(hit));
        } else if let Some(mut worst) = self.hits.peek_mut() {
            if hit.rank_cmp(&worst.0) == Ordering::Less {
                *worst = ScoredDoc(hit);
            }
        }
    }

    /// Number of hits offered, including those that did not make the cut.
    pub fn total_hits(&self) -> usize {
        self.total_hits
    }

    /// The retained hits in ranking order.
    pub fn into_hits(self) -> Vec<Hit> {
        self.hits
            .into_sorted_vec()
            .into_iter()
            .map(|scored| scored.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_docs_order() {
        let mut collector = TopDocsCollector::new(3);
        collector.collect(Hit::new(0, 1.0));
        collector.collect(Hit::new(1, 3.0));
        collector.collect(Hit::new(2, 2.0));
        collector.collect(Hit::new(3, 3.0));
        collector.collect(Hit::new(4, 0.5));

        assert_eq!(collector.total_hits(), 5);
        let ids: Vec<_> = collector.into_hits().iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_ties_keep_lowest_doc_ids() {
        let mut collector = TopDocsCollector::new(2);
        for doc_id in [5, 1, 3, 0] {
            collector.collect(Hit::new(doc_id, 1.0));
        }
        let ids: Vec<_> = collector.into_hits().iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_zero_capacity() {
        let mut collector = TopDocsCollector::new(0);
        collector.collect(Hit::new(0, 1.0));
        assert_eq!(collector.total_hits(), 1);
        assert!(collector.into_hits().is_empty());
    }
}

// ABOUTME: Interest-block detection: runs the enabled algorithms and merges their candidates.
// ABOUTME: Defines BlockCandidate, per-algorithm Evidence, overlap ratio and the greedy pairwise merge.

//! Block candidate detection.
//!
//! Four independent algorithms propose spans of the word sequence:
//! - `density`: sliding-window words per depth level.
//! - `stability`: sliding-window depth variance.
//! - `clustering`: DBSCAN over `(word index, depth)` points.
//! - `segments`: segmentation at large depth transitions.
//!
//! Their candidates are then merged left to right by [`merge_candidates`].

pub mod clustering;
pub mod density;
pub mod segments;
pub mod stability;

use serde::{Deserialize, Serialize};

use crate::dom::words::WordNode;
use crate::options::{AnalysisOptions, Algorithm};

/// Candidates overlapping more than this are merged.
pub const MERGE_OVERLAP_THRESHOLD: f64 = 0.5;

/// Which part of a transition-bounded partition a segment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// No transitions at all, the segment is the whole document.
    Whole,
    Leading,
    Interior,
    Trailing,
}

/// Why an algorithm proposed a span, with its own score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum Evidence {
    TextDensity {
        score: f64,
        density: f64,
        avg_depth: f64,
    },
    DepthStability {
        score: f64,
        variance: f64,
        avg_depth: f64,
    },
    Clustering {
        score: f64,
        cluster_id: usize,
        size: usize,
    },
    DepthTransition {
        score: f64,
        segment: SegmentKind,
    },
}

impl Evidence {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Evidence::TextDensity { .. } => Algorithm::TextDensity,
            Evidence::DepthStability { .. } => Algorithm::DepthStability,
            Evidence::Clustering { .. } => Algorithm::Clustering,
            Evidence::DepthTransition { .. } => Algorithm::DepthTransition,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            Evidence::TextDensity { score, .. }
            | Evidence::DepthStability { score, .. }
            | Evidence::Clustering { score, .. }
            | Evidence::DepthTransition { score, .. } => *score,
        }
    }

    /// Human-readable explanation.
    pub fn describe(&self) -> String {
        match self {
            Evidence::TextDensity {
                density, avg_depth, ..
            } => format!(
                "text density {:.2} words per depth level at average depth {:.1}",
                density, avg_depth
            ),
            Evidence::DepthStability {
                variance,
                avg_depth,
                ..
            } => format!(
                "stable depth (variance {:.2}) around depth {:.1}",
                variance, avg_depth
            ),
            Evidence::Clustering {
                cluster_id, size, ..
            } => format!("spatial cluster #{} of {} words", cluster_id, size),
            Evidence::DepthTransition { segment, .. } => match segment {
                SegmentKind::Whole => "document has no significant depth transitions".to_string(),
                SegmentKind::Leading => "segment before the first depth transition".to_string(),
                SegmentKind::Interior => "segment between two depth transitions".to_string(),
                SegmentKind::Trailing => "segment after the last depth transition".to_string(),
            },
        }
    }
}

/// A proposed span of words, prior to scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockCandidate {
    pub start: usize,
    /// Inclusive.
    pub end: usize,
    pub score: f64,
    pub evidence: Vec<Evidence>,
}

impl BlockCandidate {
    pub fn new(start: usize, end: usize, evidence: Evidence) -> Self {
        Self {
            start,
            end,
            score: evidence.score(),
            evidence: vec![evidence],
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Distinct contributing algorithms in first-seen order.
    pub fn algorithms(&self) -> Vec<Algorithm> {
        let mut seen = Vec::new();
        for e in &self.evidence {
            let a = e.algorithm();
            if !seen.contains(&a) {
                seen.push(a);
            }
        }
        seen
    }
}

/// Overlap of two inclusive spans relative to the smaller one.
pub fn overlap_ratio(a: (usize, usize), b: (usize, usize)) -> f64 {
    let start = a.0.max(b.0);
    let end = a.1.min(b.1);
    if start > end {
        return 0.0;
    }
    let overlap = (end - start + 1) as f64;
    let smaller = (a.1 - a.0 + 1).min(b.1 - b.0 + 1) as f64;
    overlap / smaller
}

/// Run one algorithm over the word sequence.
pub fn run_algorithm(
    algorithm: Algorithm,
    words: &[WordNode],
    opts: &AnalysisOptions,
) -> Vec<BlockCandidate> {
    match algorithm {
        Algorithm::TextDensity => density::detect(words, &opts.text_density),
        Algorithm::DepthStability => stability::detect(words, &opts.depth_stability),
        Algorithm::Clustering => clustering::detect(words, &opts.clustering),
        Algorithm::DepthTransition => segments::detect(words, &opts.depth_transition),
    }
}

/// Run every enabled algorithm and return their candidates, unmerged, in
/// algorithm order.
pub fn detect_candidates(words: &[WordNode], opts: &AnalysisOptions) -> Vec<BlockCandidate> {
    let mut candidates = Vec::new();
    for algorithm in opts.algorithms.iter() {
        let found = run_algorithm(algorithm, words, opts);
        tracing::debug!(%algorithm, candidates = found.len(), "detector finished");
        candidates.extend(found);
    }
    candidates
}

/// Detect and merge in one step.
pub fn detect(words: &[WordNode], opts: &AnalysisOptions) -> Vec<BlockCandidate> {
    merge_candidates(detect_candidates(words, opts))
}

/// Greedy left-to-right merge.
///
/// Candidates are sorted by start. Each one is compared only with the
/// running accumulator: above [`MERGE_OVERLAP_THRESHOLD`] the spans are
/// unioned and the two scores averaged, otherwise the accumulator is flushed.
/// Long chains of overlaps therefore dilute earlier scores by repeated
/// averaging, and the result depends on order.
pub fn merge_candidates(mut candidates: Vec<BlockCandidate>) -> Vec<BlockCandidate> {
    candidates.sort_by_key(|c| c.start);

    let mut merged = Vec::new();
    let mut iter = candidates.into_iter();
    let mut current = match iter.next() {
        Some(c) => c,
        None => return merged,
    };

    for next in iter {
        if overlap_ratio((current.start, current.end), (next.start, next.end))
            > MERGE_OVERLAP_THRESHOLD
        {
            current.start = current.start.min(next.start);
            current.end = current.end.max(next.end);
            current.score = (current.score + next.score) / 2.0;
            current.evidence.extend(next.evidence);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    merged
}

/// Prefix sums of depth and squared depth for O(1) window statistics.
pub(crate) struct DepthSums {
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl DepthSums {
    pub(crate) fn new(words: &[WordNode]) -> Self {
        let mut sum = Vec::with_capacity(words.len() + 1);
        let mut sum_sq = Vec::with_capacity(words.len() + 1);
        sum.push(0);
        sum_sq.push(0);
        for w in words {
            let d = w.depth as u64;
            sum.push(sum[sum.len() - 1] + d);
            sum_sq.push(sum_sq[sum_sq.len() - 1] + d * d);
        }
        Self { sum, sum_sq }
    }

    /// Mean and population variance of depths in `[start, start + len)`.
    pub(crate) fn window(&self, start: usize, len: usize) -> (f64, f64) {
        let n = len as f64;
        let s = (self.sum[start + len] - self.sum[start]) as f64;
        let sq = (self.sum_sq[start + len] - self.sum_sq[start]) as f64;
        let mean = s / n;
        let variance = (sq / n - mean * mean).max(0.0);
        (mean, variance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::words_at;
    use pretty_assertions::assert_eq;

    fn cand(start: usize, end: usize, score: f64) -> BlockCandidate {
        BlockCandidate::new(
            start,
            end,
            Evidence::TextDensity {
                score,
                density: 1.0,
                avg_depth: 1.0,
            },
        )
    }

    #[test]
    fn test_overlap_ratio() {
        assert_eq!(overlap_ratio((0, 9), (5, 14)), 0.5);
        assert_eq!(overlap_ratio((0, 9), (10, 19)), 0.0);
        assert_eq!(overlap_ratio((0, 99), (10, 19)), 1.0);
        assert_eq!(overlap_ratio((3, 3), (3, 3)), 1.0);
    }

    #[test]
    fn test_merge_unions_spans_and_averages_scores() {
        let merged = merge_candidates(vec![cand(0, 9, 1.0), cand(2, 11, 0.5)]);
        assert_eq!(merged.len(), 1);
        assert_eq!((merged[0].start, merged[0].end), (0, 11));
        assert_eq!(merged[0].score, 0.75);
        assert_eq!(merged[0].evidence.len(), 2);
    }

    #[test]
    fn test_merge_keeps_disjoint_candidates_sorted() {
        let merged = merge_candidates(vec![cand(20, 29, 0.9), cand(0, 9, 0.4)]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].start, 0);
        assert_eq!(merged[1].start, 20);
    }

    #[test]
    fn test_merge_at_exactly_half_overlap_does_not_merge() {
        let merged = merge_candidates(vec![cand(0, 9, 1.0), cand(5, 14, 1.0)]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_chain_dilutes_first_score() {
        // Known behavior: pairwise averaging weights later candidates more.
        let merged = merge_candidates(vec![
            cand(0, 9, 1.0),
            cand(1, 10, 0.0),
            cand(2, 11, 0.0),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].score, 0.25);
    }

    #[test]
    fn test_merge_tracks_contributing_algorithms() {
        let a = cand(0, 20, 0.8);
        let b = BlockCandidate::new(
            0,
            18,
            Evidence::Clustering {
                score: 0.4,
                cluster_id: 0,
                size: 19,
            },
        );
        let merged = merge_candidates(vec![a, b]);
        assert_eq!(
            merged[0].algorithms(),
            vec![Algorithm::TextDensity, Algorithm::Clustering]
        );
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_candidates(Vec::new()).is_empty());
    }

    #[test]
    fn test_detect_candidates_honors_toggles() {
        let words = words_at(&[3; 60]);
        let mut opts = AnalysisOptions::default();
        opts.algorithms = crate::options::EnabledAlgorithms::only(Algorithm::DepthTransition);
        let found = detect_candidates(&words, &opts);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].algorithms(), vec![Algorithm::DepthTransition]);
    }

    #[test]
    fn test_depth_sums_window() {
        let sums = DepthSums::new(&words_at(&[1, 3, 5, 7]));
        assert_eq!(sums.window(0, 4), (4.0, 5.0));
        assert_eq!(sums.window(1, 2), (4.0, 1.0));
    }
}

// ABOUTME: Depth-transition segmentation detector.
// ABOUTME: Splits the word sequence at large depth jumps and proposes each long-enough segment.

use super::{BlockCandidate, Evidence, SegmentKind};
use crate::dom::words::WordNode;
use crate::options::DepthTransitionParams;
use crate::profile::detect_transitions;

/// Segments shorter than this are dropped.
pub const MIN_SEGMENT_WORDS: usize = 10;

const WHOLE_SCORE: f64 = 0.5;
const BOUNDARY_SCORE: f64 = 0.7;
const INTERIOR_SCORE: f64 = 0.8;

impl SegmentKind {
    /// Fixed score per segment position.
    pub fn score(&self) -> f64 {
        match self {
            SegmentKind::Whole => WHOLE_SCORE,
            SegmentKind::Leading | SegmentKind::Trailing => BOUNDARY_SCORE,
            SegmentKind::Interior => INTERIOR_SCORE,
        }
    }
}

pub fn detect(words: &[WordNode], params: &DepthTransitionParams) -> Vec<BlockCandidate> {
    if words.is_empty() {
        return Vec::new();
    }

    let transitions = detect_transitions(words, params.min_magnitude);

    // Segment starts: 0 plus every transition point.
    let mut bounds: Vec<usize> = Vec::with_capacity(transitions.len() + 2);
    bounds.push(0);
    bounds.extend(transitions.iter().map(|t| t.word_index));
    bounds.push(words.len());

    let last = bounds.len() - 2;
    let candidates: Vec<BlockCandidate> = bounds
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1] - pair[0] >= MIN_SEGMENT_WORDS)
        .map(|(i, pair)| {
            let segment = if transitions.is_empty() {
                SegmentKind::Whole
            } else if i == 0 {
                SegmentKind::Leading
            } else if i == last {
                SegmentKind::Trailing
            } else {
                SegmentKind::Interior
            };
            BlockCandidate::new(
                pair[0],
                pair[1] - 1,
                Evidence::DepthTransition {
                    score: segment.score(),
                    segment,
                },
            )
        })
        .collect();

    tracing::trace!(
        transitions = transitions.len(),
        segments = candidates.len(),
        "depth transition segmentation"
    );
    candidates
}

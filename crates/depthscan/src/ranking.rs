// ABOUTME: Final block ranking: threshold filtering, score ordering, overlap removal and truncation.
// ABOUTME: Overlap removal is greedy, keeping higher-scored blocks first.

use std::cmp::Ordering;

use crate::detect::overlap_ratio;
use crate::result::InterestBlock;

/// A block overlapping any kept block by more than this is discarded.
pub const MAX_KEPT_OVERLAP: f64 = 0.3;

/// Drop blocks below the score or word-count thresholds.
pub fn filter_blocks(
    blocks: Vec<InterestBlock>,
    min_score: f64,
    min_size: usize,
) -> Vec<InterestBlock> {
    blocks
        .into_iter()
        .filter(|b| b.score >= min_score && b.stats.word_count >= min_size)
        .collect()
}

/// Sort by descending score. Ties keep their original order.
pub fn sort_blocks(mut blocks: Vec<InterestBlock>) -> Vec<InterestBlock> {
    blocks.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    blocks
}

/// Keep each block only if it overlaps no already-kept block by more than
/// [`MAX_KEPT_OVERLAP`]. Expects blocks in descending score order.
pub fn remove_overlapping_blocks(blocks: Vec<InterestBlock>) -> Vec<InterestBlock> {
    let mut kept: Vec<InterestBlock> = Vec::new();
    for block in blocks {
        let clashes = kept
            .iter()
            .any(|k| overlap_ratio(k.span(), block.span()) > MAX_KEPT_OVERLAP);
        if !clashes {
            kept.push(block);
        }
    }
    kept
}

/// Filter, sort, de-overlap and truncate to `max_blocks`.
pub fn rank_blocks(
    blocks: Vec<InterestBlock>,
    min_score: f64,
    min_size: usize,
    max_blocks: usize,
) -> Vec<InterestBlock> {
    let mut ranked = remove_overlapping_blocks(sort_blocks(filter_blocks(
        blocks, min_score, min_size,
    )));
    ranked.truncate(max_blocks);
    ranked
}

// ABOUTME: Converts merged candidates into interest blocks and scores them.
// ABOUTME: Composite score is a fixed weighted sum of density, stability, semantic, length and diversity.

use std::collections::HashMap;
use std::sync::Arc;

use crate::detect::BlockCandidate;
use crate::dom::words::WordNode;
use crate::dom::{is_semantic_tag, path_tags};
use crate::options::Algorithm;
use crate::profile::mean_and_variance;
use crate::result::{BlockStats, DetectionReason, InterestBlock, WordSpan};

const PREVIEW_WORDS: usize = 20;
const DOMINANT_TAGS: usize = 3;

/// Weights of the five sub-scores. They sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub density: f64,
    pub stability: f64,
    pub semantic: f64,
    pub length: f64,
    pub diversity: f64,
}

pub const SCORE_WEIGHTS: ScoreWeights = ScoreWeights {
    density: 0.25,
    stability: 0.25,
    semantic: 0.20,
    length: 0.15,
    diversity: 0.15,
};

/// Density sub-score, best at 2 words per depth level.
pub fn density_score(density: f64) -> f64 {
    if density < 0.5 {
        0.2
    } else if density <= 2.0 {
        0.2 + (density - 0.5) / 1.5 * 0.8
    } else if density <= 5.0 {
        1.0 - (density - 2.0) / 3.0 * 0.5
    } else {
        0.5
    }
}

pub fn stability_score(variance: f64) -> f64 {
    if variance <= 1.0 {
        1.0
    } else if variance >= 10.0 {
        0.0
    } else {
        1.0 - (variance - 1.0) / 9.0
    }
}

pub fn semantic_score(has_semantic: bool) -> f64 {
    if has_semantic {
        1.0
    } else {
        0.3
    }
}

/// Piecewise-linear over the 20 / 50 / 150 word thresholds.
pub fn length_score(word_count: usize) -> f64 {
    let wc = word_count as f64;
    if wc < 20.0 {
        wc / 20.0 * 0.6
    } else if wc < 50.0 {
        0.6 + (wc - 20.0) / 30.0 * 0.3
    } else if wc < 150.0 {
        0.9 + (wc - 50.0) / 100.0 * 0.1
    } else {
        1.0
    }
}

pub fn diversity_score(tag_diversity: usize) -> f64 {
    match tag_diversity {
        0..=1 => 0.3,
        2..=3 => 0.6,
        4..=6 => 1.0,
        7..=10 => 0.8,
        _ => 0.5,
    }
}

/// Composite quality score in `[0, 1]`.
pub fn score_stats(stats: &BlockStats, depth_variance: f64) -> f64 {
    let w = SCORE_WEIGHTS;
    let score = w.density * density_score(stats.text_density)
        + w.stability * stability_score(depth_variance)
        + w.semantic * semantic_score(stats.has_semantic)
        + w.length * length_score(stats.word_count)
        + w.diversity * diversity_score(stats.tag_diversity);
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

pub fn score_block(block: &InterestBlock) -> f64 {
    score_stats(&block.stats, block.depth_variance)
}

/// Most frequent parent tags, ties broken by first appearance.
fn dominant_tags(words: &[WordNode]) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (i, w) in words.iter().enumerate() {
        counts.entry(w.parent_tag.as_str()).or_insert((0, i)).0 += 1;
    }
    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(tag, (count, first))| (tag, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(DOMINANT_TAGS)
        .map(|(tag, _, _)| tag.to_string())
        .collect()
}

/// True when more than half of the words sit inside a semantic element.
fn semantically_enclosed(words: &[WordNode]) -> bool {
    let inside = words
        .iter()
        .filter(|w| path_tags(&w.dom_path).any(is_semantic_tag))
        .count();
    inside * 2 > words.len()
}

fn preview(words: &[WordNode]) -> String {
    let mut text = words
        .iter()
        .take(PREVIEW_WORDS)
        .map(|w| w.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if words.len() > PREVIEW_WORDS {
        text.push('…');
    }
    text
}

/// One reason per algorithm, keeping the most confident evidence.
fn detection_reasons(candidate: &BlockCandidate) -> Vec<DetectionReason> {
    let mut reasons: Vec<DetectionReason> = Vec::new();
    for evidence in &candidate.evidence {
        let algorithm: Algorithm = evidence.algorithm();
        let confidence = evidence.score();
        match reasons.iter_mut().find(|r| r.algorithm == algorithm) {
            Some(existing) => {
                if confidence > existing.confidence {
                    existing.confidence = confidence;
                    existing.description = evidence.describe();
                }
            }
            None => reasons.push(DetectionReason {
                algorithm,
                confidence,
                description: evidence.describe(),
            }),
        }
    }
    reasons
}

/// Build a fully described block from a candidate span.
///
/// The block's score is the candidate's until [`score_block`] is applied.
pub fn candidate_to_interest_block(
    candidate: &BlockCandidate,
    words: &Arc<[WordNode]>,
) -> InterestBlock {
    let span = WordSpan::new(Arc::clone(words), candidate.start, candidate.end);
    let depths: Vec<usize> = span.iter().map(|w| w.depth).collect();
    let (avg_depth, depth_variance) = mean_and_variance(&depths);

    let word_count = span.len();
    let char_count: usize = span.iter().map(WordNode::char_len).sum();
    let dominant = dominant_tags(&span);
    let has_semantic =
        dominant.iter().any(|t| is_semantic_tag(t)) || semantically_enclosed(&span);
    let tag_diversity = {
        let mut tags: Vec<&str> = span.iter().map(|w| w.parent_tag.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        tags.len()
    };

    let stats = BlockStats {
        word_count,
        char_count,
        text_density: word_count as f64 / if avg_depth == 0.0 { 1.0 } else { avg_depth },
        tag_diversity,
        has_semantic,
        average_word_length: if word_count == 0 {
            0.0
        } else {
            char_count as f64 / word_count as f64
        },
    };

    InterestBlock {
        start_word_index: candidate.start,
        end_word_index: candidate.end,
        start_char: span.first().map_or(0, |w| w.start_offset),
        end_char: span.last().map_or(0, |w| w.end_offset),
        score: candidate.score,
        avg_depth,
        min_depth: depths.iter().copied().min().unwrap_or(0),
        max_depth: depths.iter().copied().max().unwrap_or(0),
        depth_variance,
        stats,
        reasons: detection_reasons(candidate),
        dominant_tags: dominant,
        preview: preview(&span),
        words: span,
    }
}

/// Convert and score every candidate.
pub fn build_scored_blocks(
    candidates: &[BlockCandidate],
    words: &Arc<[WordNode]>,
) -> Vec<InterestBlock> {
    candidates
        .iter()
        .map(|c| {
            let mut block = candidate_to_interest_block(c, words);
            block.score = score_block(&block);
            block
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{Evidence, SegmentKind};
    use crate::profile::tests::words_at;
    use pretty_assertions::assert_eq;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn tagged(depths: &[usize], tags: &[&str], path: &str) -> Arc<[WordNode]> {
        let mut words = words_at(depths);
        for (i, w) in words.iter_mut().enumerate() {
            w.parent_tag = tags[i % tags.len()].to_string();
            w.dom_path = path.to_string();
        }
        words.into()
    }

    fn transition_candidate(start: usize, end: usize) -> BlockCandidate {
        BlockCandidate::new(
            start,
            end,
            Evidence::DepthTransition {
                score: 0.7,
                segment: SegmentKind::Leading,
            },
        )
    }

    #[test]
    fn test_density_score_pieces() {
        assert_eq!(density_score(0.1), 0.2);
        assert!(close(density_score(0.5), 0.2));
        assert!(close(density_score(2.0), 1.0));
        assert!(close(density_score(1.25), 0.6));
        assert!(close(density_score(3.5), 0.75));
        assert!(close(density_score(5.0), 0.5));
        assert_eq!(density_score(50.0), 0.5);
    }

    #[test]
    fn test_stability_score_pieces() {
        assert_eq!(stability_score(0.0), 1.0);
        assert_eq!(stability_score(1.0), 1.0);
        assert!(close(stability_score(5.5), 0.5));
        assert_eq!(stability_score(10.0), 0.0);
        assert_eq!(stability_score(100.0), 0.0);
    }

    #[test]
    fn test_length_score_pieces() {
        assert_eq!(length_score(0), 0.0);
        assert!(close(length_score(10), 0.3));
        assert!(close(length_score(20), 0.6));
        assert!(close(length_score(35), 0.75));
        assert!(close(length_score(50), 0.9));
        assert!(close(length_score(100), 0.95));
        assert_eq!(length_score(150), 1.0);
        assert_eq!(length_score(10_000), 1.0);
    }

    #[test]
    fn test_diversity_buckets() {
        let scores: Vec<f64> = [0, 1, 2, 3, 4, 6, 7, 10, 11, 50]
            .iter()
            .map(|&d| diversity_score(d))
            .collect();
        assert_eq!(scores, vec![0.3, 0.3, 0.6, 0.6, 1.0, 1.0, 0.8, 0.8, 0.5, 0.5]);
    }

    #[test]
    fn test_composite_score_stays_in_unit_interval() {
        for word_count in [0usize, 1, 5, 19, 20, 49, 50, 149, 150, 151, 5000] {
            for avg_depth in [0.0f64, 0.5, 1.0, 3.0, 12.0, 40.0] {
                for variance in [0.0f64, 0.5, 1.0, 4.0, 9.99, 10.0, 250.0, f64::INFINITY] {
                    for tag_diversity in [0usize, 1, 3, 5, 8, 11, 40] {
                        for has_semantic in [false, true] {
                            let stats = BlockStats {
                                word_count,
                                char_count: word_count * 5,
                                text_density: word_count as f64
                                    / if avg_depth == 0.0 { 1.0 } else { avg_depth },
                                tag_diversity,
                                has_semantic,
                                average_word_length: 5.0,
                            };
                            let score = score_stats(&stats, variance);
                            assert!(
                                (0.0..=1.0).contains(&score),
                                "score {} out of range for {:?} / {}",
                                score,
                                stats,
                                variance
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_nan_inputs_score_zero() {
        let stats = BlockStats {
            text_density: f64::NAN,
            ..Default::default()
        };
        assert_eq!(score_stats(&stats, f64::NAN), 0.0);
    }

    #[test]
    fn test_block_span_and_depth_stats() {
        let words = tagged(&[2, 2, 4, 4, 2, 2], &["p"], "html > body > div > p");
        let block = candidate_to_interest_block(&transition_candidate(1, 4), &words);
        assert_eq!(block.span(), (1, 4));
        assert_eq!(block.words.len(), block.end_word_index - block.start_word_index + 1);
        assert_eq!(block.avg_depth, 3.0);
        assert_eq!(block.min_depth, 2);
        assert_eq!(block.max_depth, 4);
        assert_eq!(block.depth_variance, 1.0);
        assert_eq!(block.start_char, words[1].start_offset);
        assert_eq!(block.end_char, words[4].end_offset);
        assert_eq!(block.stats.word_count, 4);
        assert_eq!(block.stats.char_count, 8);
        assert!(close(block.stats.text_density, 4.0 / 3.0));
        assert_eq!(block.stats.average_word_length, 2.0);
        assert!(!block.stats.has_semantic);
    }

    #[test]
    fn test_dominant_tags_and_diversity() {
        let words = tagged(
            &[3; 10],
            &["p", "p", "a", "p", "em", "a", "li", "p", "a", "span"],
            "html > body > div",
        );
        let block = candidate_to_interest_block(&transition_candidate(0, 9), &words);
        assert_eq!(block.dominant_tags, vec!["p", "a", "em"]);
        assert_eq!(block.stats.tag_diversity, 5);
    }

    #[test]
    fn test_semantic_from_dominant_tag() {
        let words = tagged(&[2; 4], &["nav"], "html > body > nav");
        let block = candidate_to_interest_block(&transition_candidate(0, 3), &words);
        assert!(block.stats.has_semantic);
    }

    #[test]
    fn test_semantic_from_enclosing_article() {
        let words = tagged(&[3; 4], &["p"], "html > body > article.post > p");
        let block = candidate_to_interest_block(&transition_candidate(0, 3), &words);
        assert_eq!(block.dominant_tags, vec!["p"]);
        assert!(block.stats.has_semantic);
    }

    #[test]
    fn test_preview_truncates_after_twenty_words() {
        let words = tagged(&[1; 25], &["p"], "html > p");
        let block = candidate_to_interest_block(&transition_candidate(0, 24), &words);
        assert!(block.preview.ends_with('…'));
        assert_eq!(block.preview.trim_end_matches('…').split(' ').count(), 20);

        let short = candidate_to_interest_block(&transition_candidate(0, 4), &words);
        assert_eq!(short.preview, "w0 w1 w2 w3 w4");
    }

    #[test]
    fn test_reasons_collapse_per_algorithm() {
        let mut candidate = transition_candidate(0, 3);
        candidate.evidence.push(Evidence::TextDensity {
            score: 0.4,
            density: 1.0,
            avg_depth: 1.0,
        });
        candidate.evidence.push(Evidence::TextDensity {
            score: 0.9,
            density: 3.0,
            avg_depth: 1.0,
        });
        let words = tagged(&[1; 4], &["p"], "html > p");
        let block = candidate_to_interest_block(&candidate, &words);
        let summary: Vec<(Algorithm, f64)> = block
            .reasons
            .iter()
            .map(|r| (r.algorithm, r.confidence))
            .collect();
        assert_eq!(
            summary,
            vec![(Algorithm::DepthTransition, 0.7), (Algorithm::TextDensity, 0.9)]
        );
        assert!(block.reasons[1].description.contains("3.00"));
    }

    #[test]
    fn test_build_scored_blocks_applies_composite() {
        let words = tagged(&[3; 151], &["p"], "html > body > article > p");
        let blocks = build_scored_blocks(&[transition_candidate(0, 150)], &words);
        // density 0.5, stability 1, semantic 1, length 1, diversity 0.3
        let expected = 0.25 * 0.5 + 0.25 + 0.20 + 0.15 + 0.15 * 0.3;
        assert!(close(blocks[0].score, expected));
    }
}

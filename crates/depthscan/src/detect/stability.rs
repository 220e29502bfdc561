// ABOUTME: Sliding-window depth stability detector.
// ABOUTME: Windows whose depth variance stays under the ceiling become candidates.

use super::{BlockCandidate, DepthSums, Evidence};
use crate::dom::words::WordNode;
use crate::options::DepthStabilityParams;

pub fn detect(words: &[WordNode], params: &DepthStabilityParams) -> Vec<BlockCandidate> {
    let w = params.window_size;
    if w == 0 || words.len() < w {
        return Vec::new();
    }

    let sums = DepthSums::new(words);
    let mut candidates = Vec::new();

    for i in 0..=words.len() - w {
        let (avg_depth, variance) = sums.window(i, w);
        if variance <= params.max_variance {
            let score = (1.0 - variance / (2.0 * params.max_variance)).max(0.0);
            candidates.push(BlockCandidate::new(
                i,
                i + w - 1,
                Evidence::DepthStability {
                    score,
                    variance,
                    avg_depth,
                },
            ));
        }
    }

    tracing::trace!(kept = candidates.len(), "depth stability");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::words_at;

    fn params(window_size: usize, max_variance: f64) -> DepthStabilityParams {
        DepthStabilityParams {
            window_size,
            max_variance,
        }
    }

    #[test]
    fn test_flat_windows_score_one() {
        let found = detect(&words_at(&[3; 12]), &params(10, 2.0));
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|c| c.score == 1.0));
    }

    #[test]
    fn test_windows_straddling_a_jump_are_dropped() {
        let mut depths = vec![2; 10];
        depths.extend(vec![12; 10]);
        let found = detect(&words_at(&depths), &params(4, 2.0));
        // Only windows entirely on one side of the jump survive.
        let spans: Vec<(usize, usize)> = found.iter().map(|c| (c.start, c.end)).collect();
        assert!(spans.iter().all(|&(s, e)| e < 10 || s >= 10));
        assert_eq!(found.len(), 7 + 7);
    }

    #[test]
    fn test_score_decays_with_variance() {
        // depths 1,3 alternate: variance 1.0, score 1 - 1 / 4
        let found = detect(&words_at(&[1, 3, 1, 3]), &params(4, 2.0));
        assert_eq!(found.len(), 1);
        assert!((found[0].score - 0.75).abs() < 1e-12);
    }
}

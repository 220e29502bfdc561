// ABOUTME: Sliding-window text density detector.
// ABOUTME: Density is window size over average depth; dense, shallow windows become candidates.

use super::{BlockCandidate, DepthSums, Evidence};
use crate::dom::words::WordNode;
use crate::options::TextDensityParams;

/// Emit a candidate for every window `[i, i + W)` whose density reaches
/// `min_density`. Documents shorter than one window yield nothing.
pub fn detect(words: &[WordNode], params: &TextDensityParams) -> Vec<BlockCandidate> {
    let w = params.window_size;
    if w == 0 || words.len() < w {
        return Vec::new();
    }

    let sums = DepthSums::new(words);
    let mut candidates = Vec::new();

    for i in 0..=words.len() - w {
        let (avg_depth, _) = sums.window(i, w);
        let divisor = if avg_depth == 0.0 { 1.0 } else { avg_depth };
        let density = w as f64 / divisor;
        if density >= params.min_density {
            let score = (density / (2.0 * params.min_density)).min(1.0);
            candidates.push(BlockCandidate::new(
                i,
                i + w - 1,
                Evidence::TextDensity {
                    score,
                    density,
                    avg_depth,
                },
            ));
        }
    }

    tracing::trace!(windows = words.len() - w + 1, kept = candidates.len(), "text density");
    candidates
}

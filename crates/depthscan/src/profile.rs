// ABOUTME: Statistical depth profile of the word sequence.
// ABOUTME: Summary stats, exact-depth histogram, depth transitions and greedy plateau segmentation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dom::words::WordNode;

/// Default jump size for profile transitions.
pub const DEFAULT_TRANSITION_THRESHOLD: usize = 2;
/// A plateau closes once its depth variance goes above this.
pub const PLATEAU_MAX_VARIANCE: f64 = 1.5;
/// Shorter runs are not reported as plateaus.
pub const PLATEAU_MIN_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionDirection {
    Increase,
    Decrease,
}

/// An abrupt depth change between two adjacent words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthTransition {
    /// Index of the word after the jump.
    pub word_index: usize,
    pub from_depth: usize,
    pub to_depth: usize,
    pub magnitude: usize,
    pub direction: TransitionDirection,
}

/// A run of words at locally stable depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthPlateau {
    pub start_index: usize,
    /// Inclusive.
    pub end_index: usize,
    /// Average depth rounded to the nearest integer.
    pub depth: usize,
    pub length: usize,
    pub variance: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DepthProfile {
    pub min_depth: usize,
    pub max_depth: usize,
    pub mean_depth: f64,
    pub median_depth: f64,
    pub std_dev: f64,
    /// Depth to word count. Counts sum to the number of words.
    pub histogram: BTreeMap<usize, usize>,
    pub transitions: Vec<DepthTransition>,
    pub plateaus: Vec<DepthPlateau>,
}

/// Population mean and variance of a depth sequence. `(0, 0)` when empty.
pub fn mean_and_variance(depths: &[usize]) -> (f64, f64) {
    if depths.is_empty() {
        return (0.0, 0.0);
    }
    let n = depths.len() as f64;
    let mean = depths.iter().map(|&d| d as f64).sum::<f64>() / n;
    let variance = depths
        .iter()
        .map(|&d| {
            let diff = d as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    (mean, variance)
}

fn median(depths: &[usize]) -> f64 {
    if depths.is_empty() {
        return 0.0;
    }
    let mut sorted = depths.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Build the depth profile of a word sequence.
///
/// An empty sequence yields the all-zero profile.
pub fn build_depth_profile(words: &[WordNode], transition_threshold: usize) -> DepthProfile {
    if words.is_empty() {
        return DepthProfile::default();
    }

    let depths: Vec<usize> = words.iter().map(|w| w.depth).collect();
    let (mean_depth, variance) = mean_and_variance(&depths);

    let mut histogram = BTreeMap::new();
    for &d in &depths {
        *histogram.entry(d).or_insert(0) += 1;
    }

    DepthProfile {
        min_depth: depths.iter().copied().min().unwrap_or(0),
        max_depth: depths.iter().copied().max().unwrap_or(0),
        mean_depth,
        median_depth: median(&depths),
        std_dev: variance.sqrt(),
        histogram,
        transitions: detect_transitions(words, transition_threshold),
        plateaus: detect_plateaus(words),
    }
}

/// Record every adjacent-word jump of at least `threshold` levels.
pub fn detect_transitions(words: &[WordNode], threshold: usize) -> Vec<DepthTransition> {
    words
        .windows(2)
        .filter_map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            let magnitude = prev.depth.abs_diff(cur.depth);
            if magnitude < threshold || magnitude == 0 {
                return None;
            }
            Some(DepthTransition {
                word_index: cur.word_index,
                from_depth: prev.depth,
                to_depth: cur.depth,
                magnitude,
                direction: if cur.depth > prev.depth {
                    TransitionDirection::Increase
                } else {
                    TransitionDirection::Decrease
                },
            })
        })
        .collect()
}

/// Greedy plateau segmentation.
///
/// Words are appended to the current plateau one at a time. When the
/// plateau's variance goes above [`PLATEAU_MAX_VARIANCE`], the run before the
/// offending word is closed and a new plateau starts at that word. There is
/// no search for better breakpoints.
pub fn detect_plateaus(words: &[WordNode]) -> Vec<DepthPlateau> {
    let mut plateaus = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut start = 0usize;

    for (i, word) in words.iter().enumerate() {
        current.push(word.depth);
        let (_, variance) = mean_and_variance(&current);
        if variance > PLATEAU_MAX_VARIANCE {
            current.pop();
            if let Some(plateau) = close_plateau(&current, start) {
                plateaus.push(plateau);
            }
            current.clear();
            current.push(word.depth);
            start = i;
        }
    }
    if let Some(plateau) = close_plateau(&current, start) {
        plateaus.push(plateau);
    }

    plateaus
}

fn close_plateau(depths: &[usize], start: usize) -> Option<DepthPlateau> {
    if depths.len() < PLATEAU_MIN_LENGTH {
        return None;
    }
    let (mean, variance) = mean_and_variance(depths);
    Some(DepthPlateau {
        start_index: start,
        end_index: start + depths.len() - 1,
        depth: mean.round() as usize,
        length: depths.len(),
        variance,
    })
}

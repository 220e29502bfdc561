// ABOUTME: Configuration for depthscan: Algorithm, AnalysisOptions and per-algorithm parameters.
// ABOUTME: AnalyzerBuilder provides a fluent API for constructing Analyzer instances with custom settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analyzer::Analyzer;
use crate::error::AnalysisError;

/// Tags whose whole subtree is dropped before analysis.
pub const DEFAULT_IGNORED_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg"];

/// The four independent block-detection algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    TextDensity,
    DepthStability,
    Clustering,
    DepthTransition,
}

impl Algorithm {
    /// All algorithms in the order the detector runs them.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::TextDensity,
        Algorithm::DepthStability,
        Algorithm::Clustering,
        Algorithm::DepthTransition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::TextDensity => "text_density",
            Algorithm::DepthStability => "depth_stability",
            Algorithm::Clustering => "clustering",
            Algorithm::DepthTransition => "depth_transition",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "text_density" | "density" => Ok(Algorithm::TextDensity),
            "depth_stability" | "stability" => Ok(Algorithm::DepthStability),
            "clustering" | "dbscan" => Ok(Algorithm::Clustering),
            "depth_transition" | "transition" => Ok(Algorithm::DepthTransition),
            other => Err(format!("unknown algorithm: {}", other)),
        }
    }
}

/// Per-algorithm on/off switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnabledAlgorithms {
    pub text_density: bool,
    pub depth_stability: bool,
    pub clustering: bool,
    pub depth_transition: bool,
}

impl EnabledAlgorithms {
    /// Only the given algorithm is enabled.
    pub fn only(algorithm: Algorithm) -> Self {
        let mut enabled = Self {
            text_density: false,
            depth_stability: false,
            clustering: false,
            depth_transition: false,
        };
        enabled.set(algorithm, true);
        enabled
    }

    pub fn is_enabled(&self, algorithm: Algorithm) -> bool {
        match algorithm {
            Algorithm::TextDensity => self.text_density,
            Algorithm::DepthStability => self.depth_stability,
            Algorithm::Clustering => self.clustering,
            Algorithm::DepthTransition => self.depth_transition,
        }
    }

    pub fn set(&mut self, algorithm: Algorithm, enabled: bool) {
        match algorithm {
            Algorithm::TextDensity => self.text_density = enabled,
            Algorithm::DepthStability => self.depth_stability = enabled,
            Algorithm::Clustering => self.clustering = enabled,
            Algorithm::DepthTransition => self.depth_transition = enabled,
        }
    }

    /// Enabled algorithms in run order.
    pub fn iter(&self) -> impl Iterator<Item = Algorithm> + '_ {
        Algorithm::ALL
            .into_iter()
            .filter(move |a| self.is_enabled(*a))
    }
}

impl Default for EnabledAlgorithms {
    fn default() -> Self {
        Self {
            text_density: true,
            depth_stability: true,
            clustering: true,
            depth_transition: true,
        }
    }
}

/// Sliding-window text density parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDensityParams {
    pub window_size: usize,
    pub min_density: f64,
}

impl Default for TextDensityParams {
    fn default() -> Self {
        Self {
            window_size: 50,
            min_density: 0.3,
        }
    }
}

/// Sliding-window depth variance parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthStabilityParams {
    pub window_size: usize,
    pub max_variance: f64,
}

impl Default for DepthStabilityParams {
    fn default() -> Self {
        Self {
            window_size: 30,
            max_variance: 2.0,
        }
    }
}

/// DBSCAN parameters over (word index, depth) points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringParams {
    pub epsilon: f64,
    pub min_points: usize,
}

impl Default for ClusteringParams {
    fn default() -> Self {
        Self {
            epsilon: 5.0,
            min_points: 5,
        }
    }
}

/// Depth-transition segmentation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthTransitionParams {
    pub min_magnitude: usize,
}

impl Default for DepthTransitionParams {
    fn default() -> Self {
        Self { min_magnitude: 3 }
    }
}

/// Options for one analysis call.
///
/// Every field has a fixed default, and deserializing a partial document
/// fills the missing fields from those defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub algorithms: EnabledAlgorithms,
    pub min_block_score: f64,
    pub min_block_size: usize,
    pub max_blocks: usize,
    pub ignored_tags: Vec<String>,
    pub text_density: TextDensityParams,
    pub depth_stability: DepthStabilityParams,
    pub clustering: ClusteringParams,
    pub depth_transition: DepthTransitionParams,
    pub include_stats: bool,
    pub include_depth_profile: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            algorithms: EnabledAlgorithms::default(),
            min_block_score: 0.5,
            min_block_size: 10,
            max_blocks: 10,
            ignored_tags: DEFAULT_IGNORED_TAGS.iter().map(|t| t.to_string()).collect(),
            text_density: TextDensityParams::default(),
            depth_stability: DepthStabilityParams::default(),
            clustering: ClusteringParams::default(),
            depth_transition: DepthTransitionParams::default(),
            include_stats: true,
            include_depth_profile: true,
        }
    }
}

impl AnalysisOptions {
    /// Parse options from JSON, filling anything missing from the defaults.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        serde_json::from_str(json)
            .map_err(|e| AnalysisError::analysis("parse options", Some(e.into())))
    }

    /// Reject parameter combinations the detectors cannot work with.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let fail = |msg: &str| {
            Err(AnalysisError::analysis(
                "validate options",
                Some(anyhow::anyhow!(msg.to_string())),
            ))
        };

        if !self.min_block_score.is_finite() {
            return fail("min_block_score must be finite");
        }
        if self.text_density.window_size == 0 {
            return fail("text_density.window_size must be positive");
        }
        if !(self.text_density.min_density > 0.0) {
            return fail("text_density.min_density must be positive");
        }
        if self.depth_stability.window_size == 0 {
            return fail("depth_stability.window_size must be positive");
        }
        if !(self.depth_stability.max_variance > 0.0) {
            return fail("depth_stability.max_variance must be positive");
        }
        if !(self.clustering.epsilon > 0.0) || !self.clustering.epsilon.is_finite() {
            return fail("clustering.epsilon must be a positive finite number");
        }
        if self.clustering.min_points == 0 {
            return fail("clustering.min_points must be positive");
        }
        if self.depth_transition.min_magnitude == 0 {
            return fail("depth_transition.min_magnitude must be positive");
        }
        Ok(())
    }

    /// Lowercased ignored tag names.
    pub fn ignored_tag_set(&self) -> std::collections::HashSet<String> {
        self.ignored_tags.iter().map(|t| t.to_lowercase()).collect()
    }
}

/// Builder for constructing Analyzer instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerBuilder {
    opts: AnalysisOptions,
}

impl AnalyzerBuilder {
    /// Create a new AnalyzerBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: AnalysisOptions::default(),
        }
    }

    /// Start from an existing set of options.
    pub fn options(mut self, opts: AnalysisOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Turn a single algorithm on or off.
    pub fn enable(mut self, algorithm: Algorithm, enabled: bool) -> Self {
        self.opts.algorithms.set(algorithm, enabled);
        self
    }

    /// Run only the given algorithm.
    pub fn only(mut self, algorithm: Algorithm) -> Self {
        self.opts.algorithms = EnabledAlgorithms::only(algorithm);
        self
    }

    pub fn min_block_score(mut self, score: f64) -> Self {
        self.opts.min_block_score = score;
        self
    }

    /// Minimum block size in words.
    pub fn min_block_size(mut self, words: usize) -> Self {
        self.opts.min_block_size = words;
        self
    }

    pub fn max_blocks(mut self, max: usize) -> Self {
        self.opts.max_blocks = max;
        self
    }

    /// Replace the ignored tag list.
    pub fn ignored_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.ignored_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn text_density(mut self, window_size: usize, min_density: f64) -> Self {
        self.opts.text_density = TextDensityParams {
            window_size,
            min_density,
        };
        self
    }

    pub fn depth_stability(mut self, window_size: usize, max_variance: f64) -> Self {
        self.opts.depth_stability = DepthStabilityParams {
            window_size,
            max_variance,
        };
        self
    }

    pub fn clustering(mut self, epsilon: f64, min_points: usize) -> Self {
        self.opts.clustering = ClusteringParams {
            epsilon,
            min_points,
        };
        self
    }

    pub fn depth_transition(mut self, min_magnitude: usize) -> Self {
        self.opts.depth_transition = DepthTransitionParams { min_magnitude };
        self
    }

    pub fn include_stats(mut self, include: bool) -> Self {
        self.opts.include_stats = include;
        self
    }

    pub fn include_depth_profile(mut self, include: bool) -> Self {
        self.opts.include_depth_profile = include;
        self
    }

    /// Build the Analyzer with the configured options.
    pub fn build(self) -> Analyzer {
        Analyzer::new(self.opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_documented_table() {
        let opts = AnalysisOptions::default();
        assert!(Algorithm::ALL.iter().all(|a| opts.algorithms.is_enabled(*a)));
        assert_eq!(opts.min_block_score, 0.5);
        assert_eq!(opts.min_block_size, 10);
        assert_eq!(opts.max_blocks, 10);
        assert_eq!(
            opts.ignored_tags,
            vec!["script", "style", "noscript", "iframe", "svg"]
        );
        assert_eq!(opts.text_density.window_size, 50);
        assert_eq!(opts.text_density.min_density, 0.3);
        assert_eq!(opts.depth_stability.window_size, 30);
        assert_eq!(opts.depth_stability.max_variance, 2.0);
        assert_eq!(opts.clustering.epsilon, 5.0);
        assert_eq!(opts.clustering.min_points, 5);
        assert_eq!(opts.depth_transition.min_magnitude, 3);
        assert!(opts.include_stats);
        assert!(opts.include_depth_profile);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_partial_json_merges_with_defaults() {
        let opts = AnalysisOptions::from_json(
            r#"{"max_blocks": 3, "clustering": {"epsilon": 8.0}, "algorithms": {"clustering": false}}"#,
        )
        .unwrap();
        assert_eq!(opts.max_blocks, 3);
        assert_eq!(opts.clustering.epsilon, 8.0);
        assert_eq!(opts.clustering.min_points, 5);
        assert!(!opts.algorithms.clustering);
        assert!(opts.algorithms.text_density);
        assert_eq!(opts.min_block_size, 10);
    }

    #[test]
    fn test_invalid_json_is_analysis_error() {
        let err = AnalysisOptions::from_json("{not json").unwrap_err();
        assert!(err.is_analysis());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut opts = AnalysisOptions::default();
        opts.text_density.window_size = 0;
        let err = opts.validate().unwrap_err();
        assert!(err.is_analysis());
        assert!(err.to_string().contains("window_size"));
    }

    #[test]
    fn test_validate_rejects_bad_epsilon() {
        let mut opts = AnalysisOptions::default();
        opts.clustering.epsilon = f64::NAN;
        assert!(opts.validate().is_err());
        opts.clustering.epsilon = -1.0;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_algorithm_parse_and_display() {
        assert_eq!("text-density".parse::<Algorithm>(), Ok(Algorithm::TextDensity));
        assert_eq!("DBSCAN".parse::<Algorithm>(), Ok(Algorithm::Clustering));
        assert!("bogus".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::DepthTransition.to_string(), "depth_transition");
        assert_eq!(
            serde_json::to_string(&Algorithm::DepthStability).unwrap(),
            "\"depth_stability\""
        );
    }

    #[test]
    fn test_only_enables_single_algorithm() {
        let enabled = EnabledAlgorithms::only(Algorithm::Clustering);
        assert_eq!(enabled.iter().collect::<Vec<_>>(), vec![Algorithm::Clustering]);
    }

    #[test]
    fn test_builder_sets_fields() {
        let analyzer = AnalyzerBuilder::new()
            .max_blocks(2)
            .min_block_score(0.1)
            .enable(Algorithm::Clustering, false)
            .ignored_tags(["script"])
            .build();
        let opts = analyzer.options();
        assert_eq!(opts.max_blocks, 2);
        assert_eq!(opts.min_block_score, 0.1);
        assert!(!opts.algorithms.clustering);
        assert_eq!(opts.ignored_tags, vec!["script".to_string()]);
    }
}

// ABOUTME: AnalysisResult and the interest block types it carries.
// ABOUTME: Includes a plain-text report formatter and convenience helpers for callers.

use std::fmt;
use std::ops::{Deref, Range};
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::dom::stats::DocumentStats;
use crate::dom::words::WordNode;
use crate::options::{Algorithm, AnalysisOptions};
use crate::profile::DepthProfile;

/// A block's view into the document's shared word list.
///
/// Cloning shares the underlying words rather than copying them.
#[derive(Clone)]
pub struct WordSpan {
    words: Arc<[WordNode]>,
    range: Range<usize>,
}

impl WordSpan {
    /// Span `[start, end]` (inclusive) of `words`, clamped to its bounds.
    pub fn new(words: Arc<[WordNode]>, start: usize, end: usize) -> Self {
        let len = words.len();
        let start = start.min(len);
        let end = end.saturating_add(1).min(len).max(start);
        Self {
            words,
            range: start..end,
        }
    }
}

impl Deref for WordSpan {
    type Target = [WordNode];

    fn deref(&self) -> &[WordNode] {
        &self.words[self.range.clone()]
    }
}

impl PartialEq for WordSpan {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl fmt::Debug for WordSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WordSpan({:?}, {} words)", self.range, self.range.len())
    }
}

/// One algorithm's contribution to a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReason {
    pub algorithm: Algorithm,
    pub confidence: f64,
    pub description: String,
}

/// Derived statistics of a block.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BlockStats {
    pub word_count: usize,
    /// Sum of word lengths in characters.
    pub char_count: usize,
    /// Words per average depth level.
    pub text_density: f64,
    /// Distinct parent tags.
    pub tag_diversity: usize,
    pub has_semantic: bool,
    pub average_word_length: f64,
}

/// A contiguous run of words identified as likely main content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestBlock {
    pub start_word_index: usize,
    /// Inclusive.
    pub end_word_index: usize,
    pub start_char: usize,
    pub end_char: usize,
    #[serde(skip)]
    pub words: WordSpan,
    pub score: f64,
    pub avg_depth: f64,
    pub min_depth: usize,
    pub max_depth: usize,
    pub depth_variance: f64,
    pub stats: BlockStats,
    pub reasons: Vec<DetectionReason>,
    /// Up to three most frequent parent tags.
    pub dominant_tags: Vec<String>,
    pub preview: String,
}

impl InterestBlock {
    /// The block's text, words joined by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.content.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn span(&self) -> (usize, usize) {
        (self.start_word_index, self.end_word_index)
    }
}

/// Everything one analysis call produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub blocks: Vec<InterestBlock>,
    /// Present unless disabled in the options.
    pub depth_profile: Option<DepthProfile>,
    /// Present unless disabled in the options.
    pub document_stats: Option<DocumentStats>,
    #[serde(serialize_with = "serialize_words")]
    pub words: Arc<[WordNode]>,
    pub options: AnalysisOptions,
    pub processing_time_ms: f64,
}

fn serialize_words<S: Serializer>(
    words: &Arc<[WordNode]>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(words.iter())
}

impl PartialEq for AnalysisResult {
    /// Equality ignores processing time.
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks
            && self.depth_profile == other.depth_profile
            && self.document_stats == other.document_stats
            && *self.words == *other.words
            && self.options == other.options
    }
}

impl AnalysisResult {
    /// The highest ranked block, if any.
    pub fn top_block(&self) -> Option<&InterestBlock> {
        self.blocks.first()
    }

    /// Returns true if no block survived ranking.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Format the result as a plain-text report.
    pub fn format_text(&self) -> String {
        let mut parts = Vec::new();

        parts.push(format!(
            "{} words, {} blocks ({:.1} ms)",
            self.words.len(),
            self.blocks.len(),
            self.processing_time_ms
        ));

        if let Some(ref profile) = self.depth_profile {
            parts.push(format!(
                "depth: min {} max {} mean {:.2} median {:.1} stddev {:.2}, {} transitions, {} plateaus",
                profile.min_depth,
                profile.max_depth,
                profile.mean_depth,
                profile.median_depth,
                profile.std_dev,
                profile.transitions.len(),
                profile.plateaus.len()
            ));
        }

        for (rank, block) in self.blocks.iter().enumerate() {
            let mut lines = vec![format!(
                "#{} score {:.3} words {}..={} depth {:.1} [{}]",
                rank + 1,
                block.score,
                block.start_word_index,
                block.end_word_index,
                block.avg_depth,
                block.dominant_tags.join(", ")
            )];
            for reason in &block.reasons {
                lines.push(format!(
                    "  - {} ({:.2}): {}",
                    reason.algorithm, reason.confidence, reason.description
                ));
            }
            lines.push(format!("  > {}", block.preview));
            parts.push(lines.join("\n"));
        }

        parts.join("\n\n")
    }
}

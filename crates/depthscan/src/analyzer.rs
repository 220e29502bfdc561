// ABOUTME: The Analyzer that sequences the depth analysis pipeline for one document.
// ABOUTME: Provides analyze(), analyze_html(), analyze_str() and an async analyze_async() entry point.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use scraper::Html;
use tracing::debug;

use crate::detect::detect;
use crate::dom::stats::calculate_document_stats;
use crate::dom::tree::StructureTree;
use crate::dom::words::{annotate_words_with_depth, WordNode};
use crate::dom::{parse_document, DomNode};
use crate::error::AnalysisError;
use crate::options::{AnalysisOptions, AnalyzerBuilder};
use crate::profile::{build_depth_profile, DEFAULT_TRANSITION_THRESHOLD};
use crate::ranking::rank_blocks;
use crate::result::AnalysisResult;
use crate::scoring::build_scored_blocks;

/// Runs interest-block analysis with a fixed set of options.
///
/// An Analyzer holds no per-document state, so one instance can serve any
/// number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    opts: AnalysisOptions,
}

impl Analyzer {
    pub fn new(opts: AnalysisOptions) -> Self {
        Self { opts }
    }

    /// Create a new AnalyzerBuilder for custom configuration.
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.opts
    }

    /// Analyze the DOM tree below `root`.
    ///
    /// Fails with a structural parse error when `root` is missing or not an
    /// element, with a no-content error when no words can be extracted, and
    /// with an analysis error for invalid options or any internal failure.
    pub fn analyze<N: DomNode>(&self, root: Option<&N>) -> Result<AnalysisResult, AnalysisError> {
        let start = Instant::now();
        self.opts.validate()?;

        match panic::catch_unwind(AssertUnwindSafe(|| self.run(root, start))) {
            Ok(result) => result,
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(AnalysisError::analysis("analyze", Some(anyhow::anyhow!(msg))))
            }
        }
    }

    /// Analyze a document parsed by scraper, starting at its `<html>` element.
    pub fn analyze_html(&self, doc: &Html) -> Result<AnalysisResult, AnalysisError> {
        let root = doc.tree.get(doc.root_element().id());
        self.analyze(root.as_ref())
    }

    /// Parse and analyze an HTML string.
    pub fn analyze_str(&self, html: &str) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_html(&parse_document(html))
    }

    /// Async entry point for callers on an executor.
    ///
    /// Computationally identical to [`Analyzer::analyze`]: there is no I/O
    /// and no suspension point inside.
    pub async fn analyze_async<N: DomNode>(
        &self,
        root: Option<&N>,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.analyze(root)
    }

    fn run<N: DomNode>(
        &self,
        root: Option<&N>,
        start: Instant,
    ) -> Result<AnalysisResult, AnalysisError> {
        let opts = &self.opts;

        let tree = StructureTree::build(root, &opts.ignored_tag_set())?;
        debug!(nodes = tree.len(), "built structure tree");

        let words: Arc<[WordNode]> = annotate_words_with_depth(&tree).into();
        if words.is_empty() {
            return Err(AnalysisError::no_content("annotate words"));
        }
        debug!(words = words.len(), "annotated words");

        let depth_profile = opts
            .include_depth_profile
            .then(|| build_depth_profile(&words, DEFAULT_TRANSITION_THRESHOLD));

        let candidates = detect(&words, opts);
        debug!(candidates = candidates.len(), "merged candidates");

        let blocks = build_scored_blocks(&candidates, &words);
        let blocks = rank_blocks(
            blocks,
            opts.min_block_score,
            opts.min_block_size,
            opts.max_blocks,
        );
        debug!(blocks = blocks.len(), "ranked blocks");

        let document_stats = opts
            .include_stats
            .then(|| calculate_document_stats(&tree, &words));

        Ok(AnalysisResult {
            blocks,
            depth_profile,
            document_stats,
            words,
            options: opts.clone(),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Algorithm;
    use pretty_assertions::assert_eq;

    fn article_html(words: usize) -> String {
        let body: Vec<String> = (0..words).map(|i| format!("word{}", i)).collect();
        format!(
            "<html><body><article><p>{}</p></article></body></html>",
            body.join(" ")
        )
    }

    #[test]
    fn test_analyze_returns_blocks_and_extras() {
        let result = Analyzer::default().analyze_str(&article_html(120)).unwrap();
        assert_eq!(result.words.len(), 120);
        assert!(!result.blocks.is_empty());
        let stats = result.document_stats.as_ref().unwrap();
        assert_eq!(stats.total_words, 120);
        assert!(stats.has_semantic_html);
        let profile = result.depth_profile.as_ref().unwrap();
        assert_eq!(profile.histogram.values().sum::<usize>(), 120);
        assert_eq!(result.options, AnalysisOptions::default());
        assert!(result.processing_time_ms >= 0.0);
    }

    #[test]
    fn test_optional_sections_can_be_disabled() {
        let analyzer = Analyzer::builder()
            .include_stats(false)
            .include_depth_profile(false)
            .build();
        let result = analyzer.analyze_str(&article_html(30)).unwrap();
        assert!(result.document_stats.is_none());
        assert!(result.depth_profile.is_none());
    }

    #[test]
    fn test_no_words_is_no_content_error() {
        let err = Analyzer::default()
            .analyze_str("<html><body><div> <script>var x = 1;</script> </div></body></html>")
            .unwrap_err();
        assert!(err.is_no_content());
    }

    #[test]
    fn test_missing_root_is_structural_error() {
        let err = Analyzer::default()
            .analyze::<ego_tree::NodeRef<scraper::Node>>(None)
            .unwrap_err();
        assert!(err.is_structural_parse());
    }

    #[test]
    fn test_text_root_is_structural_error() {
        let doc = parse_document("<p>hello</p>");
        let text = doc
            .tree
            .root()
            .descendants()
            .find(|n| n.value().is_text())
            .unwrap();
        let err = Analyzer::default().analyze(Some(&text)).unwrap_err();
        assert!(err.is_structural_parse());
    }

    #[test]
    fn test_invalid_options_fail_before_analysis() {
        let analyzer = Analyzer::builder().depth_stability(0, 2.0).build();
        let err = analyzer.analyze_str(&article_html(30)).unwrap_err();
        assert!(err.is_analysis());
    }

    #[test]
    fn test_disabling_every_algorithm_yields_no_blocks() {
        let mut builder = Analyzer::builder();
        for algorithm in Algorithm::ALL {
            builder = builder.enable(algorithm, false);
        }
        let result = builder.build().analyze_str(&article_html(60)).unwrap();
        assert!(result.blocks.is_empty());
        assert_eq!(result.words.len(), 60);
    }

    #[test]
    fn test_repeat_analysis_is_identical() {
        let doc = parse_document(&article_html(200));
        let analyzer = Analyzer::default();
        let first = analyzer.analyze_html(&doc).unwrap();
        let second = analyzer.analyze_html(&doc).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let doc = parse_document(&article_html(80));
        let root = doc.tree.get(doc.root_element().id());
        let analyzer = Analyzer::default();
        let sync = analyzer.analyze(root.as_ref()).unwrap();
        let async_result = analyzer.analyze_async(root.as_ref()).await.unwrap();
        assert_eq!(sync, async_result);
    }
}

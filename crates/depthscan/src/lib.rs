// ABOUTME: Main library entry point for the depthscan DOM depth analyzer.
// ABOUTME: Re-exports the public API: Analyzer, AnalyzerBuilder, AnalysisOptions, AnalysisResult, AnalysisError.

//! depthscan - locate the main content of an HTML document from nesting depth.
//!
//! Every word of visible text is annotated with the depth of the element that
//! holds it. Four independent detectors look for runs of words that are dense,
//! stable, spatially clustered or bounded by sharp depth changes. Their
//! candidates are merged, scored and ranked into interest blocks.
//!
//! # Example
//!
//! ```
//! use depthscan::{Analyzer, AnalysisError};
//!
//! fn main() -> Result<(), AnalysisError> {
//!     let analyzer = Analyzer::builder().max_blocks(3).build();
//!     let result = analyzer.analyze_str("<html><body><p>Hello depth analysis</p></body></html>")?;
//!     println!("{}", result.format_text());
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod detect;
pub mod dom;
pub mod error;
pub mod options;
pub mod profile;
pub mod ranking;
pub mod resource;
pub mod result;
pub mod scoring;

pub use crate::analyzer::Analyzer;
pub use crate::detect::{BlockCandidate, Evidence, SegmentKind};
pub use crate::dom::stats::DocumentStats;
pub use crate::dom::words::WordNode;
pub use crate::dom::{DomNode, DomNodeKind};
pub use crate::error::{AnalysisError, ErrorCode};
pub use crate::options::{Algorithm, AnalysisOptions, AnalyzerBuilder};
pub use crate::profile::DepthProfile;
pub use crate::result::{AnalysisResult, BlockStats, DetectionReason, InterestBlock};

/// Analyze an HTML string with default options.
pub fn analyze_html(html: &str) -> Result<AnalysisResult, AnalysisError> {
    Analyzer::default().analyze_str(html)
}

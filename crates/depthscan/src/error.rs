// ABOUTME: Error types for depthscan including the ErrorCode enum and AnalysisError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the categories of analysis failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The supplied root was missing or was not an element.
    StructuralParse,
    /// The tree was built but no words could be extracted.
    NoContent,
    /// Any other failure, including rejected options.
    Analysis,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::StructuralParse => "structural parse error",
            ErrorCode::NoContent => "no content",
            ErrorCode::Analysis => "analysis failure",
        };
        write!(f, "{}", s)
    }
}

/// The error type returned by every fallible analysis operation.
///
/// Failures are all-or-nothing: no partial result accompanies an error.
#[derive(Debug, thiserror::Error)]
pub struct AnalysisError {
    pub code: ErrorCode,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depthscan: {}: {}", self.op, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl AnalysisError {
    /// Create a StructuralParse error.
    pub fn structural_parse(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::StructuralParse,
            op: op.into(),
            source,
        }
    }

    /// Create a NoContent error.
    pub fn no_content(op: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::NoContent,
            op: op.into(),
            source: None,
        }
    }

    /// Create an Analysis error wrapping the underlying cause.
    pub fn analysis(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::Analysis,
            op: op.into(),
            source,
        }
    }

    /// Returns true if this is a StructuralParse error.
    pub fn is_structural_parse(&self) -> bool {
        self.code == ErrorCode::StructuralParse
    }

    /// Returns true if this is a NoContent error.
    pub fn is_no_content(&self) -> bool {
        self.code == ErrorCode::NoContent
    }

    /// Returns true if this is an Analysis error.
    pub fn is_analysis(&self) -> bool {
        self.code == ErrorCode::Analysis
    }
}

//! Error and warning types for the transform pipeline.

/// Error while parsing a stylesheet.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// A `{` without matching `}` (or the reverse).
    #[error("unbalanced braces in stylesheet")]
    UnbalancedBraces,

    /// A declaration block with no selector in front of it.
    #[error("declaration block without selector")]
    MissingSelector,

    /// A declaration without a `property: value` shape.
    #[error("malformed declaration: {0}")]
    MalformedDeclaration(String),
}

/// Error during style inlining.
#[derive(Debug, thiserror::Error)]
pub enum InlineError {
    /// Stylesheet could not be parsed.
    #[error("stylesheet error: {0}")]
    Style(#[from] StyleError),

    /// Document could not be parsed as markup.
    #[error("markup parse error: {0}")]
    Parse(#[from] quick_xml::Error),
}

/// Recoverable condition signaled alongside pipeline output.
///
/// Warnings never abort the pipeline; the affected stage falls back to its
/// input and every other region of the document is left intact.
#[derive(Debug, thiserror::Error)]
pub enum PipelineWarning {
    /// The stylesheet was rejected; output is the pre-inlining markup.
    #[error("stylesheet could not be applied: {0}")]
    StylesheetRejected(String),

    /// A callout blockquote never closed; its wrapper tags were not emitted.
    #[error("unterminated callout blockquote ({depth} left open)")]
    UnterminatedCallout {
        /// Number of callout regions still open at end of input.
        depth: usize,
    },
}

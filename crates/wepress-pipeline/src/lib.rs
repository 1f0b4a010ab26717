//! Content transformation pipeline for WeChat publishing.
//!
//! Takes HTML produced by a Markdown renderer and rewrites it into markup the
//! WeChat Official Account rich-text renderer accepts:
//!
//! 1. [`math::normalize`] — repair MathJax artifacts
//! 2. [`code::chunk`] — split code blocks into per-line elements
//! 3. [`callout::transform`] — restructure `[!type]` callout blockquotes
//! 4. wrap everything in a single root `<section>`
//! 5. [`inline::inline`] — move stylesheet rules into `style` attributes
//!
//! Every stage is a pure function over an immutable string; the pipeline
//! keeps no state between invocations and is safe to run concurrently on
//! independent inputs.
//!
//! # Example
//!
//! ```
//! use wepress_pipeline::Pipeline;
//!
//! let result = Pipeline::new().run("<p>Hello</p>", "p { color: #333 }");
//! assert!(result.html.contains(r#"<p style="color: #333">Hello</p>"#));
//! assert!(result.warnings.is_empty());
//! ```

pub mod callout;
pub mod code;
mod entities;
pub mod error;
pub mod icons;
pub mod inline;
pub mod math;
pub mod style;

pub use error::{InlineError, PipelineWarning, StyleError};

/// Id of the root container the document is wrapped in; the stylesheet
/// targets descendants of `#nice`.
pub const ROOT_CONTAINER_ID: &str = "nice";

/// Output of a pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    /// Publishable markup for the draft `content` field.
    pub html: String,
    /// Recoverable conditions encountered along the way.
    pub warnings: Vec<PipelineWarning>,
}

/// The content transformation pipeline.
///
/// Stateless; construct once and call [`Pipeline::run`] per document.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pipeline;

impl Pipeline {
    /// Create a pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run all stages over rendered HTML with the caller's stylesheet.
    ///
    /// Never fails: a rejected stylesheet or an unterminated callout region
    /// is reported through [`PipelineResult::warnings`] while the rest of
    /// the document is processed normally.
    #[must_use]
    pub fn run(&self, raw_html: &str, css_text: &str) -> PipelineResult {
        let mut warnings = Vec::new();

        let html = math::normalize(raw_html);
        let html = code::chunk(&html);
        let scanned = callout::transform(&html);
        if scanned.unterminated > 0 {
            warnings.push(PipelineWarning::UnterminatedCallout {
                depth: scanned.unterminated,
            });
        }

        let wrapped = format!(
            r#"<section id="{ROOT_CONTAINER_ID}">{}</section>"#,
            scanned.html
        );

        let html = match inline::inline(&wrapped, css_text) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(error = %e, "stylesheet rejected, returning markup without inline styles");
                warnings.push(PipelineWarning::StylesheetRejected(e.to_string()));
                wrapped
            }
        };

        PipelineResult { html, warnings }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_full_pipeline() {
        let html = "<blockquote><p>[!note] Heads up</p><p>Body</p></blockquote>\
                    <pre><code>let x = 1;\n</code></pre>";
        let css = "#nice p { color: #333 }\ncode { font-family: monospace }";
        let result = Pipeline::new().run(html, css);

        assert!(result.warnings.is_empty());
        assert!(result.html.starts_with(r#"<section id="nice">"#));
        assert!(result.html.ends_with("</section>"));
        assert!(result.html.contains("<callout-title>"));
        assert!(result.html.contains(r#"<code style="font-family: monospace">let x = 1;</code>"#));
    }

    #[test]
    fn test_bad_stylesheet_falls_back_to_uninlined_markup() {
        let result = Pipeline::new().run("<p>text</p>", "p { color: red");

        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            result.warnings[0],
            PipelineWarning::StylesheetRejected(_)
        ));
        assert_eq!(result.html, r#"<section id="nice"><p>text</p></section>"#);
    }

    #[test]
    fn test_unterminated_callout_reported() {
        let result = Pipeline::new().run("<blockquote><p>[!note] t</p>", "");
        assert!(result.warnings.iter().any(|w| matches!(
            w,
            PipelineWarning::UnterminatedCallout { depth: 1 }
        )));
    }

    #[test]
    fn test_stages_compose_in_order() {
        // Inline math passes through math repair, then survives wrapping and
        // inlining with the nbsp hardened to a literal no-break space.
        let html = r#"x <mjx-container class="inline"><svg></svg></mjx-container> y"#;
        let result = Pipeline::new().run(html, "");
        assert!(result.html.contains("x\u{00a0}<span class=\"inline\">"));
        assert!(result.html.contains("</span>\u{00a0}y"));
    }
}

//! MathJax artifact normalization.
//!
//! The upstream Markdown renderer emits MathJax markup that the WeChat
//! rich-text renderer either strips or styles incorrectly: custom
//! `<mjx-container>` elements, screen-reader-only assistive MathML, and
//! class-based SVG stroke styling. This pass rewrites those artifacts into
//! plain tags and explicit attributes that survive publishing.
//!
//! All substitutions target distinct patterns, and the pass is idempotent:
//! running it on its own output changes nothing.

use std::sync::LazyLock;

use regex::Regex;

/// Inline math container, up to and including its closing tag.
static INLINE_CONTAINER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<mjx-container (class="inline.+?)</mjx-container>"#)
        .expect("invalid inline container regex")
});

/// Ordinary whitespace directly before an inline math span.
static SPACE_BEFORE_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s<span class="inline"#).expect("invalid leading space regex")
});

/// Ordinary whitespace directly after a closed math span.
static SPACE_AFTER_SVG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"svg></span>\s").expect("invalid trailing space regex"));

/// Assistive MathML block, a duplicate of the visual SVG output.
static ASSISTIVE_MML: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<mjx-assistive-mml.+?</mjx-assistive-mml>").expect("invalid assistive regex")
});

/// Normalize MathJax output for the WeChat renderer.
///
/// Inline containers become generic `<span>` elements (class attribute kept
/// verbatim), block containers are renamed to `section`, and whitespace
/// adjacent to inline math is hardened to `&nbsp;` because the target
/// renderer collapses it otherwise.
#[must_use]
pub fn normalize(html: &str) -> String {
    let html = INLINE_CONTAINER.replace_all(html, "<span $1</span>");
    let html = SPACE_BEFORE_INLINE.replace_all(&html, r#"&nbsp;<span class="inline"#);
    let html = SPACE_AFTER_SVG.replace_all(&html, "svg></span>&nbsp;");
    // Remaining containers are display math blocks. The renderer does not
    // reliably style custom elements, so rename them to a plain section.
    let html = html.replace("mjx-container", "section");
    // The mjx-solid class rule is lost once the stylesheet is stripped.
    let html = html.replace(r#"class="mjx-solid""#, r#"fill="none" stroke-width="70""#);
    ASSISTIVE_MML.replace_all(&html, "").into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_inline_container_becomes_span() {
        let html = r#"<mjx-container class="inline math"><svg></svg></mjx-container>"#;
        assert_eq!(
            normalize(html),
            r#"<span class="inline math"><svg></svg></span>"#
        );
    }

    #[test]
    fn test_block_container_renamed_to_section() {
        let html = r#"<mjx-container class="display"><svg></svg></mjx-container>"#;
        assert_eq!(
            normalize(html),
            r#"<section class="display"><svg></svg></section>"#
        );
    }

    #[test]
    fn test_nbsp_inserted_around_inline_math() {
        let html = r#"before <mjx-container class="inline"><svg></svg></mjx-container> after"#;
        let result = normalize(html);
        assert_eq!(
            result,
            r#"before&nbsp;<span class="inline"><svg></svg></span>&nbsp;after"#
        );
    }

    #[test]
    fn test_solid_class_becomes_explicit_attributes() {
        let html = r#"<line class="mjx-solid"></line>"#;
        assert_eq!(
            normalize(html),
            r#"<line fill="none" stroke-width="70"></line>"#
        );
    }

    #[test]
    fn test_assistive_mml_removed() {
        let html = r#"<p>x<mjx-assistive-mml unselectable="on"><math>x</math></mjx-assistive-mml></p>"#;
        assert_eq!(normalize(html), "<p>x</p>");
    }

    #[test]
    fn test_idempotent() {
        let html = r#"a <mjx-container class="inline"><svg></svg></mjx-container> b
<mjx-container class="display"><svg><line class="mjx-solid"></line></svg></mjx-container>"#;
        let once = normalize(html);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_plain_html_untouched() {
        let html = "<p>No math here</p>";
        assert_eq!(normalize(html), html);
    }
}

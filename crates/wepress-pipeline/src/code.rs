//! Code block chunking.
//!
//! The WeChat renderer applies its own line-height handling to `<code>`
//! elements and renders a multi-line block as a single run-on line. Splitting
//! the block into one `<code>` element per line keeps the original layout.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A `<code>` region: opening tag with attributes, body, closing tag.
static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(<code[^>]*>)(.*?)</code>").expect("invalid code regex"));

/// Split every `<code>` body into per-line `<code>` elements.
///
/// The opening tag (including attributes) is repeated for each line. The
/// final newline-split segment is dropped: a fenced block rendered by the
/// upstream converter always ends with a trailing newline, so the last
/// segment is empty and emitting it would produce a blank trailing line.
/// A body without any newline therefore yields no output at all.
#[must_use]
pub fn chunk(html: &str) -> String {
    CODE_BLOCK
        .replace_all(html, |caps: &Captures| {
            let open = &caps[1];
            let lines: Vec<&str> = caps[2].split('\n').collect();
            let mut out = String::with_capacity(caps[0].len());
            for line in &lines[..lines.len() - 1] {
                out.push_str(open);
                out.push_str(line);
                out.push_str("</code>");
            }
            out
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_multiline_block_splits_per_line() {
        assert_eq!(
            chunk("<code>a\nb\nc</code>"),
            "<code>a</code><code>b</code>"
        );
    }

    #[test]
    fn test_exactly_two_elements_for_three_lines() {
        let out = chunk("<code>a\nb\nc</code>");
        assert_eq!(out.matches("<code>").count(), 2);
    }

    #[test]
    fn test_trailing_newline_keeps_all_lines() {
        assert_eq!(
            chunk("<pre><code>one\ntwo\n</code></pre>"),
            "<pre><code>one</code><code>two</code></pre>"
        );
    }

    #[test]
    fn test_single_line_without_newline_is_dropped() {
        assert_eq!(chunk("<code>solo</code>"), "");
    }

    #[test]
    fn test_attributes_preserved_on_each_line() {
        assert_eq!(
            chunk(r#"<code class="language-rust">fn main() {}
</code>"#),
            r#"<code class="language-rust">fn main() {}</code>"#
        );
    }

    #[test]
    fn test_multiple_blocks_processed_independently() {
        let html = "<code>a\n</code><p>mid</p><code>b\nc\n</code>";
        assert_eq!(
            chunk(html),
            "<code>a</code><p>mid</p><code>b</code><code>c</code>"
        );
    }

    #[test]
    fn test_no_code_blocks_untouched() {
        assert_eq!(chunk("<p>text</p>"), "<p>text</p>");
    }
}

//! Callout blockquote restructuring.
//!
//! Obsidian-style callouts are blockquotes whose first paragraph starts with
//! a `[!type]` marker. The WeChat renderer has no native equivalent, so the
//! marker paragraph becomes a `<callout-title>` (with the marker replaced by
//! an icon from the compiled-in table), following paragraphs become
//! `<callout-content>` blocks, and the whole region is wrapped in
//! `<callout><callout-{type}>…</callout-{type}></callout>` so the stylesheet
//! can target it.
//!
//! The scanner walks block-level tag tokens left to right with an explicit
//! stack of open callout types; nesting depth always equals blockquote
//! nesting depth. A blockquote without a marker passes through byte for byte.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::icons;

/// Block-level tag tokens tracked by the scanner.
static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(/?)(blockquote|p|h[1-6])(\s[^>]*)?>").expect("invalid block tag regex")
});

/// Callout marker at the start of element text: `[!type]`.
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\[!([A-Za-z][A-Za-z0-9_-]*)\])").expect("invalid marker regex")
});

/// Result of a callout scan.
#[derive(Debug)]
pub struct CalloutOutcome {
    /// Restructured markup.
    pub html: String,
    /// Number of callout regions left unclosed at end of input.
    ///
    /// Non-zero only for malformed input (a blockquote that never closes).
    /// The region is still emitted, without its closing wrapper tags.
    pub unterminated: usize,
}

/// Detect and restructure callout blockquotes.
#[must_use]
pub fn transform(html: &str) -> CalloutOutcome {
    let mut out = String::with_capacity(html.len() + html.len() / 4);
    let mut stack: Vec<String> = Vec::new();
    let mut pos = 0;

    while let Some(caps) = BLOCK_TAG.captures_at(html, pos) {
        let Some(token) = caps.get(0) else { break };
        out.push_str(&html[pos..token.start()]);

        let closing = !caps[1].is_empty();
        let tag = caps[2].to_ascii_lowercase();

        if tag == "blockquote" {
            if closing && let Some(ty) = stack.pop() {
                out.push_str(&format!("</callout-{ty}></callout>"));
            }
            out.push_str(token.as_str());
            pos = token.end();
            continue;
        }

        // Paragraph or heading. Opens are inspected with their full content;
        // closes reached here belong to elements we already passed through.
        if closing {
            out.push_str(token.as_str());
            pos = token.end();
            continue;
        }

        let Some((close_start, close_end)) = find_close(html, token.end(), &tag) else {
            out.push_str(token.as_str());
            pos = token.end();
            continue;
        };
        let content = &html[token.end()..close_start];
        let close_token = &html[close_start..close_end];

        if let Some(marker) = MARKER.captures(content) {
            let ty = marker[2].to_ascii_lowercase();
            // Lookup miss keeps the marker text; the type still opens a callout.
            let title = match icons::icon_for(&marker[2]) {
                Some(svg) => content.replacen(&marker[1], svg, 1),
                None => content.to_owned(),
            };
            out.push_str(&format!("<callout><callout-{ty}><callout-title>"));
            if tag == "p" {
                out.push_str(&title);
            } else {
                out.push_str(token.as_str());
                out.push_str(&title);
                out.push_str(close_token);
            }
            out.push_str("</callout-title>");
            stack.push(ty);
        } else if stack.is_empty() {
            out.push_str(token.as_str());
            pos = token.end();
            continue;
        } else {
            out.push_str("<callout-content>");
            out.push_str(token.as_str());
            out.push_str(content);
            out.push_str(close_token);
            out.push_str("</callout-content>");
        }
        pos = close_end;
    }
    out.push_str(&html[pos..]);

    let unterminated = stack.len();
    if unterminated > 0 {
        warn!(depth = unterminated, "unterminated callout blockquote");
    }
    CalloutOutcome { html: out, unterminated }
}

/// Find the closing token of `tag` starting at `from`.
fn find_close(html: &str, from: usize, tag: &str) -> Option<(usize, usize)> {
    let mut pos = from;
    while let Some(caps) = BLOCK_TAG.captures_at(html, pos) {
        let token = caps.get(0)?;
        if !caps[1].is_empty() && caps[2].eq_ignore_ascii_case(tag) {
            return Some((token.start(), token.end()));
        }
        pos = token.end();
    }
    None
}

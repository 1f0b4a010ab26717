//! HTML entity to Unicode conversion.
//!
//! The inlining pass parses the document as XML, which only knows the five
//! predefined entities. Named HTML entities (including the `&nbsp;` inserted
//! by math normalization) are converted to their Unicode characters first;
//! `amp`, `lt`, `gt`, `quot` and `apos` are left for the XML parser.

use std::sync::LazyLock;

use regex::Regex;

/// Named HTML entity reference.
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z]+);").expect("invalid entity regex"));

/// Replace named HTML entities with Unicode characters.
pub(crate) fn convert_html_entities(html: &str) -> String {
    ENTITY
        .replace_all(html, |caps: &regex::Captures| {
            entity_to_unicode(&caps[1]).map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned()
}

/// Map an entity name to its character, or `None` to keep it as-is.
fn entity_to_unicode(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "hellip" => "\u{2026}",
        "middot" => "\u{00b7}",
        "bull" => "\u{2022}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",
        "plusmn" => "\u{00b1}",
        "deg" => "\u{00b0}",
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "larr" => "\u{2190}",
        "rarr" => "\u{2192}",
        // XML entities and anything unknown stay untouched
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nbsp_converted() {
        assert_eq!(convert_html_entities("a&nbsp;b"), "a\u{00a0}b");
    }

    #[test]
    fn test_xml_entities_preserved() {
        assert_eq!(convert_html_entities("&amp;&lt;&gt;"), "&amp;&lt;&gt;");
    }

    #[test]
    fn test_unknown_entity_preserved() {
        assert_eq!(convert_html_entities("&bogus;"), "&bogus;");
    }
}

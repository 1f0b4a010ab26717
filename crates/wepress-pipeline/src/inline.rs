//! Style attribute inlining.
//!
//! The WeChat renderer strips `<style>` blocks and class-based styling at
//! render time, so every matching declaration has to land on the element
//! itself. The document (well-formed by this point, as inlining is the last
//! stage) is parsed into a tree, matched against the stylesheet with full
//! ancestor context, and re-serialized with computed `style` attributes.
//!
//! Cascade order per element: matched rules by specificity and source order,
//! overridden by a pre-existing inline `style`, overridden in turn by
//! `!important` rules, whose flag is kept in the emitted value.
//! Pseudo-element rules (`::before`/`::after`) are materialized as real
//! `<span>` elements since the published markup has no live CSS engine.

use std::fmt::Write;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::entities::convert_html_entities;
use crate::error::InlineError;
use crate::style::{self, PseudoElement, Rule, Selector, Stylesheet};

/// Synthetic wrapper so fragments with multiple top-level nodes parse.
const ROOT_WRAPPER: &str = "wepress-root";

/// Inline matching stylesheet rules into `style` attributes.
pub fn inline(html: &str, css: &str) -> Result<String, InlineError> {
    let sheet = style::parse(css)?;
    let html = convert_html_entities(html);
    let mut root = parse_document(&html)?;

    let mut ancestors = Vec::new();
    for child in &mut root.children {
        if let Node::Element(el) = child {
            apply(el, &sheet, &mut ancestors);
        }
    }

    Ok(serialize(&root))
}

#[derive(Debug, Default)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
    self_closing: bool,
}

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

/// Element identity used for selector matching.
#[derive(Debug, Clone)]
struct ElementKey {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
}

fn parse_document(html: &str) -> Result<Element, InlineError> {
    let wrapped = format!("<{ROOT_WRAPPER}>{html}</{ROOT_WRAPPER}>");
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(false);

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == ROOT_WRAPPER.as_bytes() => break,
            Event::Eof => return Ok(Element::default()),
            _ => {}
        }
    }

    let mut root = Element {
        tag: ROOT_WRAPPER.to_owned(),
        ..Element::default()
    };
    parse_children(&mut reader, &mut root)?;
    Ok(root)
}

fn parse_children(reader: &mut Reader<&[u8]>, parent: &mut Element) -> Result<(), InlineError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let mut child = element_from_start(&e, false);
                parse_children(reader, &mut child)?;
                parent.children.push(Node::Element(child));
            }
            Event::Empty(e) => {
                parent
                    .children
                    .push(Node::Element(element_from_start(&e, true)));
            }
            Event::Text(e) => push_text(parent, &String::from_utf8_lossy(&e)),
            Event::GeneralRef(e) => {
                let name = String::from_utf8_lossy(&e).into_owned();
                push_text(parent, &decode_entity(&name));
            }
            Event::CData(e) => push_text(parent, &String::from_utf8_lossy(&e)),
            Event::End(_) | Event::Eof => return Ok(()),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }
}

fn element_from_start(e: &BytesStart, self_closing: bool) -> Element {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        attrs.push((key, value));
    }
    Element {
        tag,
        attrs,
        children: Vec::new(),
        self_closing,
    }
}

/// Append text, merging with a preceding text node.
fn push_text(parent: &mut Element, text: &str) {
    if let Some(Node::Text(last)) = parent.children.last_mut() {
        last.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_owned()));
    }
}

/// Decode an XML entity reference to its character value.
fn decode_entity(name: &str) -> String {
    match name {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{name};"), |c| c.to_string())
        }
        _ => format!("&{name};"),
    }
}

fn key_of(el: &Element) -> ElementKey {
    let id = el
        .attrs
        .iter()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.clone());
    let classes = el
        .attrs
        .iter()
        .find(|(k, _)| k == "class")
        .map(|(_, v)| v.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default();
    ElementKey {
        tag: el.tag.to_ascii_lowercase(),
        id,
        classes,
    }
}

/// Match a selector against an element with its ancestor chain.
fn selector_matches(selector: &Selector, key: &ElementKey, ancestors: &[ElementKey]) -> bool {
    let Some((subject, rest)) = selector.path.split_last() else {
        return false;
    };
    if !subject.matches(&key.tag, key.id.as_deref(), &key.classes) {
        return false;
    }
    // Remaining compounds must match ancestors outermost-first, each one
    // strictly closer to the root than the previous (descendant combinator).
    let mut idx = ancestors.len();
    for compound in rest.iter().rev() {
        let mut found = false;
        while idx > 0 {
            idx -= 1;
            let anc = &ancestors[idx];
            if compound.matches(&anc.tag, anc.id.as_deref(), &anc.classes) {
                found = true;
                break;
            }
        }
        if !found {
            return false;
        }
    }
    true
}

fn apply(el: &mut Element, sheet: &Stylesheet, ancestors: &mut Vec<ElementKey>) {
    let key = key_of(el);

    let mut matched: Vec<&Rule> = sheet
        .rules
        .iter()
        .filter(|rule| selector_matches(&rule.selector, &key, ancestors))
        .collect();
    matched.sort_by_key(|rule| (rule.selector.specificity(), rule.order));

    let mut props: Vec<(String, String)> = Vec::new();
    for rule in matched.iter().filter(|r| r.selector.pseudo.is_none()) {
        for decl in &rule.declarations {
            if !decl.important {
                set_prop(&mut props, &decl.property, &decl.value);
            }
        }
    }
    let existing = attr_value(el, "style").map(ToOwned::to_owned);
    if let Some(existing) = existing {
        for (prop, value) in parse_inline_style(&existing) {
            set_prop(&mut props, &prop, &value);
        }
    }
    for rule in matched.iter().filter(|r| r.selector.pseudo.is_none()) {
        for decl in &rule.declarations {
            if decl.important {
                set_prop(&mut props, &decl.property, &format!("{} !important", decl.value));
            }
        }
    }
    if !props.is_empty() {
        set_attr(el, "style", &format_style(&props));
    }

    let before = pseudo_span(&matched, PseudoElement::Before);
    let after = pseudo_span(&matched, PseudoElement::After);

    ancestors.push(key);
    for child in &mut el.children {
        if let Node::Element(c) = child {
            apply(c, sheet, ancestors);
        }
    }
    ancestors.pop();

    // Inserted after recursion so synthetic spans are never matched themselves
    if let Some(span) = before {
        el.children.insert(0, Node::Element(span));
        el.self_closing = false;
    }
    if let Some(span) = after {
        el.children.push(Node::Element(span));
        el.self_closing = false;
    }
}

/// Build the `<span>` carrying a pseudo-element's declarations and content.
fn pseudo_span(matched: &[&Rule], which: PseudoElement) -> Option<Element> {
    let rules: Vec<_> = matched
        .iter()
        .filter(|r| r.selector.pseudo == Some(which))
        .collect();
    if rules.is_empty() {
        return None;
    }

    let mut props: Vec<(String, String)> = Vec::new();
    let mut content = String::new();
    for rule in rules {
        for decl in &rule.declarations {
            if decl.property == "content" {
                content = unquote(&decl.value);
            } else if decl.important {
                set_prop(&mut props, &decl.property, &format!("{} !important", decl.value));
            } else {
                set_prop(&mut props, &decl.property, &decl.value);
            }
        }
    }

    let mut span = Element {
        tag: "span".to_owned(),
        ..Element::default()
    };
    if !props.is_empty() {
        span.attrs.push(("style".to_owned(), format_style(&props)));
    }
    if !content.is_empty() {
        span.children.push(Node::Text(content));
    }
    Some(span)
}

/// Strip quotes from a `content` value; `none`/`normal` yield empty text.
fn unquote(value: &str) -> String {
    let value = value.trim();
    if value == "none" || value == "normal" {
        return String::new();
    }
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_owned();
        }
    }
    value.to_owned()
}

fn attr_value<'a>(el: &'a Element, name: &str) -> Option<&'a str> {
    el.attrs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn set_attr(el: &mut Element, name: &str, value: &str) {
    if let Some(attr) = el.attrs.iter_mut().find(|(k, _)| k == name) {
        attr.1 = value.to_owned();
    } else {
        el.attrs.push((name.to_owned(), value.to_owned()));
    }
}

/// Set a property, overwriting in place to keep first-written order.
fn set_prop(props: &mut Vec<(String, String)>, prop: &str, value: &str) {
    if let Some(entry) = props.iter_mut().find(|(p, _)| p == prop) {
        entry.1 = value.to_owned();
    } else {
        props.push((prop.to_owned(), value.to_owned()));
    }
}

fn parse_inline_style(text: &str) -> Vec<(String, String)> {
    let mut props = Vec::new();
    for item in text.split(';') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if let Some(colon) = item.find(':') {
            let prop = item[..colon].trim().to_ascii_lowercase();
            let value = item[colon + 1..].trim();
            if !prop.is_empty() && !value.is_empty() {
                props.push((prop, value.to_owned()));
            }
        }
    }
    props
}

fn format_style(props: &[(String, String)]) -> String {
    props
        .iter()
        .map(|(prop, value)| format!("{prop}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn serialize(root: &Element) -> String {
    let mut out = String::with_capacity(4096);
    for child in &root.children {
        serialize_node(child, &mut out);
    }
    out
}

fn serialize_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (key, value) in &el.attrs {
                write!(out, r#" {}="{}""#, key, escape_attr(value)).unwrap();
            }
            if el.children.is_empty() && el.self_closing {
                out.push_str(" />");
            } else {
                out.push('>');
                for child in &el.children {
                    serialize_node(child, out);
                }
                write!(out, "</{}>", el.tag).unwrap();
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    escape_markup(text, false)
}

fn escape_attr(text: &str) -> String {
    escape_markup(text, true)
}

fn escape_markup(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_type_selector_inlined() {
        let html = "<p>text</p>";
        let out = inline(html, "p { color: red }").expect("inline");
        assert_eq!(out, r#"<p style="color: red">text</p>"#);
    }

    #[test]
    fn test_descendant_selector_requires_ancestor() {
        let html = r#"<section id="nice"><p>in</p></section><p>out</p>"#;
        let out = inline(html, "#nice p { color: red }").expect("inline");
        assert!(out.contains(r#"<p style="color: red">in</p>"#));
        assert!(out.contains("<p>out</p>"));
    }

    #[test]
    fn test_specificity_orders_cascade() {
        let html = r#"<p class="lead">text</p>"#;
        let css = ".lead { color: blue } p { color: red; margin: 0 }";
        let out = inline(html, css).expect("inline");
        // class beats type for color, margin still applies
        assert!(out.contains("color: blue"));
        assert!(out.contains("margin: 0"));
        assert!(!out.contains("color: red"));
    }

    #[test]
    fn test_important_beats_existing_inline_style() {
        let html = r#"<p class="x" style="color: blue">text</p>"#;
        let out = inline(html, ".x { color: red !important }").expect("inline");
        assert!(out.contains("color: red !important"));
        assert!(!out.contains("color: blue"));
    }

    #[test]
    fn test_existing_inline_style_beats_normal_rule() {
        let html = r#"<p style="color: blue">text</p>"#;
        let out = inline(html, "p { color: red }").expect("inline");
        assert!(out.contains("color: blue"));
        assert!(!out.contains("color: red"));
    }

    #[test]
    fn test_pseudo_before_materialized_as_span() {
        let html = "<blockquote><p>quote</p></blockquote>";
        let css = "blockquote::before { content: '\u{201c}'; color: gray }";
        let out = inline(html, css).expect("inline");
        let expected = format!(r#"<blockquote><span style="color: gray">{}</span>"#, '\u{201c}');
        assert!(out.contains(&expected));
    }

    #[test]
    fn test_pseudo_after_appended() {
        let html = "<p>x</p>";
        let out = inline(html, "p::after { content: \"!\" }").expect("inline");
        assert_eq!(out, "<p>x<span>!</span></p>");
    }

    #[test]
    fn test_malformed_stylesheet_is_an_error() {
        assert!(inline("<p>x</p>", "p { color: red").is_err());
    }

    #[test]
    fn test_unmatched_elements_untouched() {
        let out = inline("<div><em>x</em></div>", "p { color: red }").expect("inline");
        assert_eq!(out, "<div><em>x</em></div>");
    }

    #[test]
    fn test_nbsp_entity_survives_as_unicode() {
        let out = inline("<p>a&nbsp;b</p>", "").expect("inline");
        assert_eq!(out, "<p>a\u{00a0}b</p>");
    }

    #[test]
    fn test_self_closing_element_preserved() {
        let out = inline(r#"<p><img src="x.png" alt="" /></p>"#, "").expect("inline");
        assert_eq!(out, r#"<p><img src="x.png" alt="" /></p>"#);
    }

    #[test]
    fn test_style_attribute_replaced_in_place() {
        let html = r#"<p style="margin: 1px" class="x">t</p>"#;
        let out = inline(html, ".x { color: red }").expect("inline");
        // style attribute stays first, merged value
        assert!(out.starts_with(r#"<p style="color: red; margin: 1px""#));
    }
}

//! Minimal stylesheet model for style inlining.
//!
//! Parses the subset of CSS the inliner can honor: rules with type, class,
//! id and universal selectors, descendant combinators, and the
//! `::before`/`::after` pseudo-elements. Selectors using other features
//! (attribute selectors, child/sibling combinators, pseudo-classes) are
//! skipped; structural errors in the stylesheet are reported so the caller
//! can fall back to the un-inlined document.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::StyleError;

/// CSS comment block.
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("invalid comment regex"));

/// A single `property: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name, lowercased.
    pub property: String,
    /// Value text with any `!important` suffix removed.
    pub value: String,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

/// Pseudo-element a rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoElement {
    /// `::before` — materialized at the start of the element.
    Before,
    /// `::after` — materialized at the end of the element.
    After,
}

/// One compound selector (`tag.class#id` with no combinators).
#[derive(Debug, Clone, Default)]
pub struct Compound {
    /// Type selector, lowercased. `None` matches any tag (`*` or absent).
    pub tag: Option<String>,
    /// Id selector.
    pub id: Option<String>,
    /// Class selectors, all of which must be present.
    pub classes: Vec<String>,
}

impl Compound {
    /// Check whether this compound matches an element.
    pub(crate) fn matches(&self, tag: &str, id: Option<&str>, classes: &[String]) -> bool {
        if let Some(want) = &self.tag
            && want != tag
        {
            return false;
        }
        if let Some(want) = &self.id
            && Some(want.as_str()) != id
        {
            return false;
        }
        self.classes
            .iter()
            .all(|want| classes.iter().any(|have| have == want))
    }
}

/// A parsed selector: a descendant chain of compounds plus optional
/// pseudo-element. The last compound matches the subject element.
#[derive(Debug, Clone)]
pub struct Selector {
    /// Descendant chain, outermost ancestor first.
    pub path: Vec<Compound>,
    /// Pseudo-element suffix, if any.
    pub pseudo: Option<PseudoElement>,
}

impl Selector {
    /// Specificity as (ids, classes, types), compared lexicographically.
    #[must_use]
    pub fn specificity(&self) -> (usize, usize, usize) {
        let mut ids = 0;
        let mut classes = 0;
        let mut types = 0;
        for compound in &self.path {
            if compound.id.is_some() {
                ids += 1;
            }
            classes += compound.classes.len();
            if compound.tag.is_some() {
                types += 1;
            }
        }
        (ids, classes, types)
    }
}

/// One rule: a selector with its declarations and source position.
#[derive(Debug, Clone)]
pub struct Rule {
    /// The selector this rule matches.
    pub selector: Selector,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
    /// Source order index, used as the cascade tiebreak.
    pub order: usize,
}

/// A parsed stylesheet.
#[derive(Debug, Default)]
pub struct Stylesheet {
    /// Rules in source order. A selector list produces one rule per selector.
    pub rules: Vec<Rule>,
}

/// Parse a stylesheet.
pub fn parse(css: &str) -> Result<Stylesheet, StyleError> {
    let css = COMMENT.replace_all(css, "");
    let mut rules = Vec::new();
    let mut order = 0;
    let mut rest: &str = &css;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if rest.starts_with('@') {
            rest = skip_at_rule(rest)?;
            continue;
        }

        let Some(open) = rest.find('{') else {
            return Err(StyleError::UnbalancedBraces);
        };
        let selector_text = rest[..open].trim();
        if selector_text.is_empty() {
            return Err(StyleError::MissingSelector);
        }
        if selector_text.contains('}') {
            return Err(StyleError::UnbalancedBraces);
        }
        let Some(close) = rest[open + 1..].find('}') else {
            return Err(StyleError::UnbalancedBraces);
        };
        let declarations = parse_declarations(&rest[open + 1..open + 1 + close])?;

        for text in selector_text.split(',') {
            let text = text.trim();
            if let Some(selector) = parse_selector(text) {
                rules.push(Rule {
                    selector,
                    declarations: declarations.clone(),
                    order,
                });
                order += 1;
            } else {
                tracing::debug!(selector = text, "skipping unsupported selector");
            }
        }
        rest = &rest[open + 1 + close + 1..];
    }

    Ok(Stylesheet { rules })
}

/// Skip an at-rule: statement forms end at `;`, block forms are skipped
/// with brace counting.
fn skip_at_rule(rest: &str) -> Result<&str, StyleError> {
    let semi = rest.find(';');
    let open = rest.find('{');
    match (semi, open) {
        (Some(s), Some(o)) if s < o => Ok(&rest[s + 1..]),
        (Some(s), None) => Ok(&rest[s + 1..]),
        (_, Some(o)) => {
            let mut depth: usize = 0;
            for (i, ch) in rest[o..].char_indices() {
                match ch {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(&rest[o + i + 1..]);
                        }
                    }
                    _ => {}
                }
            }
            Err(StyleError::UnbalancedBraces)
        }
        (None, None) => Err(StyleError::UnbalancedBraces),
    }
}

/// Parse the declarations inside a rule block.
fn parse_declarations(block: &str) -> Result<Vec<Declaration>, StyleError> {
    let mut declarations = Vec::new();
    for item in block.split(';') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let Some(colon) = item.find(':') else {
            return Err(StyleError::MalformedDeclaration(item.to_owned()));
        };
        let property = item[..colon].trim().to_ascii_lowercase();
        let mut value = item[colon + 1..].trim().to_owned();
        if property.is_empty() || value.is_empty() {
            return Err(StyleError::MalformedDeclaration(item.to_owned()));
        }
        let mut important = false;
        if value.to_ascii_lowercase().ends_with("!important") {
            important = true;
            value.truncate(value.len() - "!important".len());
            let trimmed = value.trim_end().len();
            value.truncate(trimmed);
            if value.is_empty() {
                return Err(StyleError::MalformedDeclaration(item.to_owned()));
            }
        }
        declarations.push(Declaration {
            property,
            value,
            important,
        });
    }
    Ok(declarations)
}

/// Parse one selector, or `None` if it uses unsupported syntax.
fn parse_selector(text: &str) -> Option<Selector> {
    if text.is_empty() {
        return None;
    }
    let (text, pseudo) = split_pseudo(text);
    if text.is_empty() {
        return None;
    }
    if text.chars().any(|c| "[]>+~:()".contains(c)) {
        return None;
    }
    let mut path = Vec::new();
    for part in text.split_whitespace() {
        path.push(parse_compound(part)?);
    }
    if path.is_empty() {
        return None;
    }
    Some(Selector { path, pseudo })
}

/// Split a trailing pseudo-element suffix off a selector.
fn split_pseudo(text: &str) -> (&str, Option<PseudoElement>) {
    let suffixes = [
        ("::before", PseudoElement::Before),
        ("::after", PseudoElement::After),
        (":before", PseudoElement::Before),
        (":after", PseudoElement::After),
    ];
    for (suffix, pseudo) in suffixes {
        if let Some(stripped) = text.strip_suffix(suffix) {
            return (stripped.trim_end(), Some(pseudo));
        }
    }
    (text, None)
}

/// Parse a `tag.class#id` compound.
fn parse_compound(part: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = part;

    if !rest.starts_with(['.', '#']) {
        let end = rest.find(['.', '#']).unwrap_or(rest.len());
        let tag = &rest[..end];
        if tag != "*" {
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[end..];
    }

    while !rest.is_empty() {
        let kind = rest.chars().next()?;
        let body = &rest[1..];
        let end = body.find(['.', '#']).unwrap_or(body.len());
        let name = &body[..end];
        if name.is_empty() {
            return None;
        }
        match kind {
            '.' => compound.classes.push(name.to_owned()),
            '#' => compound.id = Some(name.to_owned()),
            _ => return None,
        }
        rest = &body[end..];
    }

    Some(compound)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_simple_rule() {
        let sheet = parse("p { color: red; margin: 0 }").expect("parse");
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.selector.path[0].tag.as_deref(), Some("p"));
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[0].property, "color");
        assert_eq!(rule.declarations[0].value, "red");
        assert!(!rule.declarations[0].important);
    }

    #[test]
    fn test_important_flag_stripped_from_value() {
        let sheet = parse(".x { color: red !important; }").expect("parse");
        let decl = &sheet.rules[0].declarations[0];
        assert_eq!(decl.value, "red");
        assert!(decl.important);
    }

    #[test]
    fn test_selector_list_yields_one_rule_each() {
        let sheet = parse("h1, h2, .title { font-weight: bold }").expect("parse");
        assert_eq!(sheet.rules.len(), 3);
        assert_eq!(sheet.rules[2].order, 2);
    }

    #[test]
    fn test_specificity() {
        let sheet = parse("#nice p.lead { color: blue }").expect("parse");
        assert_eq!(sheet.rules[0].selector.specificity(), (1, 1, 1));
    }

    #[test]
    fn test_pseudo_element_detected() {
        let sheet = parse("blockquote::before { content: '\u{201c}' }").expect("parse");
        assert_eq!(
            sheet.rules[0].selector.pseudo,
            Some(PseudoElement::Before)
        );
    }

    #[test]
    fn test_unsupported_selector_skipped() {
        let sheet = parse("a:hover { color: red } p { color: blue }").expect("parse");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selector.path[0].tag.as_deref(), Some("p"));
    }

    #[test]
    fn test_at_rules_skipped() {
        let css = "@import url(x.css); @media print { p { display: none } } p { color: red }";
        let sheet = parse(css).expect("parse");
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn test_unbalanced_braces_rejected() {
        assert!(matches!(
            parse("p { color: red"),
            Err(StyleError::UnbalancedBraces)
        ));
    }

    #[test]
    fn test_missing_selector_rejected() {
        assert!(matches!(
            parse("{ color: red }"),
            Err(StyleError::MissingSelector)
        ));
    }

    #[test]
    fn test_malformed_declaration_rejected() {
        assert!(matches!(
            parse("p { color red }"),
            Err(StyleError::MalformedDeclaration(_))
        ));
    }

    #[test]
    fn test_compound_matching() {
        let sheet = parse("p.lead.big { color: red }").expect("parse");
        let compound = &sheet.rules[0].selector.path[0];
        let classes = vec!["big".to_owned(), "lead".to_owned()];
        assert!(compound.matches("p", None, &classes));
        assert!(!compound.matches("p", None, &classes[..1].to_vec()));
        assert!(!compound.matches("div", None, &classes));
    }
}

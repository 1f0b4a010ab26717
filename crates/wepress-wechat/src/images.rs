//! Markdown image reference rewriting.
//!
//! Local images referenced by an article have to be uploaded before the
//! draft is submitted; each `![alt](path)` reference is then replaced by the
//! CDN URL the platform handed back. Substitution is keyed by the source
//! path of each individual match, never by position, so concurrent uploads
//! can resolve in any order without cross-assigning URLs.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Markdown image reference: `![alt](path)`.
static IMAGE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("invalid image ref regex"));

/// Collect referenced image paths in order of first appearance, deduplicated.
#[must_use]
pub fn image_paths(content: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in IMAGE_REF.captures_iter(content) {
        let path = &caps[2];
        if !path.is_empty() && !seen.iter().any(|p| p == path) {
            seen.push(path.to_owned());
        }
    }
    seen
}

/// Replace each image reference whose path appears in `resolved` with its
/// uploaded URL. References without an entry are left untouched.
#[must_use]
pub fn rewrite_image_refs(content: &str, resolved: &HashMap<String, String>) -> String {
    IMAGE_REF
        .replace_all(content, |caps: &Captures| match resolved.get(&caps[2]) {
            Some(url) => format!("![image]({url})"),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

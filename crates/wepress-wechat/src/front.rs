//! Article front matter.
//!
//! Publish metadata lives in a YAML front matter block at the top of the
//! Markdown file. The block is split off before rendering; its fields feed
//! the draft submission.

use serde::Deserialize;

use crate::error::WechatError;

/// Front matter delimiter line.
const DELIMITER: &str = "---";

/// Metadata parsed from a front matter block. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArticleMeta {
    /// Article title; falls back to the first heading or the filename.
    pub title: Option<String>,
    /// Display author.
    pub author: Option<String>,
    /// Feed summary.
    pub digest: Option<String>,
    /// "Read original" link.
    pub source_url: Option<String>,
    /// Permanent media id of the cover image.
    pub thumb_media_id: Option<String>,
    /// Whether comments are open.
    pub open_comment: Option<bool>,
}

/// Split front matter off a Markdown document.
///
/// Returns the parsed metadata and the remaining body. A document without a
/// leading `---` block yields default metadata and the body unchanged.
pub fn split_front_matter(markdown: &str) -> Result<(ArticleMeta, &str), WechatError> {
    let Some(rest) = markdown.strip_prefix(DELIMITER) else {
        return Ok((ArticleMeta::default(), markdown));
    };
    let rest = rest.strip_prefix('\n').unwrap_or(rest);

    let Some(end) = rest.find(&format!("\n{DELIMITER}")) else {
        return Ok((ArticleMeta::default(), markdown));
    };
    let block = &rest[..end];
    let mut body = &rest[end + 1 + DELIMITER.len()..];
    if let Some(stripped) = body.strip_prefix('\n') {
        body = stripped;
    }

    if block.trim().is_empty() {
        return Ok((ArticleMeta::default(), body));
    }
    let meta = serde_yaml::from_str(block)
        .map_err(|e| WechatError::FrontMatter(format!("invalid YAML: {e}")))?;
    Ok((meta, body))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_front_matter_split_off() {
        let md = "---\ntitle: Hello\nauthor: Ann\n---\n# Body\n";
        let (meta, body) = split_front_matter(md).expect("split");
        assert_eq!(meta.title.as_deref(), Some("Hello"));
        assert_eq!(meta.author.as_deref(), Some("Ann"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_document_without_front_matter() {
        let md = "# Just a heading\n";
        let (meta, body) = split_front_matter(md).expect("split");
        assert!(meta.title.is_none());
        assert_eq!(body, md);
    }

    #[test]
    fn test_unterminated_block_treated_as_body() {
        let md = "---\ntitle: Hello\nno end";
        let (meta, body) = split_front_matter(md).expect("split");
        assert!(meta.title.is_none());
        assert_eq!(body, md);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let md = "---\n{ not yaml\n---\nbody";
        assert!(split_front_matter(md).is_err());
    }
}

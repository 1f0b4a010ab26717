//! Markdown to HTML rendering.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

/// Rendered document.
pub struct Rendered {
    /// Raw HTML, before pipeline transformation.
    pub html: String,
    /// Text of the first H1 heading, if any.
    pub title: Option<String>,
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Render Markdown to HTML, capturing the first H1 text as a title candidate.
#[must_use]
pub fn render_markdown(markdown: &str) -> Rendered {
    let mut title: Option<String> = None;
    let mut in_first_h1 = false;
    let mut title_buf = String::new();

    let events: Vec<Event<'_>> = Parser::new_ext(markdown, parser_options())
        .inspect(|event| match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if title.is_none() => {
                in_first_h1 = true;
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if in_first_h1 => {
                in_first_h1 = false;
                title = Some(title_buf.trim().to_string());
            }
            Event::Text(text) | Event::Code(text) if in_first_h1 => {
                title_buf.push_str(text);
            }
            _ => {}
        })
        .collect();

    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());

    tracing::debug!(bytes = out.len(), title = ?title, "rendered markdown");

    Rendered { html: out, title }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let rendered = render_markdown("# Title\n\nSome *text*.\n");
        assert_eq!(rendered.title.as_deref(), Some("Title"));
        assert!(rendered.html.contains("<h1>Title</h1>"));
        assert!(rendered.html.contains("<em>text</em>"));
    }

    #[test]
    fn test_title_comes_from_first_h1_only() {
        let rendered = render_markdown("## Sub\n\n# First\n\n# Second\n");
        assert_eq!(rendered.title.as_deref(), Some("First"));
    }

    #[test]
    fn test_no_heading_no_title() {
        let rendered = render_markdown("just a paragraph\n");
        assert!(rendered.title.is_none());
        assert_eq!(rendered.html, "<p>just a paragraph</p>\n");
    }

    #[test]
    fn test_tables_enabled() {
        let rendered = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(rendered.html.contains("<table>"));
    }
}

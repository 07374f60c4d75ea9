//! # HTML → Markdown Normalization
//!
//! Thin wrapper over `htmd`, applied to fetched HTML when the feed opts in.

use htmd::{Element, HtmlToMarkdown};

use crate::errors::IngestError;

/// Converts fetched HTML to Markdown.
///
/// Scripts and styles are dropped, and anchors render as their text content
/// only — link targets are stripped. On failure the caller abandons the
/// entry; no partial content is ever submitted.
pub fn html_to_markdown(html: &str) -> Result<String, IngestError> {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style"])
        .add_handler(vec!["a"], |element: Element| {
            Some(element.content.to_string())
        })
        .build();
    converter
        .convert(html)
        .map_err(|e| IngestError::Convert(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_headings_and_paragraphs() {
        let markdown = html_to_markdown("<h1>Title</h1><p>Body text</p>").unwrap();
        assert!(markdown.contains("# Title"));
        assert!(markdown.contains("Body text"));
    }

    #[test]
    fn anchors_keep_text_and_lose_targets() {
        let markdown =
            html_to_markdown(r#"<p>Read <a href="https://example.com/post">the post</a></p>"#)
                .unwrap();
        assert!(markdown.contains("the post"));
        assert!(!markdown.contains("example.com"));
        assert!(!markdown.contains("]("));
    }

    #[test]
    fn scripts_and_styles_are_dropped() {
        let markdown = html_to_markdown(
            "<style>p { color: red }</style><p>kept</p><script>alert(1)</script>",
        )
        .unwrap();
        assert!(markdown.contains("kept"));
        assert!(!markdown.contains("alert"));
        assert!(!markdown.contains("color"));
    }
}

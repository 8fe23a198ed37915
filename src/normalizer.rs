// 🧹 Text Normalizer - Filing markup → plain text
// Never fails: malformed documents yield whatever text the parser recovers

use scraper::{ElementRef, Html, Node};

/// Elements whose content is never reader-visible text
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "head", "title", "noscript", "ix:header"];

/// Elements that separate words even without surrounding whitespace
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "tr", "td", "th", "li", "ul", "ol", "table", "h1", "h2", "h3", "h4",
    "h5", "h6", "section", "article", "hr", "body",
];

pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        TextNormalizer
    }

    /// Decode, strip tags, decode entities, collapse whitespace
    ///
    /// `content_type` is the response Content-Type if known. Plain text bodies
    /// skip the HTML parse.
    pub fn normalize(&self, raw: &[u8], content_type: Option<&str>) -> String {
        let decoded = String::from_utf8_lossy(raw);

        if is_plain_text(content_type) || !decoded.contains('<') {
            return collapse_whitespace(&decoded);
        }

        let document = Html::parse_document(&decoded);
        let mut text = String::with_capacity(decoded.len() / 2);
        collect_text(document.root_element(), &mut text);

        collapse_whitespace(&text)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_plain_text(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("text/plain"))
        .unwrap_or(false)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }

                let separates = BLOCK_ELEMENTS.contains(&name);
                if separates {
                    out.push(' ');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if separates {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Collapse any whitespace run (including &nbsp;) to one space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(html: &str) -> String {
        TextNormalizer::new().normalize(html.as_bytes(), Some("text/html"))
    }

    #[test]
    fn test_strips_tags_and_collapses_whitespace() {
        let text = normalize("<html><body><p>Apple   Inc.</p>\n\n<p>announced\ttoday</p></body></html>");
        assert_eq!(text, "Apple Inc. announced today");
    }

    #[test]
    fn test_decodes_entities() {
        let text = normalize("<p>Research&nbsp;&amp;&nbsp;Development &quot;Vision Pro&quot; &#8212; now</p>");
        assert_eq!(text, "Research & Development \"Vision Pro\" \u{2014} now");
    }

    #[test]
    fn test_drops_script_and_style() {
        let text = normalize(
            "<html><head><style>p { color: red }</style></head>\
             <body><script>var launch = 1;</script><p>Visible</p></body></html>",
        );
        assert_eq!(text, "Visible");
    }

    #[test]
    fn test_block_elements_separate_words() {
        let text = normalize("<table><tr><td>Item</td><td>8.01</td></tr></table><div>Other</div><div>Events</div>");
        assert_eq!(text, "Item 8.01 Other Events");
    }

    #[test]
    fn test_malformed_markup_degrades() {
        let text = normalize("<p>Unclosed <b>bold <i>text</p><div>after </span> stray");
        assert!(text.contains("Unclosed"));
        assert!(text.contains("bold"));
        assert!(text.contains("after"));
        assert!(text.contains("stray"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_plain_text_hint_skips_parse() {
        let raw = b"Line one\n\n   <not a tag>   line two";
        let text = TextNormalizer::new().normalize(raw, Some("text/plain; charset=utf-8"));
        assert_eq!(text, "Line one <not a tag> line two");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let raw = [b'o', b'k', 0xff, b' ', b'd', b'o', b'n', b'e'];
        let text = TextNormalizer::new().normalize(&raw, None);
        assert!(text.starts_with("ok"));
        assert!(text.ends_with("done"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(TextNormalizer::new().normalize(b"", None), "");
        assert_eq!(normalize("<html></html>"), "");
    }
}

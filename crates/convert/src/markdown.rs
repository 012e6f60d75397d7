use bytes::Bytes;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

use fragments_core::media::TEXT_MARKDOWN;

use crate::converter::Converter;
use crate::error::ConvertError;

/// Renders CommonMark (with tables and strikethrough) to HTML.
///
/// Raw HTML in the source is escaped and rendered as text, never passed
/// through. Input that is not valid UTF-8 is decoded lossily rather than
/// rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownToHtml;

impl MarkdownToHtml {
    const RESULT_TYPE: &'static str = "text/html; charset=utf-8";

    fn options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
    }
}

impl Converter for MarkdownToHtml {
    fn source_type(&self) -> &str {
        TEXT_MARKDOWN
    }

    fn extension(&self) -> &str {
        "html"
    }

    fn result_type(&self) -> &str {
        Self::RESULT_TYPE
    }

    fn convert(&self, input: &[u8]) -> Result<Bytes, ConvertError> {
        let text = String::from_utf8_lossy(input);
        let parser = Parser::new_ext(&text, Self::options()).map(escape_raw_html);

        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(Bytes::from(out))
    }
}

/// Turn raw HTML events into text so `push_html` escapes them. HTML blocks
/// become paragraphs.
fn escape_raw_html(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::HtmlBlock) => Event::Start(Tag::Paragraph),
        Event::End(TagEnd::HtmlBlock) => Event::End(TagEnd::Paragraph),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: &str) -> String {
        let out = MarkdownToHtml.convert(input.as_bytes()).unwrap();
        String::from_utf8(out.to_vec()).unwrap()
    }

    #[test]
    fn renders_heading_and_emphasis() {
        let html = render("# Hi\n\n**x**");
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<strong>x</strong>"));
    }

    #[test]
    fn renders_tables_and_strikethrough() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render("hi <script>alert(1)</script>\n\n<div onclick=x>y</div>");
        assert!(!html.contains("<script>"), "{html}");
        assert!(!html.contains("<div"), "{html}");
        assert!(html.contains("<p>hi &lt;script&gt;alert(1)&lt;/script&gt;</p>"));
        assert!(html.contains("<p>&lt;div onclick=x&gt;y&lt;/div&gt;"));
    }

    #[test]
    fn html_in_code_stays_escaped_code() {
        let html = render("`<b>`\n\n    <i>x</i>\n");
        assert!(html.contains("<code>&lt;b&gt;</code>"));
        assert!(html.contains("&lt;i&gt;x&lt;/i&gt;"));
        assert!(!html.contains("<b>") && !html.contains("<i>"));
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let out = MarkdownToHtml.convert(&[b'#', b' ', 0xff, b'\n']).unwrap();
        let html = String::from_utf8(out.to_vec()).unwrap();
        assert!(html.starts_with("<h1>"));
        assert!(html.contains('\u{fffd}'));
    }

    #[test]
    fn describes_its_table_entry() {
        assert_eq!(MarkdownToHtml.source_type(), "text/markdown");
        assert_eq!(MarkdownToHtml.extension(), "html");
        assert_eq!(MarkdownToHtml.result_type(), "text/html; charset=utf-8");
    }
}

//! Line-based markdown subset used by post bodies
//!
//! Post fields (`excerpt`, `content_initial`, `content`) are written in a tiny
//! markup: `##`/`###` headings, `>` quotes, `-` list items, blank lines and
//! inline `[text](target)` links. Every line is classified on its own, there
//! is no nesting and no escaping.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref LINK_RE: Regex = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();
}

/// One piece of a paragraph line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Segment {
    /// Literal text, shown as-is
    Text(String),
    /// `[text](target)`
    Link { text: String, target: String },
}

impl Segment {
    fn text(s: &str) -> Self {
        Segment::Text(s.to_string())
    }

    fn link(text: &str, target: &str) -> Self {
        Segment::Link {
            text: text.to_string(),
            target: target.to_string(),
        }
    }
}

/// A classified line of post text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentBlock {
    Heading2(String),
    Heading3(String),
    Quote(String),
    ListItem(String),
    Paragraph(Vec<Segment>),
    /// Blank line, rendered as vertical space
    Spacer,
}

impl ContentBlock {
    /// Rebuild the markup line this block was read from.
    ///
    /// Prefix spacing is normalized to a single space, so the result is not
    /// byte-identical to the original line but renders to the same block.
    pub fn to_source(&self) -> String {
        match self {
            ContentBlock::Heading2(text) => format!("## {}", text),
            ContentBlock::Heading3(text) => format!("### {}", text),
            ContentBlock::Quote(text) => format!("> {}", text),
            ContentBlock::ListItem(text) => format!("- {}", text),
            ContentBlock::Paragraph(segments) => segments
                .iter()
                .map(|segment| match segment {
                    Segment::Text(text) => text.clone(),
                    Segment::Link { text, target } => format!("[{}]({})", text, target),
                })
                .collect(),
            ContentBlock::Spacer => String::new(),
        }
    }

    /// Visible text of the block, links reduced to their label
    pub fn plain_text(&self) -> String {
        match self {
            ContentBlock::Heading2(text)
            | ContentBlock::Heading3(text)
            | ContentBlock::Quote(text)
            | ContentBlock::ListItem(text) => text.clone(),
            ContentBlock::Paragraph(segments) => segments
                .iter()
                .map(|segment| match segment {
                    Segment::Text(text) => text.as_str(),
                    Segment::Link { text, .. } => text.as_str(),
                })
                .collect(),
            ContentBlock::Spacer => String::new(),
        }
    }
}

/// Render post text into blocks, one per input line.
///
/// Never fails. The empty string is a single blank line and yields one
/// [`ContentBlock::Spacer`].
pub fn render(text: &str) -> Vec<ContentBlock> {
    text.split('\n').map(classify_line).collect()
}

/// Classify a single line. Rule order matters: `###` lines must not be read
/// as `##` headings, and the quote/list/blank rules only see non-heading lines.
fn classify_line(line: &str) -> ContentBlock {
    if line.starts_with("##") && !line.starts_with("###") {
        return ContentBlock::Heading2(line[2..].trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("###") {
        return ContentBlock::Heading3(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix('>') {
        return ContentBlock::Quote(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix('-') {
        return ContentBlock::ListItem(rest.trim().to_string());
    }

    if line.trim().is_empty() {
        return ContentBlock::Spacer;
    }

    ContentBlock::Paragraph(extract_links(line))
}

/// Split a line into text and link segments, in order
pub fn extract_links(line: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in LINK_RE.captures_iter(line) {
        // Group 0 always exists for a match
        let whole = caps.get(0).unwrap();
        if whole.start() > last {
            segments.push(Segment::text(&line[last..whole.start()]));
        }
        segments.push(Segment::link(&caps[1], &caps[2]));
        last = whole.end();
    }

    if last < line.len() {
        segments.push(Segment::text(&line[last..]));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    fn link(t: &str, target: &str) -> Segment {
        Segment::Link {
            text: t.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn test_heading_spacer_paragraph() {
        let blocks = render("## Title\n\nSome text");
        assert_eq!(
            blocks,
            vec![
                ContentBlock::Heading2("Title".to_string()),
                ContentBlock::Spacer,
                ContentBlock::Paragraph(vec![text("Some text")]),
            ]
        );
    }

    #[test]
    fn test_subheading_quote_list() {
        let blocks = render("### Sub\n> A quote\n- item one");
        assert_eq!(
            blocks,
            vec![
                ContentBlock::Heading3("Sub".to_string()),
                ContentBlock::Quote("A quote".to_string()),
                ContentBlock::ListItem("item one".to_string()),
            ]
        );
    }

    #[test]
    fn test_inline_link() {
        let blocks = render("See [here](https://x.com) for more");
        assert_eq!(
            blocks,
            vec![ContentBlock::Paragraph(vec![
                text("See "),
                link("here", "https://x.com"),
                text(" for more"),
            ])]
        );
    }

    #[test]
    fn test_empty_input_is_one_spacer() {
        assert_eq!(render(""), vec![ContentBlock::Spacer]);
    }

    #[test]
    fn test_whitespace_line_is_spacer() {
        assert_eq!(render("   \t"), vec![ContentBlock::Spacer]);
        assert_eq!(
            render("a\r\n\r\nb"),
            vec![
                ContentBlock::Paragraph(vec![text("a\r")]),
                ContentBlock::Spacer,
                ContentBlock::Paragraph(vec![text("b")]),
            ]
        );
    }

    #[test]
    fn test_precedence_takes_first_rule() {
        assert_eq!(render("### >"), vec![ContentBlock::Heading3(">".to_string())]);
        assert_eq!(render("## - x"), vec![ContentBlock::Heading2("- x".to_string())]);
        assert_eq!(render("#### deep"), vec![ContentBlock::Heading3("# deep".to_string())]);
        assert_eq!(render(">- x"), vec![ContentBlock::Quote("- x".to_string())]);
        assert_eq!(render("--"), vec![ContentBlock::ListItem("-".to_string())]);
    }

    #[test]
    fn test_markers_only_at_line_start() {
        assert_eq!(
            render("  ## not a heading"),
            vec![ContentBlock::Paragraph(vec![text("  ## not a heading")])]
        );
        assert_eq!(
            render("# single hash"),
            vec![ContentBlock::Paragraph(vec![text("# single hash")])]
        );
    }

    #[test]
    fn test_bare_markers() {
        assert_eq!(render("##"), vec![ContentBlock::Heading2(String::new())]);
        assert_eq!(render(">"), vec![ContentBlock::Quote(String::new())]);
        assert_eq!(render("-"), vec![ContentBlock::ListItem(String::new())]);
    }

    #[test]
    fn test_links_at_edges_and_adjacent() {
        assert_eq!(
            extract_links("[a](1)[b](2)"),
            vec![link("a", "1"), link("b", "2")]
        );
        assert_eq!(
            extract_links("[Amazon](https://amzn.to/x) agora"),
            vec![link("Amazon", "https://amzn.to/x"), text(" agora")]
        );
    }

    #[test]
    fn test_unmatched_brackets_stay_literal() {
        assert_eq!(extract_links("[broken](nope"), vec![text("[broken](nope")]);
        assert_eq!(extract_links("[](x) and [y]()"), vec![text("[](x) and [y]()")]);
        assert_eq!(extract_links("preço [promo]"), vec![text("preço [promo]")]);
    }

    #[test]
    fn test_link_inside_list_item_is_not_extracted() {
        assert_eq!(
            render("- [a](b)"),
            vec![ContentBlock::ListItem("[a](b)".to_string())]
        );
    }

    #[test]
    fn test_no_markers_one_paragraph_per_line() {
        let blocks = render("um\ndois\ntrês");
        assert_eq!(blocks.len(), 3);
        assert!(blocks
            .iter()
            .all(|b| matches!(b, ContentBlock::Paragraph(_))));
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            render("## Ofertas de março ✨"),
            vec![ContentBlock::Heading2("Ofertas de março ✨".to_string())]
        );
        assert_eq!(
            render("Veja [São Paulo](/sp) já"),
            vec![ContentBlock::Paragraph(vec![
                text("Veja "),
                link("São Paulo", "/sp"),
                text(" já"),
            ])]
        );
    }

    #[test]
    fn test_rerender_of_source_is_stable() {
        let input = "## Melhores fones\n\n### Custo-benefício\n> Vale cada centavo\n- bateria longa\n- leve\nTexto corrido.";
        let blocks = render(input);
        let rebuilt: Vec<String> = blocks.iter().map(ContentBlock::to_source).collect();
        assert_eq!(render(&rebuilt.join("\n")), blocks);
    }

    #[test]
    fn test_plain_text() {
        let blocks = render("Compre [aqui](https://x.com) hoje");
        assert_eq!(blocks[0].plain_text(), "Compre aqui hoje");
        assert_eq!(ContentBlock::Spacer.plain_text(), "");
    }
}

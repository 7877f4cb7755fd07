//! HTML output for rendered post text

use crate::content::{render, ContentBlock, Segment};

const H2_CLASS: &str = "text-2xl md:text-4xl font-bold text-gray-800 mt-8 md:mt-12 mb-4 md:mb-6";
const H3_CLASS: &str = "text-xl md:text-3xl font-bold text-gray-800 mt-8 md:mt-12 mb-4 md:mb-6";
const QUOTE_CLASS: &str = "my-4 md:my-6 bg-blue-50/30 px-4 md:px-6 py-3 md:py-4 rounded-lg";
const QUOTE_TEXT_CLASS: &str = "text-base md:text-lg text-gray-700 italic";
const LIST_ITEM_CLASS: &str = "ml-4 md:ml-6 mb-2 md:mb-3 text-base md:text-lg text-gray-700 list-disc";
const SPACER_CLASS: &str = "h-3 md:h-4";
const LINK_CLASS: &str = "text-primary hover:text-primary/80 underline";

/// Where on the page a block sequence is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    /// Excerpt and initial content: larger, lighter paragraphs
    Lead,
    /// Main content
    Body,
}

impl BlockStyle {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lead" => Some(BlockStyle::Lead),
            "body" => Some(BlockStyle::Body),
            _ => None,
        }
    }

    fn paragraph_class(self) -> &'static str {
        match self {
            BlockStyle::Lead => "mb-4 md:mb-6 text-lg md:text-xl text-gray-600 leading-relaxed",
            BlockStyle::Body => "mb-4 md:mb-6 text-base md:text-lg text-gray-700 leading-relaxed",
        }
    }
}

/// Render post text straight to HTML
pub fn render_html(text: &str, style: BlockStyle) -> String {
    blocks_to_html(&render(text), style)
}

/// Convert blocks to HTML, one element per block
pub fn blocks_to_html(blocks: &[ContentBlock], style: BlockStyle) -> String {
    let mut out = String::new();
    for block in blocks {
        let element = match block {
            ContentBlock::Heading2(text) => {
                format!(r#"<h2 class="{}">{}</h2>"#, H2_CLASS, html_escape(text))
            }
            ContentBlock::Heading3(text) => {
                format!(r#"<h3 class="{}">{}</h3>"#, H3_CLASS, html_escape(text))
            }
            ContentBlock::Quote(text) => format!(
                r#"<blockquote class="{}"><p class="{}">{}</p></blockquote>"#,
                QUOTE_CLASS,
                QUOTE_TEXT_CLASS,
                html_escape(text)
            ),
            ContentBlock::ListItem(text) => {
                format!(r#"<li class="{}">{}</li>"#, LIST_ITEM_CLASS, html_escape(text))
            }
            ContentBlock::Spacer => format!(r#"<div class="{}"></div>"#, SPACER_CLASS),
            ContentBlock::Paragraph(segments) => format!(
                r#"<p class="{}">{}</p>"#,
                style.paragraph_class(),
                segments_to_html(segments)
            ),
        };
        out.push_str(&element);
        out.push('\n');
    }
    out
}

fn segments_to_html(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => html_escape(text),
            Segment::Link { text, target } => format!(
                r#"<a href="{}" class="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                html_escape(&safe_href(target)),
                LINK_CLASS,
                html_escape(text)
            ),
        })
        .collect()
}

/// Link targets that would run script become `#`
pub fn safe_href(target: &str) -> String {
    let lower = target.trim().to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("data:") {
        "#".to_string()
    } else {
        target.trim().to_string()
    }
}

/// Plain-text description of post text, for meta tags and cards
pub fn meta_description(text: &str, length: usize) -> String {
    let plain: Vec<String> = render(text)
        .iter()
        .map(ContentBlock::plain_text)
        .filter(|line| !line.is_empty())
        .collect();
    truncate(&plain.join(" "), length, None)
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Truncate a string to a specified length
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.chars().count()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}
